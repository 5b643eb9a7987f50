//! Fleet of ships owned by one player, and recovery of a fleet from a grid.

use alloc::vec::Vec;

use crate::board::Board;
use crate::common::{Cell, Coord, PlacementError, BB};
use crate::config::{fleet_sizes, BOARD_SIZE};
use crate::ship::Ship;

/// The ships of one player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fleet {
    ships: Vec<Ship>,
}

impl Fleet {
    pub fn new() -> Self {
        Self { ships: Vec::new() }
    }

    pub fn push(&mut self, ship: Ship) {
        self.ships.push(ship);
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    /// Win condition: every ship's sunk flag is set.
    pub fn all_sunk(&self) -> bool {
        self.ships.iter().all(Ship::is_sunk)
    }

    /// Number of ships not yet sunk.
    pub fn afloat(&self) -> usize {
        self.ships.iter().filter(|s| !s.is_sunk()).count()
    }

    /// Index of the ship occupying `(row, col)`.
    pub fn ship_at(&self, row: usize, col: usize) -> Option<usize> {
        self.ships.iter().position(|s| s.occupies(row, col))
    }

    pub(crate) fn ship_mut(&mut self, index: usize) -> Option<&mut Ship> {
        self.ships.get_mut(index)
    }

    /// Union of all ship footprints.
    pub fn occupancy(&self) -> BB {
        self.ships.iter().fold(BB::new(), |acc, s| acc | s.mask())
    }

    /// Recover ships from a grid as orthogonally connected groups of Ship
    /// cells. No layout rules are checked.
    pub fn from_board(board: &Board) -> Fleet {
        let mut fleet = Fleet::new();
        for cells in ship_groups(board) {
            // cells come from in-bounds coordinates, so the mask can't fail
            if let Ok(ship) = Ship::new(cells) {
                fleet.push(ship);
            }
        }
        fleet
    }

    /// Recover ships from a grid and require a legal layout: only Empty and
    /// Ship cells, straight ships, no two ships touching (diagonals
    /// included) and exactly the configured fleet composition.
    pub fn validate(board: &Board) -> Result<Fleet, PlacementError> {
        for (r, c) in Board::coords() {
            if !matches!(board.get(r, c), Some(Cell::Empty) | Some(Cell::Ship)) {
                return Err(PlacementError::UnexpectedCell { row: r, col: c });
            }
        }

        let fleet = Fleet::from_board(board);
        for ship in fleet.ships() {
            let (r0, c0) = ship.cells()[0];
            if !ship.cells().iter().all(|&(r, _)| r == r0) && !ship.cells().iter().all(|&(_, c)| c == c0) {
                return Err(PlacementError::NotStraight { row: r0, col: c0 });
            }
        }

        // Orthogonal contact already merges ships into one group, so only
        // diagonal contact can show up here.
        let all = fleet.occupancy();
        for ship in fleet.ships() {
            let others = all & !ship.mask();
            if !(ship.mask().dilate() & others).is_empty() {
                let (row, col) = ship.cells()[0];
                return Err(PlacementError::Touching { row, col });
            }
        }

        let mut sizes: Vec<usize> = fleet.ships().iter().map(Ship::size).collect();
        let mut expected: Vec<usize> = fleet_sizes().collect();
        sizes.sort_unstable();
        expected.sort_unstable();
        if sizes != expected {
            return Err(PlacementError::WrongComposition);
        }
        Ok(fleet)
    }
}

/// Orthogonally connected Ship-cell groups, each in row-major order.
fn ship_groups(board: &Board) -> Vec<Vec<Coord>> {
    let mut seen = [[false; BOARD_SIZE]; BOARD_SIZE];
    let mut groups = Vec::new();
    for (r, c) in Board::coords() {
        if seen[r][c] || board.get(r, c) != Some(Cell::Ship) {
            continue;
        }
        let mut group = Vec::new();
        let mut stack = alloc::vec![(r, c)];
        seen[r][c] = true;
        while let Some((cr, cc)) = stack.pop() {
            group.push((cr, cc));
            let neighbours = [
                (cr.wrapping_sub(1), cc),
                (cr + 1, cc),
                (cr, cc.wrapping_sub(1)),
                (cr, cc + 1),
            ];
            for (nr, nc) in neighbours {
                if board.get(nr, nc) == Some(Cell::Ship) && !seen[nr][nc] {
                    seen[nr][nc] = true;
                    stack.push((nr, nc));
                }
            }
        }
        group.sort_unstable();
        groups.push(group);
    }
    groups
}

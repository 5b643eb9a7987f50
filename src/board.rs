//! Game board: a grid of cell states plus placement and reveal rules.

use alloc::vec::Vec;
use core::fmt;
use rand::Rng;

use crate::common::{BoardError, Cell, Coord, Orientation, BB};
use crate::config::{fleet_sizes, BOARD_SIZE, PLACEMENT_ATTEMPTS};
use crate::fleet::Fleet;
use crate::ship::Ship;

/// One player's 10×10 grid.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An all-Empty board.
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    pub fn in_bounds(row: usize, col: usize) -> bool {
        row < BOARD_SIZE && col < BOARD_SIZE
    }

    /// Cell state, or `None` outside the board.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row)?.get(col).copied()
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) -> Result<(), BoardError> {
        let slot = self
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(BoardError::OutOfBounds { row, col })?;
        *slot = cell;
        Ok(())
    }

    /// Mask of every cell currently in `state`.
    pub fn mask_of(&self, state: Cell) -> BB {
        let mut mask = BB::new();
        for (r, c) in Self::coords() {
            if self.cells[r][c] == state {
                let _ = mask.set(r, c);
            }
        }
        mask
    }

    pub fn count(&self, state: Cell) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c == state)
            .count()
    }

    /// All coordinates in row-major order.
    pub fn coords() -> impl Iterator<Item = Coord> {
        (0..BOARD_SIZE).flat_map(|r| (0..BOARD_SIZE).map(move |c| (r, c)))
    }

    /// Coordinates of cells still Empty.
    pub fn empty_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        Self::coords().filter(move |&(r, c)| self.cells[r][c] == Cell::Empty)
    }

    /// True iff a ship of `size` anchored at `(row, col)` lies inside the
    /// board and every one of its cells, together with their eight
    /// neighbours, is Empty.
    pub fn can_place(&self, row: usize, col: usize, size: usize, orientation: Orientation) -> bool {
        if size == 0 || size > BOARD_SIZE || !Self::in_bounds(row, col) {
            return false;
        }
        let (end_r, end_c) = orientation.step((row, col), size - 1);
        if !Self::in_bounds(end_r, end_c) {
            return false;
        }
        (0..size).all(|i| {
            let (r, c) = orientation.step((row, col), i);
            self.neighbourhood_is_empty(r, c)
        })
    }

    fn neighbourhood_is_empty(&self, row: usize, col: usize) -> bool {
        for r in row.saturating_sub(1)..=(row + 1).min(BOARD_SIZE - 1) {
            for c in col.saturating_sub(1)..=(col + 1).min(BOARD_SIZE - 1) {
                if self.cells[r][c] != Cell::Empty {
                    return false;
                }
            }
        }
        true
    }

    /// Mark the ship's cells as Ship and return them. Does not validate;
    /// gate every call behind [`can_place`](Self::can_place).
    pub fn place(&mut self, row: usize, col: usize, size: usize, orientation: Orientation) -> Vec<Coord> {
        let cells: Vec<Coord> = (0..size).map(|i| orientation.step((row, col), i)).collect();
        for &(r, c) in &cells {
            self.cells[r][c] = Cell::Ship;
        }
        cells
    }

    /// Place the whole fleet at random. Each ship gets up to
    /// [`PLACEMENT_ATTEMPTS`] draws; running out is a configuration error.
    pub fn random_full_placement<R: Rng + ?Sized>(rng: &mut R) -> Result<(Board, Fleet), BoardError> {
        let mut board = Board::new();
        let mut fleet = Fleet::new();
        for size in fleet_sizes() {
            let (row, col, orientation) = board.random_origin(rng, size)?;
            let cells = board.place(row, col, size, orientation);
            fleet.push(Ship::new(cells)?);
        }
        Ok((board, fleet))
    }

    fn random_origin<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        size: usize,
    ) -> Result<(usize, usize, Orientation), BoardError> {
        for _ in 0..PLACEMENT_ATTEMPTS {
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let (max_r, max_c) = match orientation {
                Orientation::Vertical => (BOARD_SIZE - size, BOARD_SIZE - 1),
                Orientation::Horizontal => (BOARD_SIZE - 1, BOARD_SIZE - size),
            };
            let r = rng.random_range(0..=max_r);
            let c = rng.random_range(0..=max_c);
            if self.can_place(r, c, size, orientation) {
                return Ok((r, c, orientation));
            }
        }
        Err(BoardError::PlacementExhausted { size })
    }

    /// Turn the given ship cells Sunk and reveal the clear perimeter: every
    /// Empty cell adjacent to one of them becomes Miss.
    pub fn mark_sunk(&mut self, cells: &[Coord]) -> Result<(), BoardError> {
        let mask = BB::from_cells(cells.iter().copied())?;
        for (r, c) in mask.iter_set_bits() {
            self.cells[r][c] = Cell::Sunk;
        }
        for (r, c) in (mask.dilate() & !mask).iter_set_bits() {
            if self.cells[r][c] == Cell::Empty {
                self.cells[r][c] = Cell::Miss;
            }
        }
        Ok(())
    }

    /// Apply a shot result reported by the authority to a mirrored board.
    pub fn record_shot(
        &mut self,
        row: usize,
        col: usize,
        hit: bool,
        sunk_cells: &[Coord],
    ) -> Result<(), BoardError> {
        self.set(row, col, if hit { Cell::Hit } else { Cell::Miss })?;
        if !sunk_cells.is_empty() {
            self.mark_sunk(sunk_cells)?;
        }
        Ok(())
    }

    /// The board as the opponent sees it: unshot ship cells look Empty.
    pub fn opponent_view(&self) -> Board {
        let mut view = *self;
        for row in view.cells.iter_mut() {
            for cell in row.iter_mut() {
                if *cell == Cell::Ship {
                    *cell = Cell::Empty;
                }
            }
        }
        view
    }

    /// Parse a cell written the way the board is displayed: column letter
    /// then 1-based row, e.g. `B7` or `j10`.
    pub fn parse_coord(text: &str) -> Option<Coord> {
        let text = text.trim();
        let mut chars = text.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        if !letter.is_ascii_uppercase() {
            return None;
        }
        let col = (letter as u8 - b'A') as usize;
        let row = chars.as_str().parse::<usize>().ok()?.checked_sub(1)?;
        Self::in_bounds(row, col).then_some((row, col))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for c in 0..BOARD_SIZE {
            write!(f, " {}", (b'A' + c as u8) as char)?;
        }
        writeln!(f)?;
        for (r, row) in self.cells.iter().enumerate() {
            write!(f, "{:2} ", r + 1)?;
            for cell in row {
                let ch = match cell {
                    Cell::Empty => '.',
                    Cell::Ship => 'S',
                    Cell::Hit => 'X',
                    Cell::Miss => 'o',
                    Cell::Sunk => '#',
                };
                write!(f, " {}", ch)?;
            }
            if r + 1 < BOARD_SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{")?;
        writeln!(f, "{}", self)?;
        write!(f, "}}")
    }
}

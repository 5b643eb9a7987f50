//! Ship entities: occupied cells, hits and the monotonic sunk flag.

use alloc::vec::Vec;
use core::fmt;

use crate::common::{BoardError, Coord, BB};

/// A placed ship. Owned by exactly one [`Fleet`](crate::Fleet).
#[derive(Clone, PartialEq, Eq)]
pub struct Ship {
    cells: Vec<Coord>,
    mask: BB,
    hits: BB,
    sunk: bool,
}

impl Ship {
    /// Build a ship from its cells, in placement order.
    pub fn new(cells: Vec<Coord>) -> Result<Self, BoardError> {
        let mask = BB::from_cells(cells.iter().copied())?;
        Ok(Ship {
            cells,
            mask,
            hits: BB::new(),
            sunk: false,
        })
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// Occupancy mask of the ship on the board.
    pub fn mask(&self) -> BB {
        self.mask
    }

    pub fn occupies(&self, row: usize, col: usize) -> bool {
        self.mask.contains(row, col)
    }

    /// Record a hit on one of the ship's cells. Returns `false` if the cell
    /// isn't part of this ship.
    pub fn register_hit(&mut self, row: usize, col: usize) -> bool {
        if !self.occupies(row, col) {
            return false;
        }
        let _ = self.hits.set(row, col);
        true
    }

    /// Every cell has been hit.
    pub fn all_hit(&self) -> bool {
        self.hits.count_ones() == self.size()
    }

    pub fn is_sunk(&self) -> bool {
        self.sunk
    }

    /// Set the sunk flag. Never cleared afterwards.
    pub(crate) fn mark_sunk(&mut self) {
        self.sunk = true;
    }

    /// Cells around the ship (orthogonal and diagonal), excluding the ship.
    pub fn perimeter(&self) -> BB {
        self.mask.dilate() & !self.mask
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ cells: {:?}, hits: {}, sunk: {} }}",
            self.cells,
            self.hits.count_ones(),
            self.sunk
        )
    }
}

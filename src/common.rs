//! Common types: cell states, coordinates, shot outcomes and board errors.

use alloc::vec::Vec;
use core::fmt;

use crate::bitboard::{BitBoard, BitBoardError};
use crate::config::BOARD_SIZE;

/// `(row, col)`, zero based.
pub type Coord = (usize, usize);

/// Occupancy mask sized for the game board.
pub type BB = BitBoard<u128, BOARD_SIZE>;

/// State of one board cell.
///
/// Transitions are Empty→Ship (placement), Ship→Hit, Empty→Miss (a shot or
/// perimeter reveal) and Hit→Sunk once the whole ship is hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    #[default]
    Empty,
    Ship,
    Hit,
    Miss,
    Sunk,
}

impl Cell {
    /// A shot has already landed here.
    pub fn is_resolved(self) -> bool {
        matches!(self, Cell::Hit | Cell::Miss | Cell::Sunk)
    }
}

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Cell `i` of a ship anchored at `(row, col)`.
    pub fn step(self, (row, col): Coord, i: usize) -> Coord {
        match self {
            Orientation::Horizontal => (row, col + i),
            Orientation::Vertical => (row + i, col),
        }
    }
}

/// What a single shot did to the target board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShotOutcome {
    pub hit: bool,
    pub sunk: bool,
    /// Cells of the ship that just sank; empty unless `sunk`.
    pub sunk_cells: Vec<Coord>,
    /// Every ship of the target fleet is now sunk.
    pub game_over: bool,
}

impl ShotOutcome {
    pub fn miss() -> Self {
        Self::default()
    }
}

/// Errors returned by board and shot operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    BitBoard(BitBoardError),
    /// Coordinate outside the board.
    OutOfBounds { row: usize, col: usize },
    /// The cell was already shot at.
    AlreadyResolved { row: usize, col: usize },
    /// A ship cell was hit but no ship in the fleet owns it.
    UnknownShipHit { row: usize, col: usize },
    /// Random placement ran out of attempts for a ship of this size.
    PlacementExhausted { size: usize },
}

impl From<BitBoardError> for BoardError {
    fn from(err: BitBoardError) -> Self {
        BoardError::BitBoard(err)
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::BitBoard(e) => write!(f, "BitBoard error: {}", e),
            BoardError::OutOfBounds { row, col } => {
                write!(f, "Cell ({}, {}) is outside the board", row, col)
            }
            BoardError::AlreadyResolved { row, col } => {
                write!(f, "Cell ({}, {}) was already shot", row, col)
            }
            BoardError::UnknownShipHit { row, col } => {
                write!(f, "Ship cell ({}, {}) belongs to no ship in the fleet", row, col)
            }
            BoardError::PlacementExhausted { size } => write!(
                f,
                "Unable to place a ship of size {} within the retry bound",
                size
            ),
        }
    }
}

/// Why a submitted board is not a legal fleet layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum PlacementError {
    /// A cell other than Empty or Ship is present.
    UnexpectedCell { row: usize, col: usize },
    /// A connected group of ship cells is not a straight line.
    NotStraight { row: usize, col: usize },
    /// Two ships touch orthogonally or diagonally.
    Touching { row: usize, col: usize },
    /// Ship sizes do not match the required fleet.
    WrongComposition,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::UnexpectedCell { row, col } => {
                write!(f, "Cell ({}, {}) is neither empty nor a ship", row, col)
            }
            PlacementError::NotStraight { row, col } => {
                write!(f, "Ship at ({}, {}) is not a straight line", row, col)
            }
            PlacementError::Touching { row, col } => {
                write!(f, "Ship at ({}, {}) touches another ship", row, col)
            }
            PlacementError::WrongComposition => write!(f, "Fleet composition is wrong"),
        }
    }
}

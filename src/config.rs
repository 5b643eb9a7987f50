//! Fixed game parameters shared by local play and the session server.

/// Side length of the square board.
pub const BOARD_SIZE: usize = 10;

/// A class of ship in the fleet: its length and how many of them a fleet holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipClass {
    size: usize,
    count: usize,
}

impl ShipClass {
    pub const fn new(size: usize, count: usize) -> Self {
        Self { size, count }
    }

    /// Number of cells a ship of this class occupies.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of ships of this class in a full fleet.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Fleet composition, largest ships first so random placement packs them
/// while the board is still open.
pub const FLEET: [ShipClass; 4] = [
    ShipClass::new(4, 1),
    ShipClass::new(3, 2),
    ShipClass::new(2, 3),
    ShipClass::new(1, 4),
];

pub const NUM_SHIPS: usize = 1 + 2 + 3 + 4;

/// Total number of ship cells in a full fleet.
pub const TOTAL_SHIP_CELLS: usize = 4 + 3 * 2 + 2 * 3 + 4;

/// Randomized draws tried per ship before random placement gives up.
pub const PLACEMENT_ATTEMPTS: usize = 500;

/// Ship sizes of a full fleet in placement order.
pub fn fleet_sizes() -> impl Iterator<Item = usize> {
    FLEET
        .iter()
        .flat_map(|class| core::iter::repeat(class.size()).take(class.count()))
}

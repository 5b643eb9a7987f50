//! Shot resolution against a target board and its fleet.

use crate::board::Board;
use crate::common::{BoardError, Cell, ShotOutcome};
use crate::fleet::Fleet;

/// Fire at `(row, col)` on the target.
///
/// A Ship cell becomes Hit; if that completes its ship, the ship is flagged
/// sunk, its cells turn Sunk and the clear perimeter is revealed as Miss.
/// An Empty cell becomes Miss. Already-resolved or out-of-range targets are
/// rejected without touching anything.
pub fn resolve_shot(
    board: &mut Board,
    fleet: &mut Fleet,
    row: usize,
    col: usize,
) -> Result<ShotOutcome, BoardError> {
    let cell = board.get(row, col).ok_or(BoardError::OutOfBounds { row, col })?;
    match cell {
        Cell::Empty => {
            board.set(row, col, Cell::Miss)?;
            Ok(ShotOutcome::miss())
        }
        Cell::Ship => {
            let index = fleet
                .ship_at(row, col)
                .ok_or(BoardError::UnknownShipHit { row, col })?;
            board.set(row, col, Cell::Hit)?;
            let mut outcome = ShotOutcome {
                hit: true,
                ..ShotOutcome::default()
            };
            if let Some(ship) = fleet.ship_mut(index) {
                ship.register_hit(row, col);
                if ship.all_hit() && !ship.is_sunk() {
                    ship.mark_sunk();
                    outcome.sunk = true;
                    outcome.sunk_cells = ship.cells().to_vec();
                }
            }
            if outcome.sunk {
                board.mark_sunk(&outcome.sunk_cells)?;
            }
            outcome.game_over = fleet.all_sunk();
            Ok(outcome)
        }
        Cell::Hit | Cell::Miss | Cell::Sunk => Err(BoardError::AlreadyResolved { row, col }),
    }
}

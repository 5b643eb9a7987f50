#![allow(dead_code)]

use seabattle::{Board, Fleet, Orientation};

/// A legal fleet in the top five rows, bottom half empty.
///
/// ```text
///     A B C D E F G H I J
///  1  S S S S . S S S . .
///  2  . . . . . . . . . .
///  3  S S S . S S . S S .
///  4  . . . . . . . . . .
///  5  S S . S . S . S . S
/// ```
pub fn fixed_layout() -> (Board, Fleet) {
    let mut board = Board::new();
    let ships = [
        (0, 0, 4),
        (0, 5, 3),
        (2, 0, 3),
        (2, 4, 2),
        (2, 7, 2),
        (4, 0, 2),
        (4, 3, 1),
        (4, 5, 1),
        (4, 7, 1),
        (4, 9, 1),
    ];
    for (r, c, size) in ships {
        assert!(board.can_place(r, c, size, Orientation::Horizontal), "({r},{c}) size {size}");
        board.place(r, c, size, Orientation::Horizontal);
    }
    let fleet = Fleet::validate(&board).expect("fixed layout is legal");
    (board, fleet)
}

/// Every ship cell of the fixed layout.
pub fn fixed_ship_cells() -> Vec<(usize, usize)> {
    let (board, _) = fixed_layout();
    Board::coords()
        .filter(|&(r, c)| board.get(r, c) == Some(seabattle::Cell::Ship))
        .collect()
}

use proptest::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};
use seabattle::{Board, Cell, Fleet};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn random_fleets_never_touch(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let (board, fleet) = Board::random_full_placement(&mut rng).unwrap();
        for (i, ship) in fleet.ships().iter().enumerate() {
            for (j, other) in fleet.ships().iter().enumerate() {
                if i == j {
                    continue;
                }
                for &(r, c) in ship.cells() {
                    for &(or, oc) in other.cells() {
                        prop_assert!(r.abs_diff(or) > 1 || c.abs_diff(oc) > 1,
                            "ship cells ({},{}) and ({},{}) touch", r, c, or, oc);
                    }
                }
            }
        }
        prop_assert_eq!(board.count(Cell::Ship), fleet.occupancy().count_ones());
    }

    #[test]
    fn random_fleets_pass_strict_validation(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let (board, fleet) = Board::random_full_placement(&mut rng).unwrap();
        let recovered = Fleet::validate(&board);
        prop_assert!(recovered.is_ok(), "{:?}", recovered);
        prop_assert_eq!(recovered.unwrap().occupancy(), fleet.occupancy());
    }
}

use std::collections::HashSet;

use knapsack_arena_core::{CellCoord, DpTable, Item, ValidationError};
use knapsack_arena_system_puzzle::{
    eligible_blanks, generate_puzzle, pick_blanks, solve, validate_items, PuzzleGenerator,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn textbook_items() -> Vec<Item> {
    vec![
        Item::new("item0", 2, 3),
        Item::new("item1", 3, 4),
        Item::new("item2", 4, 5),
    ]
}

fn random_instance(rng: &mut ChaCha8Rng) -> (Vec<Item>, u32) {
    let count = rng.gen_range(1..=8);
    let items = (0..count)
        .map(|index| {
            Item::new(
                format!("i{index}"),
                rng.gen_range(1..=9),
                rng.gen_range(1..=20),
            )
        })
        .collect();
    (items, rng.gen_range(1..=20))
}

fn brute_force_optimum(items: &[Item], capacity: u32) -> u64 {
    let mut best = 0;
    for mask in 0u32..(1 << items.len()) {
        let (weight, value) = items
            .iter()
            .enumerate()
            .filter(|(index, _)| mask & (1 << *index) != 0)
            .fold((0u64, 0u64), |(weight, value), (_, item)| {
                (weight + u64::from(item.weight), value + u64::from(item.value))
            });
        if weight <= u64::from(capacity) {
            best = best.max(value);
        }
    }
    best
}

fn value_at(table: &DpTable, cell: CellCoord) -> u64 {
    table.at(cell).expect("blank cell lies inside the table")
}

#[test]
fn textbook_instance_matches_known_optimum() {
    let solution = solve(&textbook_items(), 5);

    assert_eq!(solution.dp_table.get(3, 5), Some(7));
    assert_eq!(
        solution.dp_table.row(3),
        Some(&[0, 0, 3, 4, 5, 7][..]),
        "last row should hold the best value for each capacity",
    );
    assert_eq!(
        solution.optimal_selection,
        vec![Item::new("item0", 2, 3), Item::new("item1", 3, 4)],
        "selection should list the packed items in item order",
    );
}

#[test]
fn textbook_instance_offers_four_unique_blanks() {
    let solution = solve(&textbook_items(), 5);

    assert_eq!(
        eligible_blanks(&solution.dp_table),
        vec![
            CellCoord::new(1, 2),
            CellCoord::new(2, 3),
            CellCoord::new(2, 5),
            CellCoord::new(3, 4),
        ],
        "only the first occurrence of each positive value is eligible",
    );
}

#[test]
fn table_borders_are_zero_and_rows_never_decrease() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..64 {
        let (items, capacity) = random_instance(&mut rng);
        let table = solve(&items, capacity).dp_table;

        for row in 0..table.rows() {
            assert_eq!(table.get(row, 0), Some(0), "column zero must be zero");
        }
        for col in 0..table.columns() {
            assert_eq!(table.get(0, col), Some(0), "row zero must be zero");
        }
        for row in table.iter_rows() {
            assert!(
                row.windows(2).all(|pair| pair[0] <= pair[1]),
                "values must not decrease as capacity grows",
            );
        }
    }
}

#[test]
fn selection_fits_and_reaches_the_optimum() {
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    for _ in 0..64 {
        let (items, capacity) = random_instance(&mut rng);
        let solution = solve(&items, capacity);
        let weight: u64 = solution
            .optimal_selection
            .iter()
            .map(|item| u64::from(item.weight))
            .sum();
        let value: u64 = solution
            .optimal_selection
            .iter()
            .map(|item| u64::from(item.value))
            .sum();

        assert!(weight <= u64::from(capacity), "selection must fit");
        assert_eq!(value, solution.dp_table.final_value());
        assert_eq!(value, brute_force_optimum(&items, capacity));
    }
}

#[test]
fn blanks_are_unique_interior_and_bounded() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    for _ in 0..64 {
        let (items, capacity) = random_instance(&mut rng);
        let table = solve(&items, capacity).dp_table;
        let eligible = eligible_blanks(&table).len();
        let requested = rng.gen_range(0..=12);
        let blanks = pick_blanks(&table, requested, &mut rng);

        assert_eq!(blanks.len(), requested.min(eligible));
        let values: HashSet<u64> = blanks.iter().map(|cell| value_at(&table, *cell)).collect();
        assert_eq!(values.len(), blanks.len(), "blank values must be distinct");
        for cell in &blanks {
            assert_ne!(cell.row(), 0, "row zero is never blank");
            assert_ne!(cell.col(), 0, "column zero is never blank");
            assert_ne!(*cell, table.final_cell(), "final cell is never blank");
            assert!(value_at(&table, *cell) > 0, "zero cells are never blank");
        }
    }
}

#[test]
fn oversized_requests_are_clamped() {
    let table = solve(&textbook_items(), 5).dp_table;
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let blanks = pick_blanks(&table, 50, &mut rng);

    assert_eq!(blanks.len(), 4);
}

#[test]
fn empty_items_produce_degenerate_table() {
    let puzzle = generate_puzzle(&[], 5, 3, &mut ChaCha8Rng::seed_from_u64(1))
        .expect("empty item lists are tolerated by the generator");

    assert_eq!(puzzle.dp_table.rows(), 1);
    assert_eq!(puzzle.dp_table.final_value(), 0);
    assert!(puzzle.optimal_selection.is_empty());
    assert!(puzzle.blank_cells.is_empty());
}

#[test]
fn malformed_items_fail_before_solving() {
    let zero_weight = [Item::new("a", 0, 3)];
    let zero_value = [Item::new("a", 2, 0)];
    let duplicated = [Item::new("a", 2, 3), Item::new("a", 3, 4)];

    assert_eq!(
        validate_items(&zero_weight),
        Err(ValidationError::ZeroWeight { item: "a".into() }),
    );
    assert_eq!(
        validate_items(&zero_value),
        Err(ValidationError::ZeroValue { item: "a".into() }),
    );
    assert_eq!(
        generate_puzzle(&duplicated, 5, 2, &mut ChaCha8Rng::seed_from_u64(1)),
        Err(ValidationError::DuplicateItemId { item: "a".into() }),
    );
}

#[test]
fn seeded_generators_agree() {
    let mut first = PuzzleGenerator::from_seed(42);
    let mut second = PuzzleGenerator::from_seed(42);

    let a = first.generate(&textbook_items(), 5, 2).expect("valid items");
    let b = second.generate(&textbook_items(), 5, 2).expect("valid items");

    assert_eq!(a, b, "equal seeds must hide the same cells");
    assert_eq!(a.selection_value(), 7);
    assert_eq!(a.selection_weight(), 5);
}

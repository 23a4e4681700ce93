#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure puzzle generator for 0/1 knapsack challenges.
//!
//! The generator solves an instance bottom-up, recovers one optimal packing by
//! walking the table backwards, and hides a shuffled subset of cells whose values
//! are unique across the table.

use std::collections::HashSet;

use knapsack_arena_core::{CellCoord, DpTable, Item, Puzzle, ValidationError};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Table and optimal packing of a solved instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// Canonical dynamic-programming table.
    pub dp_table: DpTable,
    /// Items forming one optimal packing, in item order.
    pub optimal_selection: Vec<Item>,
}

/// Rejects item lists that the solver must never see.
///
/// Weights and values must be positive and identifiers unique.
pub fn validate_items(items: &[Item]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.weight == 0 {
            return Err(ValidationError::ZeroWeight {
                item: item.id.clone(),
            });
        }
        if item.value == 0 {
            return Err(ValidationError::ZeroValue {
                item: item.id.clone(),
            });
        }
        if !seen.insert(&item.id) {
            return Err(ValidationError::DuplicateItemId {
                item: item.id.clone(),
            });
        }
    }
    Ok(())
}

/// Solves the instance and recovers one optimal selection.
///
/// Runs in `O(items * capacity)` time and space. An empty item list or a zero
/// capacity yields a degenerate all-zero table and an empty selection.
#[must_use]
pub fn solve(items: &[Item], capacity: u32) -> Solution {
    let mut dp_table = DpTable::zeroed(items.len(), capacity as usize);

    for (index, item) in items.iter().enumerate() {
        let Some((previous, current)) = dp_table.split_row_mut(index + 1) else {
            continue;
        };
        let weight = item.weight as usize;
        let value = u64::from(item.value);

        for w in 1..current.len() {
            let skip = previous[w];
            current[w] = if weight <= w {
                skip.max(value + previous[w - weight])
            } else {
                skip
            };
        }
    }

    let optimal_selection = backtrack(items, &dp_table);

    Solution {
        dp_table,
        optimal_selection,
    }
}

fn backtrack(items: &[Item], table: &DpTable) -> Vec<Item> {
    let mut remaining = table.final_value();
    let mut capacity = table.capacity();
    let mut row = table.item_count();
    let mut selected = Vec::new();

    while row > 0 && remaining > 0 {
        let with_item = table.get(row, capacity).unwrap_or(0);
        let without_item = table.get(row - 1, capacity).unwrap_or(0);
        if with_item != without_item {
            let item = &items[row - 1];
            remaining = remaining.saturating_sub(u64::from(item.value));
            capacity = capacity.saturating_sub(item.weight as usize);
            selected.push(item.clone());
        }
        row -= 1;
    }

    selected.reverse();
    selected
}

/// Lists the cells that may be hidden, in row-major order.
///
/// Row zero, column zero and the final cell are never eligible, nor are cells
/// holding zero. Among cells sharing a value only the first row-major occurrence
/// is kept, across the whole table.
#[must_use]
pub fn eligible_blanks(table: &DpTable) -> Vec<CellCoord> {
    let final_cell = table.final_cell();
    let mut seen_values = HashSet::new();
    let mut candidates = Vec::new();

    for row in 1..table.rows() {
        for col in 1..table.columns() {
            let cell = CellCoord::new(row as u32, col as u32);
            if cell == final_cell {
                continue;
            }
            let Some(value) = table.get(row, col) else {
                continue;
            };
            if value > 0 && seen_values.insert(value) {
                candidates.push(cell);
            }
        }
    }

    candidates
}

/// Picks up to `count` blank cells uniformly without replacement.
///
/// Requests above the number of eligible cells are clamped silently.
pub fn pick_blanks<R: Rng + ?Sized>(table: &DpTable, count: usize, rng: &mut R) -> Vec<CellCoord> {
    let mut candidates = eligible_blanks(table);
    candidates.shuffle(rng);
    candidates.truncate(count);
    candidates
}

/// Validates, solves and masks an instance in one step.
pub fn generate_puzzle<R: Rng + ?Sized>(
    items: &[Item],
    capacity: u32,
    blank_count: usize,
    rng: &mut R,
) -> Result<Puzzle, ValidationError> {
    validate_items(items)?;
    let Solution {
        dp_table,
        optimal_selection,
    } = solve(items, capacity);
    let blank_cells = pick_blanks(&dp_table, blank_count, rng);

    debug!(
        items = items.len(),
        capacity,
        optimum = dp_table.final_value(),
        requested_blanks = blank_count,
        blanks = blank_cells.len(),
        "generated knapsack puzzle"
    );

    Ok(Puzzle {
        dp_table,
        optimal_selection,
        blank_cells,
    })
}

/// Seeded generator that owns its random stream.
#[derive(Debug)]
pub struct PuzzleGenerator {
    rng: ChaCha8Rng,
}

impl Default for PuzzleGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl PuzzleGenerator {
    /// Creates a generator whose blank selection is reproducible for `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a generator seeded from operating-system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Generates a puzzle, advancing the generator's random stream.
    pub fn generate(
        &mut self,
        items: &[Item],
        capacity: u32,
        blank_count: usize,
    ) -> Result<Puzzle, ValidationError> {
        generate_puzzle(items, capacity, blank_count, &mut self.rng)
    }

    /// Exposes the random stream to callers that draw identifiers alongside puzzles.
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

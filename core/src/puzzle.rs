//! Knapsack items, dynamic-programming tables and authored challenges.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ChallengeId, ItemId, ParseDifficultyError, TableShapeError, UserId};

/// Item that may be packed into the knapsack.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Identifier unique within the owning challenge.
    pub id: ItemId,
    /// Capacity consumed when the item is packed.
    pub weight: u32,
    /// Value gained when the item is packed.
    pub value: u32,
}

impl Item {
    /// Creates a new item description.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, weight: u32, value: u32) -> Self {
        Self {
            id: id.into(),
            weight,
            value,
        }
    }
}

/// Difficulty tier shared by challenges and rooms.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Introductory tier, level 1.
    #[default]
    Easy,
    /// Intermediate tier, level 2.
    Medium,
    /// Advanced tier, level 3.
    Hard,
}

impl Difficulty {
    /// Every tier in ascending order.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Numeric level used by stored challenges.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }

    /// Resolves a numeric level into a tier.
    #[must_use]
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Easy),
            2 => Some(Self::Medium),
            3 => Some(Self::Hard),
            _ => None,
        }
    }

    /// Lower-case name of the tier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Ok(level) = trimmed.parse::<u8>() {
            return Self::from_level(level).ok_or_else(|| ParseDifficultyError(value.to_owned()));
        }
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseDifficultyError(value.to_owned()))
    }
}

/// Location of a single cell within a [`DpTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    col: u32,
}

impl CellCoord {
    /// Creates a coordinate from an item-prefix row and a capacity column.
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Number of leading items considered by the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Capacity budget considered by the cell.
    #[must_use]
    pub const fn col(&self) -> u32 {
        self.col
    }
}

/// Dense `(items + 1) x (capacity + 1)` table of best achievable values.
///
/// Cell `(i, w)` holds the best value reachable with the first `i` items inside a
/// capacity of `w`. Row zero and column zero are always zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u64>>", into = "Vec<Vec<u64>>")]
pub struct DpTable {
    rows: usize,
    columns: usize,
    cells: Vec<u64>,
}

impl DpTable {
    /// Builds a table from row-major cells produced by a solver.
    ///
    /// Returns `None` when the dimensions are zero or disagree with the cell count.
    #[must_use]
    pub fn from_row_major(rows: usize, columns: usize, cells: Vec<u64>) -> Option<Self> {
        if rows == 0 || columns == 0 || rows.checked_mul(columns)? != cells.len() {
            return None;
        }
        Some(Self {
            rows,
            columns,
            cells,
        })
    }

    /// Creates an all-zero table sized for `item_count` items and `capacity`.
    #[must_use]
    pub fn zeroed(item_count: usize, capacity: usize) -> Self {
        let rows = item_count + 1;
        let columns = capacity + 1;
        Self {
            rows,
            columns,
            cells: vec![0; rows * columns],
        }
    }

    /// Borrows row `row - 1` for reading together with row `row` for writing.
    ///
    /// Returns `None` for row zero and for rows outside the table.
    #[must_use]
    pub fn split_row_mut(&mut self, row: usize) -> Option<(&[u64], &mut [u64])> {
        if row == 0 || row >= self.rows {
            return None;
        }
        let (before, rest) = self.cells.split_at_mut(row * self.columns);
        let previous = &before[(row - 1) * self.columns..];
        Some((previous, &mut rest[..self.columns]))
    }

    /// Number of rows, one more than the number of items.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns, one more than the knapsack capacity.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Number of items the table was built from.
    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.rows - 1
    }

    /// Capacity the table was built for.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.columns - 1
    }

    /// Retrieves the value stored at `(row, col)`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<u64> {
        if row < self.rows && col < self.columns {
            self.cells.get(row * self.columns + col).copied()
        } else {
            None
        }
    }

    /// Retrieves the value stored at the provided coordinate.
    #[must_use]
    pub fn at(&self, cell: CellCoord) -> Option<u64> {
        self.get(cell.row() as usize, cell.col() as usize)
    }

    /// Borrows a full row of the table.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[u64]> {
        if row < self.rows {
            let start = row * self.columns;
            self.cells.get(start..start + self.columns)
        } else {
            None
        }
    }

    /// Value of the bottom-right cell, the optimum of the whole instance.
    #[must_use]
    pub fn final_value(&self) -> u64 {
        self.cells.last().copied().unwrap_or(0)
    }

    /// Coordinate of the bottom-right cell.
    #[must_use]
    pub fn final_cell(&self) -> CellCoord {
        CellCoord::new(self.item_count() as u32, self.capacity() as u32)
    }

    /// Iterates over rows from the empty prefix to the full item list.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[u64]> {
        self.cells.chunks(self.columns)
    }
}

impl From<DpTable> for Vec<Vec<u64>> {
    fn from(table: DpTable) -> Self {
        table.iter_rows().map(<[u64]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<u64>>> for DpTable {
    type Error = TableShapeError;

    fn try_from(rows: Vec<Vec<u64>>) -> Result<Self, Self::Error> {
        let expected = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || expected == 0 {
            return Err(TableShapeError::Empty);
        }
        let mut cells = Vec::with_capacity(rows.len() * expected);
        for (index, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(TableShapeError::Ragged {
                    row: index,
                    expected,
                    found: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            columns: expected,
            cells,
        })
    }
}

/// Output of the puzzle generator for one knapsack instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    /// Canonical dynamic-programming table.
    pub dp_table: DpTable,
    /// Items forming one optimal packing, in item order.
    pub optimal_selection: Vec<Item>,
    /// Cells hidden from the player.
    pub blank_cells: Vec<CellCoord>,
}

impl Puzzle {
    /// Combined weight of the optimal selection.
    #[must_use]
    pub fn selection_weight(&self) -> u64 {
        self.optimal_selection
            .iter()
            .map(|item| u64::from(item.weight))
            .sum()
    }

    /// Combined value of the optimal selection.
    #[must_use]
    pub fn selection_value(&self) -> u64 {
        self.optimal_selection
            .iter()
            .map(|item| u64::from(item.value))
            .sum()
    }
}

/// Authored challenge persisted by the challenge store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Identifier assigned on creation.
    pub id: ChallengeId,
    /// Tier the challenge is offered under.
    pub difficulty: Difficulty,
    /// Items available to the player.
    pub items: Vec<Item>,
    /// Canonical table derived from the items.
    pub dp_table: DpTable,
    /// One optimal packing derived from the table.
    pub optimal_selection: Vec<Item>,
    /// Cells the player must supply.
    pub blank_cells: Vec<CellCoord>,
    /// Number of blanks requested by the author, before clamping.
    pub blank_count: u32,
    /// Knapsack capacity.
    pub max_capacity: u32,
    /// Time budget granted to each attempt.
    pub max_duration_seconds: u32,
    /// Operator that authored the challenge.
    pub created_by: UserId,
    /// Operator that last edited the challenge.
    pub updated_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last edit.
    pub updated_at: DateTime<Utc>,
}

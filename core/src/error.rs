//! Error taxonomy surfaced by arena operations.

use thiserror::Error;

use crate::{ChallengeId, Difficulty, ItemId, SessionId};

/// Rejection of malformed input, raised before any computation or mutation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An authored challenge did not contain any items.
    #[error("challenge must contain at least one item")]
    EmptyItems,
    /// An item declared a weight of zero.
    #[error("item `{item}` must have a positive weight")]
    ZeroWeight {
        /// Identifier of the offending item.
        item: ItemId,
    },
    /// An item declared a value of zero.
    #[error("item `{item}` must have a positive value")]
    ZeroValue {
        /// Identifier of the offending item.
        item: ItemId,
    },
    /// Two items shared an identifier.
    #[error("item id `{item}` appears more than once")]
    DuplicateItemId {
        /// Identifier that was repeated.
        item: ItemId,
    },
    /// An authored challenge declared a knapsack capacity of zero.
    #[error("knapsack capacity must be positive")]
    ZeroCapacity,
    /// An authored challenge declared a time budget of zero seconds.
    #[error("maximum duration must be positive")]
    ZeroDuration,
    /// A team attempt declared zero players.
    #[error("player count must be positive")]
    ZeroPlayerCount,
    /// A required field was empty.
    #[error("`{field}` must not be empty")]
    MissingField {
        /// Name of the empty field.
        field: &'static str,
    },
    /// A pagination request used a zero page index or size.
    #[error("page index and size must be positive (got index {index}, size {size})")]
    InvalidPage {
        /// Requested one-based page index.
        index: usize,
        /// Requested page size.
        size: usize,
    },
}

/// Reference to a record that does not exist.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NotFound {
    /// No play session carries the identifier.
    #[error("play session `{0}` does not exist")]
    Session(SessionId),
    /// No challenge carries the identifier.
    #[error("challenge `{0}` does not exist")]
    Challenge(ChallengeId),
    /// No challenge is offered at the requested tier.
    #[error("no challenge is offered at difficulty `{0}`")]
    Difficulty(Difficulty),
}

/// Failure reported by an external store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not serve the request; the caller owns the retry policy.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Human readable cause reported by the store.
        reason: String,
    },
}

impl StoreError {
    /// Builds an unavailability error from any displayable cause.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Error returned by every fallible arena operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The request was malformed and nothing was applied.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The request referenced an unknown record.
    #[error(transparent)]
    NotFound(#[from] NotFound),
    /// A backing store failed.
    #[error(transparent)]
    Unavailable(#[from] StoreError),
}

/// Reasons a dynamic-programming table cannot be rebuilt from raw rows.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TableShapeError {
    /// The table contained no rows or no columns.
    #[error("dp table must contain at least one cell")]
    Empty,
    /// Rows did not share a common width.
    #[error("dp table row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Index of the first row with an unexpected width.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width found on the offending row.
        found: usize,
    },
}

/// Raised when a difficulty name or level is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown difficulty `{0}`; expected easy, medium, hard or 1-3")]
pub struct ParseDifficultyError(pub String);

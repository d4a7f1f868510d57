//! Error types for `BlockList`.

use thiserror::Error;

/// Result type alias for fallible `BlockList` operations.
pub type Result<T> = std::result::Result<T, BlockListError>;

/// Rejected block capacity at construction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The requested capacity was below zero.
    #[error("block capacity is negative ({0})")]
    NegativeBlockCapacity(isize),

    /// The requested capacity was non-negative but under the floor.
    #[error("block capacity is too small ({capacity}), must be at least {minimum}")]
    BlockCapacityTooSmall {
        /// The capacity that was asked for.
        capacity: usize,
        /// The smallest capacity a block may have.
        minimum: usize,
    },
}

/// The error type for `BlockList` and `Cursor` operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BlockListError {
    /// The list could not be configured.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// An index addressed a position outside the list.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The list length at the time of the call.
        len: usize,
    },

    /// The list was structurally modified behind a cursor's back.
    #[error("list modified during traversal (expected modification {expected}, found {found})")]
    ConcurrentModification {
        /// The counter value the cursor last observed.
        expected: u64,
        /// The counter value the list reports now.
        found: u64,
    },

    /// A cursor was asked to remove or replace without a current element.
    #[error("cursor has no current element")]
    NoCurrentElement,
}

impl BlockListError {
    #[inline]
    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}

//! Invariant violations for ordered collections
//!
//! These indicate programming errors, not user mistakes: malformed requests
//! coming from the UI are no-ops and never produce one of these.

use crate::item::ItemKey;

/// Broken collection invariant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// Display order does not equal position plus one
    #[error("display order mismatch at index {index}: expected {expected}, found {found}")]
    OrderMismatch {
        /// Array index
        index: usize,
        /// `index + 1`
        expected: u32,
        /// Stored value
        found: u32,
    },

    /// Two items share a slot key
    #[error("duplicate item key {0}")]
    DuplicateKey(ItemKey),

    /// Slot key was never handed out by the collection
    #[error("item key {key} outside issued range (next key {next})")]
    KeyOutOfRange {
        /// Offending key
        key: ItemKey,
        /// Next key the collection would issue
        next: u32,
    },

    /// More items than the cardinality limit allows
    #[error("collection holds {len} items, limit is {limit}")]
    LimitExceeded {
        /// Current length
        len: usize,
        /// Configured limit
        limit: usize,
    },
}

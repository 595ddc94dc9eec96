//! Error types for selection indexes and lookups

/// Rejected candidate choice
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// Identity was zero or negative
    #[error("invalid choice id {0}")]
    InvalidId(i64),

    /// Label was empty after trimming
    #[error("choice {id} has an empty label")]
    EmptyLabel {
        /// Raw id of the candidate
        id: i64,
    },
}

/// Failure reported by a candidate source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// Transport-level failure (connection, status code)
    #[error("lookup transport failed: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("lookup response malformed: {0}")]
    Decode(String),

    /// Source gave up waiting
    #[error("lookup timed out")]
    Timeout,
}

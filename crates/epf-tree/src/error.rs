//! Error types for the profile tree
//!
//! Malformed UI requests are not errors here; they come back as
//! [`Dispatch::Ignored`](crate::Dispatch::Ignored). These types cover
//! import, configuration and persistence failures.

use crate::level::Level;
use epf_collection::InvariantViolation;
use std::path::PathBuf;

/// Main tree error type
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Imported record has the wrong shape
    #[error("invalid {level} record: {reason}")]
    InvalidRecord {
        /// Level of the offending record
        level: Level,
        /// What was wrong
        reason: String,
    },

    /// Profile id was zero or negative
    #[error("invalid profile id {0}")]
    InvalidProfileId(i64),

    /// JSON decoding or encoding failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A collection invariant was found broken
    #[error("collection invariant broken at {level}: {source}")]
    Invariant {
        /// Level of the broken collection
        level: Level,
        /// Underlying violation
        #[source]
        source: InvariantViolation,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Persistence collaborator rejected the submission
    #[error("persistence failed: {0}")]
    Persist(String),
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML did not parse
    #[error("invalid config toml: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML could not be produced
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Values parsed but are unusable
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_record_display() {
        let err = TreeError::InvalidRecord {
            level: Level::EffectTag,
            reason: "missing effecttag_id".into(),
        };
        assert_eq!(err.to_string(), "invalid effect tag record: missing effecttag_id");
    }

    #[test]
    fn config_error_wraps() {
        let err: TreeError = ConfigError::Invalid("empty prefix".into()).into();
        assert!(matches!(err, TreeError::Config(_)));
    }
}

//! EPF Index
//!
//! Choice registries for lookup-assisted fields.
//!
//! # Core Concepts
//!
//! - [`SelectionIndex`]: id to [`Choice`] map with case-insensitive prefix
//!   filtering over a radix trie
//! - [`CandidateSource`]: Async search collaborator (HTTP in production,
//!   fakes in tests)
//! - [`SuggestionBox`]: Per-field suggestion list, cached per term, where the
//!   most recently issued request always wins
//!
//! # Example
//!
//! ```rust
//! use epf_collection::RecordId;
//! use epf_index::{Choice, SelectionIndex};
//!
//! let index = SelectionIndex::from_choices([
//!     Choice::new(RecordId::new(1).unwrap(), "Liver weight"),
//!     Choice::new(RecordId::new(2).unwrap(), "Kidney"),
//! ]);
//!
//! assert_eq!(index.matching("liv").len(), 1);
//! assert_eq!(index.label(RecordId::new(2).unwrap()), Some("Kidney"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod index;
mod lookup;

// Re-exports
pub use error::{IndexError, LookupError};
pub use index::{Choice, SelectionIndex};
pub use lookup::{CandidateSource, LookupConfig, QueryOutcome, RawCandidate, SuggestionBox};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

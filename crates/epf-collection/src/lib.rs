//! EPF Collection
//!
//! One level of an editable, ordered formset.
//!
//! # Core Concepts
//!
//! - [`OrderedItem`]: A record with a stable slot key, a persisted identity and
//!   a 1-based display order
//! - [`OrderedCollection`]: Append / move-up / move-down / remove / renumber
//!   over a sequence of items
//! - [`LevelPolicy`]: Per-level placeholder, cardinality and visibility rules
//! - [`ItemView`]: Pure per-item projection consumed by a renderer
//!
//! # Example
//!
//! ```rust
//! use epf_collection::{LevelPolicy, OrderedCollection, ParentState, Payload};
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Row {
//!     title: String,
//! }
//!
//! impl Payload for Row {
//!     fn is_blank(&self) -> bool {
//!         self.title.is_empty()
//!     }
//! }
//!
//! let mut rows = OrderedCollection::<Row>::load(
//!     Vec::new(),
//!     LevelPolicy::always_placeholder(),
//!     ParentState::New,
//! );
//! assert_eq!(rows.len(), 1);
//!
//! rows.append(Row { title: "second".into() });
//! assert!(rows.move_up(1));
//! assert_eq!(rows.display_orders(), vec![1, 2]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod collection;
mod error;
mod item;
mod policy;
mod view;

// Re-exports
pub use collection::{BlankFn, OrderedCollection};
pub use error::InvariantViolation;
pub use item::{ItemKey, OrderedItem, Payload, RecordId, Visibility};
pub use policy::{LevelPolicy, ParentState, PlaceholderPolicy};
pub use view::{ItemView, Stripe};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

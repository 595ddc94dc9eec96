//! EPF Tree
//!
//! The evidence-profile editor model: a four-level tree of ordered
//! collections (streams, scenarios, effect tags, studies) plus outcomes,
//! confidence factors and cross-stream inferences, edited through typed
//! actions.
//!
//! # Core Concepts
//!
//! - [`EvidenceProfile`]: Root of the tree; imports the server JSON shape,
//!   applies [`Action`]s and flattens back into form fields
//! - [`ActionParser`] / [`Naming`]: The textual identifier grammar
//!   (`scenarioButton_2_1_moveup`, `stream_2_1_scenario_scenario_name`)
//!   derived from [`EditorConfig`]
//! - [`Dispatch`]: Outcome of an edit; malformed or out-of-range requests
//!   come back as [`Dispatch::Ignored`] rather than errors
//! - [`OutcomeKey`]: Composite `title|score` reference from a scenario to one
//!   of its stream's outcomes
//! - [`ProfileView`]: Render snapshot with captions, buttons and field values
//!
//! # Example
//!
//! ```rust
//! use epf_tree::{Dispatch, EditorConfig, EvidenceProfile, IgnoreReason};
//! use std::sync::Arc;
//!
//! let mut profile = EvidenceProfile::new(Arc::new(EditorConfig::default())).unwrap();
//! profile.stream_mut(1).unwrap().stream_title = "Animal".into();
//!
//! assert!(profile.apply_id("scenarioButton_1_add").is_changed());
//! assert_eq!(
//!     profile.apply_id("scenarioButton_1_1_moveup"),
//!     Dispatch::Ignored(IgnoreReason::AtBoundary)
//! );
//!
//! let form = profile.flatten();
//! assert_eq!(form["stream_1_stream_title"], "Animal");
//! assert_eq!(form["stream_1_2_scenario_order"], "2");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod action;
mod config;
mod error;
mod level;
mod model;
mod naming;
mod options;
mod persist;
mod record;
mod select;
mod tree;
mod view;

// Re-exports
pub use action::{Action, ActionKind, ActionParser, Dispatch, IgnoreReason, ItemPath};
pub use config::{EditorConfig, LevelConfig, NamingConfig};
pub use error::{ConfigError, TreeError};
pub use level::Level;
pub use model::{
    ConfidenceFactor, EffectTag, Inference, JudgementLevel, Outcome, Scenario, Stream,
    StreamJudgement, StudyRef, SummaryOfFindings,
};
pub use naming::Naming;
pub use options::{OutcomeKey, OutcomeKeyError};
pub use persist::{FlatForm, PersistenceSink};
pub use record::{
    EffectTagRecord, FactorRecord, InferenceRecord, OutcomeRecord, OutcomeRefRecord,
    ProfileRecord, ScenarioRecord, ScopeRecord, StreamRecord,
};
pub use tree::{EvidenceProfile, SelectionScope};
pub use view::{EffectTagView, LevelView, ProfileView, RowView, ScenarioView, StreamView};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Form field names and button identifiers
//!
//! Names are derived from slots on demand and never stored:
//!
//! - inferences: `inference_<slot>_<field>`
//! - streams: `stream_<slot>_<field>`
//! - nested rows: `stream_<ancestor>..._<slot>_<levelName>_<field>`
//! - confidence factors: `stream_<s>_<scenario>_<increase|decrease>_<slot>_<levelName>_<field>`
//! - add buttons: `<buttonPrefix>[_<ancestor>...]_add`
//! - row buttons: `<buttonPrefix>_<ancestor>..._<slot>_<keyword>`

use crate::action::{ActionKind, ItemPath};
use crate::config::EditorConfig;
use crate::level::Level;
use std::fmt::Write;

/// Name builder bound to one configuration
#[derive(Debug, Clone, Copy)]
pub struct Naming<'a> {
    config: &'a EditorConfig,
}

fn join_slots(out: &mut String, slots: &[u32]) {
    for slot in slots {
        // Writing to a String cannot fail
        let _ = write!(out, "_{slot}");
    }
}

impl<'a> Naming<'a> {
    /// Create name builder
    #[inline]
    #[must_use]
    pub fn new(config: &'a EditorConfig) -> Self {
        Self { config }
    }

    /// Common prefix of every field of one row
    #[must_use]
    pub fn field_prefix(&self, path: &ItemPath) -> String {
        let naming = &self.config.naming;
        let level_name = &self.config.level(path.level).level_name;

        match path.level {
            Level::Inference => format!("{}_{}", naming.inference_prefix, path.slot),
            Level::Stream => format!("{}_{}", naming.stream_prefix, path.slot),
            Level::IncreaseFactor | Level::DecreaseFactor => {
                let segment = if path.level == Level::IncreaseFactor {
                    &naming.increase_segment
                } else {
                    &naming.decrease_segment
                };

                let mut out = naming.stream_prefix.clone();
                join_slots(&mut out, &path.ancestors);
                let _ = write!(out, "_{segment}_{}_{level_name}", path.slot);
                out
            }
            Level::Outcome | Level::Scenario | Level::EffectTag | Level::Study => {
                let mut out = naming.stream_prefix.clone();
                join_slots(&mut out, &path.slots());
                let _ = write!(out, "_{level_name}");
                out
            }
        }
    }

    /// Full name of one field of one row
    #[must_use]
    pub fn field(&self, path: &ItemPath, field: &str) -> String {
        format!("{}_{field}", self.field_prefix(path))
    }

    /// Identifier of the "add new" button for the collection under
    /// `ancestors`
    #[must_use]
    pub fn add_button(&self, level: Level, ancestors: &[u32]) -> String {
        let mut out = self.config.level(level).button_prefix.clone();
        join_slots(&mut out, ancestors);
        out.push_str("_add");
        out
    }

    /// Identifier of a row button; `None` for [`ActionKind::Add`]
    #[must_use]
    pub fn row_button(&self, path: &ItemPath, kind: ActionKind) -> Option<String> {
        if kind == ActionKind::Add {
            return None;
        }

        let level = self.config.level(path.level);
        let mut out = level.button_prefix.clone();
        join_slots(&mut out, &path.slots());
        out.push('_');
        out.push_str(&kind.keyword(&level.level_name));
        Some(out)
    }

    /// Fields posted for one level, in form order
    #[must_use]
    pub fn fields(level: Level) -> &'static [&'static str] {
        match level {
            Level::Inference => &["title", "description", "order"],
            Level::Stream => &[
                "pk",
                "stream_type",
                "stream_title",
                "confidence_judgement_title",
                "confidence_judgement_score",
                "confidence_judgement_explanation",
                "order",
            ],
            Level::Outcome => &["title", "score", "explanation", "order"],
            Level::Scenario => &[
                "pk",
                "scenario_name",
                "outcome",
                "summary_of_findings_score",
                "summary_of_findings_explanation",
                "order",
            ],
            Level::EffectTag | Level::Study => &["pk", "order"],
            Level::IncreaseFactor | Level::DecreaseFactor => &["pk", "explanation", "order"],
        }
    }
}

//! Level payloads
//!
//! Each payload owns the collections nested below it, so dropping a row
//! drops its whole subtree.

use crate::options::OutcomeKey;
use epf_collection::{OrderedCollection, OrderedItem, Payload};
use serde::{Deserialize, Serialize};

fn all_placeholders<P: Payload>(collection: &OrderedCollection<P>) -> bool {
    collection.iter().all(OrderedItem::is_placeholder)
}

/// Conclusion drawn across all streams
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inference {
    /// Short title
    pub title: String,
    /// Free-text description
    pub description: String,
}

impl Payload for Inference {
    fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.description.trim().is_empty()
    }
}

/// Overall confidence judgement of a stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamJudgement {
    /// Judgement title
    #[serde(default)]
    pub title: String,
    /// Judgement score, one of the confidence judgement values
    #[serde(default, deserialize_with = "crate::record::lenient_int")]
    pub score: Option<i64>,
    /// Display name of the score
    #[serde(default)]
    pub name: String,
    /// Free-text explanation
    #[serde(default)]
    pub explanation: String,
}

impl StreamJudgement {
    fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.score.is_none() && self.explanation.trim().is_empty()
    }
}

/// One line of evidence
#[derive(Debug, Clone, Default)]
pub struct Stream {
    /// Stream type value
    pub stream_type: Option<i64>,
    /// Title
    pub stream_title: String,
    /// Overall judgement
    pub confidence_judgement: StreamJudgement,
    /// Outcomes, also the option set for scenario outcomes
    pub outcomes: OrderedCollection<Outcome>,
    /// Scenarios
    pub scenarios: OrderedCollection<Scenario>,
}

impl Payload for Stream {
    fn is_blank(&self) -> bool {
        self.stream_type.is_none()
            && self.stream_title.trim().is_empty()
            && self.confidence_judgement.is_blank()
            && all_placeholders(&self.outcomes)
            && all_placeholders(&self.scenarios)
    }
}

/// Outcome of a stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Title
    pub title: String,
    /// Confidence judgement value
    pub score: Option<i64>,
    /// Free-text explanation
    pub explanation: String,
}

impl Outcome {
    /// Create outcome without explanation
    #[must_use]
    pub fn new(title: impl Into<String>, score: Option<i64>) -> Self {
        Self {
            title: title.into(),
            score,
            explanation: String::new(),
        }
    }
}

impl Payload for Outcome {
    fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.score.is_none() && self.explanation.trim().is_empty()
    }
}

/// Summary of findings for a scenario
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOfFindings {
    /// Confidence judgement value
    #[serde(default, deserialize_with = "crate::record::lenient_int")]
    pub score: Option<i64>,
    /// Free-text explanation
    #[serde(default)]
    pub explanation: String,
}

/// Scenario within a stream
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    /// Name
    pub scenario_name: String,
    /// Selected outcome of the owning stream
    pub outcome: Option<OutcomeKey>,
    /// Summary of findings
    pub summary_of_findings: SummaryOfFindings,
    /// Effect tags with their studies
    pub effect_tags: OrderedCollection<EffectTag>,
    /// Factors increasing confidence
    pub increase_factors: OrderedCollection<ConfidenceFactor>,
    /// Factors decreasing confidence
    pub decrease_factors: OrderedCollection<ConfidenceFactor>,
}

impl Scenario {
    /// Factor collection for the increase or decrease side
    #[must_use]
    pub fn factors(&self, increase: bool) -> &OrderedCollection<ConfidenceFactor> {
        if increase {
            &self.increase_factors
        } else {
            &self.decrease_factors
        }
    }

    /// Mutable factor collection for the increase or decrease side
    pub fn factors_mut(&mut self, increase: bool) -> &mut OrderedCollection<ConfidenceFactor> {
        if increase {
            &mut self.increase_factors
        } else {
            &mut self.decrease_factors
        }
    }
}

impl Payload for Scenario {
    fn is_blank(&self) -> bool {
        self.scenario_name.trim().is_empty()
            && self.outcome.is_none()
            && self.summary_of_findings == SummaryOfFindings::default()
            && all_placeholders(&self.effect_tags)
            && all_placeholders(&self.increase_factors)
            && all_placeholders(&self.decrease_factors)
    }
}

/// Effect tag; its identity is the tag id
#[derive(Debug, Clone, Default)]
pub struct EffectTag {
    /// Studies supporting the tag
    pub studies: OrderedCollection<StudyRef>,
}

impl Payload for EffectTag {
    fn is_blank(&self) -> bool {
        all_placeholders(&self.studies)
    }
}

/// Study reference; its identity is the study id and its title comes from
/// the study index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudyRef;

impl Payload for StudyRef {
    fn is_blank(&self) -> bool {
        true
    }
}

/// Confidence factor; its identity is the factor id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfidenceFactor {
    /// Explanation, prefilled from the factor's default
    pub explanation: String,
}

impl Payload for ConfidenceFactor {
    fn is_blank(&self) -> bool {
        self.explanation.trim().is_empty()
    }
}

/// One entry of the confidence judgement scale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgementLevel {
    /// Stored value
    pub value: i64,
    /// Display name
    pub name: String,
}

impl JudgementLevel {
    /// Create judgement level
    #[must_use]
    pub fn new(value: i64, name: impl Into<String>) -> Self {
        Self {
            value,
            name: name.into(),
        }
    }
}

//! Server record shapes
//!
//! The nested JSON the server hands to the editor, and which
//! [`EvidenceProfile::to_json`](crate::EvidenceProfile::to_json) produces.
//! Integers are read leniently: form-originated payloads carry `""` or
//! numeric strings where a number is meant.

use crate::model::{JudgementLevel, StreamJudgement, SummaryOfFindings};
use epf_index::Choice;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseInt {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Accept `null`, `""`, integers and integer strings
pub(crate) fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LooseInt>::deserialize(deserializer)?;

    match raw {
        None => Ok(None),
        Some(LooseInt::Int(value)) => Ok(Some(value)),
        #[allow(clippy::cast_possible_truncation)]
        Some(LooseInt::Float(value)) if value.fract() == 0.0 => Ok(Some(value as i64)),
        Some(LooseInt::Float(value)) => Err(serde::de::Error::custom(format!(
            "expected an integer, found {value}"
        ))),
        Some(LooseInt::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(LooseInt::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected an integer, found {text:?}"))),
    }
}

/// Whole evidence profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    /// Primary key; absent for a new profile
    #[serde(deserialize_with = "lenient_int")]
    pub id: Option<i64>,
    /// Title
    pub title: String,
    /// URL slug
    pub slug: String,
    /// Caption
    pub caption: String,
    /// Restrict every stream to a single scenario
    pub one_scenario_per_stream: bool,
    /// Cross-stream inferences
    pub cross_stream_inferences: Vec<InferenceRecord>,
    /// Streams
    pub streams: Vec<StreamRecord>,
    /// Option lists available to the editor
    #[serde(skip_serializing_if = "ScopeRecord::is_empty")]
    pub scope: ScopeRecord,
}

/// Option lists shipped with a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeRecord {
    /// Known effect tags
    pub effect_tags: Vec<Choice>,
    /// Known studies
    pub studies: Vec<Choice>,
    /// Confidence factors, with default explanations as detail
    pub confidence_factors: Vec<Choice>,
    /// Confidence judgement scale
    pub confidence_judgements: Vec<JudgementLevel>,
}

impl ScopeRecord {
    fn is_empty(&self) -> bool {
        self.effect_tags.is_empty()
            && self.studies.is_empty()
            && self.confidence_factors.is_empty()
            && self.confidence_judgements.is_empty()
    }
}

/// Cross-stream inference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceRecord {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
}

/// Stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamRecord {
    /// Primary key
    #[serde(deserialize_with = "lenient_int")]
    pub pk: Option<i64>,
    /// Stream type value
    #[serde(deserialize_with = "lenient_int")]
    pub stream_type: Option<i64>,
    /// Title
    pub stream_title: String,
    /// Overall judgement
    pub confidence_judgement: StreamJudgement,
    /// Outcomes
    pub outcomes: Vec<OutcomeRecord>,
    /// Scenarios
    pub scenarios: Vec<ScenarioRecord>,
}

/// Outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeRecord {
    /// Title
    pub title: String,
    /// Score
    #[serde(deserialize_with = "lenient_int")]
    pub score: Option<i64>,
    /// Explanation
    pub explanation: String,
}

/// Outcome picked by a scenario
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeRefRecord {
    /// Outcome title
    pub title: String,
    /// Outcome score
    #[serde(deserialize_with = "lenient_int")]
    pub score: Option<i64>,
}

/// Scenario
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioRecord {
    /// Primary key
    #[serde(deserialize_with = "lenient_int")]
    pub pk: Option<i64>,
    /// Name
    pub scenario_name: String,
    /// Picked outcome
    pub outcome: Option<OutcomeRefRecord>,
    /// Summary of findings
    pub summary_of_findings: SummaryOfFindings,
    /// Effect tags with their studies
    #[serde(rename = "studies")]
    pub effect_tags: Vec<EffectTagRecord>,
    /// Factors increasing confidence
    #[serde(rename = "confidencefactors_increase")]
    pub increase_factors: Vec<FactorRecord>,
    /// Factors decreasing confidence
    #[serde(rename = "confidencefactors_decrease")]
    pub decrease_factors: Vec<FactorRecord>,
}

/// Effect tag with its studies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectTagRecord {
    /// Tag id
    #[serde(rename = "effecttag_id")]
    pub effect_tag_id: i64,
    /// Study ids
    pub studies: Vec<i64>,
}

/// Confidence factor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorRecord {
    /// Factor id
    #[serde(rename = "confidencefactor_id", alias = "id")]
    pub id: i64,
    /// Factor label as the server knows it
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Explanation
    pub explanation: String,
}

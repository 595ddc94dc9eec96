//! Outcome option set
//!
//! A scenario picks one of its stream's outcomes. The choice is stored as
//! the composite `title|score`, and the list of choices is recomputed from
//! the current outcomes every time it is read.

use crate::model::{Outcome, Scenario, Stream};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Composite `title|score` reference to an outcome
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutcomeKey {
    /// Outcome title
    pub title: String,
    /// Outcome score
    pub score: Option<i64>,
}

impl OutcomeKey {
    /// Create outcome key
    #[must_use]
    pub fn new(title: impl Into<String>, score: Option<i64>) -> Self {
        Self {
            title: title.into(),
            score,
        }
    }

    /// Key of an outcome, `None` for blank outcomes
    #[must_use]
    pub fn of(outcome: &Outcome) -> Option<Self> {
        let title = outcome.title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self::new(title, outcome.score))
    }
}

impl Display for OutcomeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.score {
            Some(score) => write!(f, "{}|{score}", self.title),
            None => write!(f, "{}|", self.title),
        }
    }
}

/// Failure to parse an [`OutcomeKey`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutcomeKeyError {
    /// No `|` separator
    #[error("outcome key {0:?} has no '|' separator")]
    MissingSeparator(String),

    /// Title part empty
    #[error("outcome key {0:?} has an empty title")]
    EmptyTitle(String),

    /// Score part not an integer
    #[error("outcome key {0:?} has a non-integer score")]
    BadScore(String),
}

impl FromStr for OutcomeKey {
    type Err = OutcomeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (title, score) = s
            .rsplit_once('|')
            .ok_or_else(|| OutcomeKeyError::MissingSeparator(s.to_string()))?;

        let title = title.trim();
        if title.is_empty() {
            return Err(OutcomeKeyError::EmptyTitle(s.to_string()));
        }

        let score = score.trim();
        let score = if score.is_empty() {
            None
        } else {
            Some(
                score
                    .parse::<i64>()
                    .map_err(|_| OutcomeKeyError::BadScore(s.to_string()))?,
            )
        };

        Ok(Self::new(title, score))
    }
}

impl Serialize for OutcomeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OutcomeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Stream {
    /// Outcomes a scenario of this stream may pick, in display order
    ///
    /// Blank outcomes are left out; when two outcomes share a key the
    /// first one wins.
    #[must_use]
    pub fn outcome_options(&self) -> IndexMap<OutcomeKey, String> {
        let mut options = IndexMap::new();

        for item in &self.outcomes {
            if let Some(key) = OutcomeKey::of(item.payload()) {
                let label = key.title.clone();
                options.entry(key).or_insert(label);
            }
        }

        options
    }

    /// Whether `key` names one of the current outcomes
    #[must_use]
    pub fn offers_outcome(&self, key: &OutcomeKey) -> bool {
        self.outcome_options().contains_key(key)
    }

    /// The outcome `scenario` picked, if it still names a current outcome
    #[must_use]
    pub fn resolved_outcome<'a>(&self, scenario: &'a Scenario) -> Option<&'a OutcomeKey> {
        scenario.outcome.as_ref().filter(|key| self.offers_outcome(key))
    }

    /// Drop scenario outcome picks that no longer resolve
    ///
    /// Returns how many picks were cleared.
    pub fn clear_stale_outcomes(&mut self) -> usize {
        let options = self.outcome_options();
        let mut cleared = 0;

        for item in self.scenarios.iter_mut() {
            let scenario = item.payload_mut();
            if scenario.outcome.as_ref().is_some_and(|key| !options.contains_key(key)) {
                tracing::debug!(outcome = ?scenario.outcome, "clearing stale outcome pick");
                scenario.outcome = None;
                cleared += 1;
            }
        }

        cleared
    }
}

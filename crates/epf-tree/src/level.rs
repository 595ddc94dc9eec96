//! Tree levels

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// One level of the evidence-profile tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Cross-stream inference (top level)
    Inference,
    /// Evidence stream (top level)
    Stream,
    /// Outcome within a stream
    Outcome,
    /// Scenario within a stream
    Scenario,
    /// Effect tag within a scenario
    EffectTag,
    /// Study within an effect tag
    Study,
    /// Factor increasing confidence, within a scenario
    IncreaseFactor,
    /// Factor decreasing confidence, within a scenario
    DecreaseFactor,
}

impl Level {
    /// Every level, parents before children
    pub const ALL: [Level; 8] = [
        Level::Inference,
        Level::Stream,
        Level::Outcome,
        Level::Scenario,
        Level::EffectTag,
        Level::Study,
        Level::IncreaseFactor,
        Level::DecreaseFactor,
    ];

    /// Number of ancestor slots needed to address a collection at this level
    #[inline]
    #[must_use]
    pub fn depth(self) -> usize {
        match self {
            Self::Inference | Self::Stream => 0,
            Self::Outcome | Self::Scenario => 1,
            Self::EffectTag | Self::IncreaseFactor | Self::DecreaseFactor => 2,
            Self::Study => 3,
        }
    }

    /// Check if this is a confidence factor level
    #[inline]
    #[must_use]
    pub fn is_confidence_factor(self) -> bool {
        matches!(self, Self::IncreaseFactor | Self::DecreaseFactor)
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Inference => "inference",
            Self::Stream => "stream",
            Self::Outcome => "outcome",
            Self::Scenario => "scenario",
            Self::EffectTag => "effect tag",
            Self::Study => "study",
            Self::IncreaseFactor => "increase factor",
            Self::DecreaseFactor => "decrease factor",
        };
        f.write_str(name)
    }
}

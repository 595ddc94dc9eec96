//! Editor configuration
//!
//! Identifier prefixes, per-level collection rules and lookup tuning.
//! [`EditorConfig::default`] reproduces the stock evidence-profile page.

use crate::error::ConfigError;
use crate::level::Level;
use epf_collection::{LevelPolicy, PlaceholderPolicy, Visibility};
use epf_index::LookupConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// ASCII letter followed by ASCII letters or digits
fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

/// Rules and names for one tree level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Name segment used in field names and show/hide keywords
    pub level_name: String,

    /// Prefix of button identifiers
    pub button_prefix: String,

    /// Whether the level has a caption/detail toggle
    #[serde(default)]
    pub collapsible: bool,

    /// Collection rules
    #[serde(default)]
    pub policy: LevelPolicy,
}

impl LevelConfig {
    /// Create level config
    #[must_use]
    pub fn new(level_name: impl Into<String>, button_prefix: impl Into<String>) -> Self {
        Self {
            level_name: level_name.into(),
            button_prefix: button_prefix.into(),
            collapsible: false,
            policy: LevelPolicy::default(),
        }
    }

    /// With caption/detail toggle
    #[inline]
    #[must_use]
    pub fn with_collapsible(mut self, collapsible: bool) -> Self {
        self.collapsible = collapsible;
        self
    }

    /// With collection rules
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: LevelPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Lowercase level name as used in show/hide keywords
    #[must_use]
    pub fn keyword_name(&self) -> String {
        self.level_name.to_lowercase()
    }
}

/// Field name prefixes understood by the persistence side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Leading segment of inference fields
    pub inference_prefix: String,

    /// Leading segment of stream fields and everything nested below
    pub stream_prefix: String,

    /// Segment separating increase factors from their scenario
    pub increase_segment: String,

    /// Segment separating decrease factors from their scenario
    pub decrease_segment: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            inference_prefix: "inference".to_string(),
            stream_prefix: "stream".to_string(),
            increase_segment: "increase".to_string(),
            decrease_segment: "decrease".to_string(),
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Field name prefixes
    pub naming: NamingConfig,

    /// Cross-stream inferences
    pub inference: LevelConfig,

    /// Streams
    pub stream: LevelConfig,

    /// Outcomes
    pub outcome: LevelConfig,

    /// Scenarios
    pub scenario: LevelConfig,

    /// Effect tags
    pub effect_tag: LevelConfig,

    /// Studies
    pub study: LevelConfig,

    /// Factors increasing confidence
    pub increase_factor: LevelConfig,

    /// Factors decreasing confidence
    pub decrease_factor: LevelConfig,

    /// Lookup tuning
    pub lookup: LookupConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let trailing = LevelPolicy::always_placeholder();
        let on_new_parent = LevelPolicy::new()
            .with_placeholder(PlaceholderPolicy::WhenParentNew)
            .with_new_item_visibility(Visibility::Expanded);
        let on_empty = LevelPolicy::new()
            .with_placeholder(PlaceholderPolicy::WhenEmpty)
            .with_new_item_visibility(Visibility::Expanded);

        Self {
            naming: NamingConfig::default(),
            inference: LevelConfig::new("inference", "inferenceButton")
                .with_collapsible(true)
                .with_policy(trailing),
            stream: LevelConfig::new("stream", "streamButton").with_policy(
                trailing.with_loaded_visibility(Visibility::Expanded),
            ),
            outcome: LevelConfig::new("outcome", "outcomeButton").with_policy(
                trailing.with_loaded_visibility(Visibility::Expanded),
            ),
            scenario: LevelConfig::new("scenario", "scenarioButton")
                .with_collapsible(true)
                .with_policy(trailing),
            effect_tag: LevelConfig::new("effectTag", "effectTagButton")
                .with_collapsible(true)
                .with_policy(on_new_parent),
            study: LevelConfig::new("study", "studyButton").with_policy(
                on_new_parent.with_loaded_visibility(Visibility::Expanded),
            ),
            increase_factor: LevelConfig::new("confidenceFactor", "increaseFactorButton")
                .with_collapsible(true)
                .with_policy(on_empty),
            decrease_factor: LevelConfig::new("confidenceFactor", "decreaseFactorButton")
                .with_collapsible(true)
                .with_policy(on_empty),
            lookup: LookupConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate TOML
    ///
    /// # Errors
    /// Returns error if the TOML is malformed or fails validation
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or its contents are invalid
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), "loaded editor config");
        Ok(config)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Settings for one level
    #[must_use]
    pub fn level(&self, level: Level) -> &LevelConfig {
        match level {
            Level::Inference => &self.inference,
            Level::Stream => &self.stream,
            Level::Outcome => &self.outcome,
            Level::Scenario => &self.scenario,
            Level::EffectTag => &self.effect_tag,
            Level::Study => &self.study,
            Level::IncreaseFactor => &self.increase_factor,
            Level::DecreaseFactor => &self.decrease_factor,
        }
    }

    /// Mutable settings for one level
    pub fn level_mut(&mut self, level: Level) -> &mut LevelConfig {
        match level {
            Level::Inference => &mut self.inference,
            Level::Stream => &mut self.stream,
            Level::Outcome => &mut self.outcome,
            Level::Scenario => &mut self.scenario,
            Level::EffectTag => &mut self.effect_tag,
            Level::Study => &mut self.study,
            Level::IncreaseFactor => &mut self.increase_factor,
            Level::DecreaseFactor => &mut self.decrease_factor,
        }
    }

    /// Collection rules for one level
    #[inline]
    #[must_use]
    pub fn policy(&self, level: Level) -> LevelPolicy {
        self.level(level).policy
    }

    /// With settings for one level replaced
    #[must_use]
    pub fn with_level(mut self, level: Level, config: LevelConfig) -> Self {
        *self.level_mut(level) = config;
        self
    }

    /// With lookup tuning
    #[inline]
    #[must_use]
    pub fn with_lookup(mut self, lookup: LookupConfig) -> Self {
        self.lookup = lookup;
        self
    }

    /// Check that identifiers built from this config can be parsed back
    ///
    /// # Errors
    /// Returns error for empty or non-alphanumeric names, or duplicate
    /// button prefixes
    pub fn validate(&self) -> Result<(), ConfigError> {
        let naming = [
            ("naming.inference_prefix", &self.naming.inference_prefix),
            ("naming.stream_prefix", &self.naming.stream_prefix),
            ("naming.increase_segment", &self.naming.increase_segment),
            ("naming.decrease_segment", &self.naming.decrease_segment),
        ];
        for (key, value) in naming {
            if !is_identifier(value) {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be alphanumeric, got {value:?}"
                )));
            }
        }

        let mut prefixes = HashSet::new();
        for level in Level::ALL {
            let config = self.level(level);

            if !is_identifier(&config.level_name) {
                return Err(ConfigError::Invalid(format!(
                    "{level} level name must be alphanumeric, got {:?}",
                    config.level_name
                )));
            }
            if !is_identifier(&config.button_prefix) {
                return Err(ConfigError::Invalid(format!(
                    "{level} button prefix must be alphanumeric, got {:?}",
                    config.button_prefix
                )));
            }
            if !prefixes.insert(config.button_prefix.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "button prefix {:?} is used by more than one level",
                    config.button_prefix
                )));
            }
            if config.policy.cardinality_limit == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "{level} cardinality limit must be at least 1"
                )));
            }
        }

        if self.naming.increase_segment == self.naming.decrease_segment {
            return Err(ConfigError::Invalid(
                "increase and decrease segments must differ".to_string(),
            ));
        }

        Ok(())
    }
}

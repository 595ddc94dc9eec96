//! Lookup-assisted choice fields
//!
//! A [`SuggestionBox`] sits in front of a [`CandidateSource`] and keeps the
//! current suggestion list for one typeahead field. Every request is tagged
//! with a sequence number and only the newest request may replace the
//! list, so a slow response for an old term can never overwrite a fresher
//! one.

use crate::error::{IndexError, LookupError};
use crate::index::Choice;
use async_trait::async_trait;
use moka::future::Cache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Candidate exactly as returned by a search endpoint
///
/// Endpoints disagree on field names; whichever of `label`, or the
/// `title` plus `short_citation` pair, is present becomes the label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandidate {
    /// Raw id; non-positive ids are discarded
    pub id: i64,

    /// Ready-made display label
    #[serde(default, alias = "value")]
    pub label: Option<String>,

    /// Record title
    #[serde(default)]
    pub title: Option<String>,

    /// Short bibliographic citation (studies)
    #[serde(default)]
    pub short_citation: Option<String>,

    /// Secondary text
    #[serde(default, alias = "explanation")]
    pub detail: Option<String>,
}

impl RawCandidate {
    /// Candidate with a ready-made label
    #[must_use]
    pub fn labelled(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Study-shaped candidate
    #[must_use]
    pub fn study(id: i64, title: impl Into<String>, short_citation: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
            short_citation: Some(short_citation.into()),
            ..Self::default()
        }
    }

    /// Resolve the display label
    ///
    /// An explicit label wins. Otherwise `title (short_citation)`, or
    /// whichever of the two is non-empty.
    #[must_use]
    pub fn display_label(&self) -> String {
        fn non_empty(value: Option<&String>) -> Option<&str> {
            value.map(|s| s.trim()).filter(|s| !s.is_empty())
        }

        if let Some(label) = non_empty(self.label.as_ref()) {
            return label.to_string();
        }

        match (non_empty(self.title.as_ref()), non_empty(self.short_citation.as_ref())) {
            (Some(title), Some(citation)) => format!("{title} ({citation})"),
            (Some(only), None) | (None, Some(only)) => only.to_string(),
            (None, None) => String::new(),
        }
    }

    /// Convert into a validated choice
    ///
    /// # Errors
    /// Returns error for a non-positive id or an empty label
    pub fn into_choice(self) -> Result<Choice, IndexError> {
        let label = self.display_label();
        Choice::try_new(self.id, &label, self.detail)
    }
}

/// Remote (or fake) search endpoint
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Search for candidates matching `term`
    async fn search(&self, term: &str) -> Result<Vec<RawCandidate>, LookupError>;
}

/// Lookup tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Maximum cached terms
    pub cache_capacity: u64,

    /// Cache time-to-live in seconds
    pub cache_ttl_secs: u64,

    /// Shortest trimmed term that triggers a request
    pub min_term_len: usize,
}

impl LookupConfig {
    /// With cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// With cache TTL
    #[inline]
    #[must_use]
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// With minimum term length
    #[inline]
    #[must_use]
    pub fn with_min_term_len(mut self, len: usize) -> Self {
        self.min_term_len = len;
        self
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 256,
            cache_ttl_secs: 60,
            min_term_len: 1,
        }
    }
}

/// Result of one [`SuggestionBox::query`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Term too short; no request issued, suggestions untouched
    Skipped,

    /// Suggestions replaced with this many choices
    Applied(usize),

    /// A newer request was issued meanwhile; response dropped
    Stale,

    /// Source failed; suggestions untouched
    Failed,
}

#[derive(Debug, Default)]
struct BoxState {
    issued: u64,
    suggestions: Vec<Choice>,
}

/// Suggestion list for one lookup-assisted field
///
/// Cheap to share behind an `Arc`; concurrent queries are allowed and
/// resolved last-issued-wins.
pub struct SuggestionBox {
    source: Arc<dyn CandidateSource>,
    cache: Cache<String, Arc<Vec<Choice>>>,
    min_term_len: usize,
    state: Mutex<BoxState>,
}

impl std::fmt::Debug for SuggestionBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionBox")
            .field("min_term_len", &self.min_term_len)
            .field("cached_terms", &self.cache.entry_count())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SuggestionBox {
    /// Create suggestion box over a source
    #[must_use]
    pub fn new(source: Arc<dyn CandidateSource>, config: LookupConfig) -> Self {
        Self {
            source,
            cache: Cache::builder()
                .max_capacity(config.cache_capacity)
                .time_to_live(Duration::from_secs(config.cache_ttl_secs))
                .build(),
            min_term_len: config.min_term_len.max(1),
            state: Mutex::new(BoxState::default()),
        }
    }

    /// Run a search for `term` and apply it if still current
    pub async fn query(&self, term: &str) -> QueryOutcome {
        let term = term.trim();
        if term.chars().count() < self.min_term_len {
            tracing::debug!(term, "lookup skipped for short term");
            return QueryOutcome::Skipped;
        }

        let seq = {
            let mut state = self.state.lock();
            state.issued += 1;
            state.issued
        };

        let key = term.to_lowercase();
        let choices = match self.cache.get(&key).await {
            Some(cached) => cached,
            None => match self.source.search(term).await {
                Ok(raw) => {
                    let choices = Arc::new(Self::accept(raw));
                    self.cache.insert(key, Arc::clone(&choices)).await;
                    choices
                }
                Err(err) => {
                    tracing::warn!(term, seq, error = %err, "lookup failed");
                    return QueryOutcome::Failed;
                }
            },
        };

        let mut state = self.state.lock();
        if seq != state.issued {
            tracing::debug!(term, seq, newest = state.issued, "dropping stale lookup response");
            return QueryOutcome::Stale;
        }

        state.suggestions = choices.as_ref().clone();
        QueryOutcome::Applied(state.suggestions.len())
    }

    fn accept(raw: Vec<RawCandidate>) -> Vec<Choice> {
        raw.into_iter()
            .filter_map(|candidate| match candidate.into_choice() {
                Ok(choice) => Some(choice),
                Err(err) => {
                    tracing::debug!(error = %err, "discarding lookup candidate");
                    None
                }
            })
            .collect()
    }

    /// Current suggestions
    #[must_use]
    pub fn suggestions(&self) -> Vec<Choice> {
        self.state.lock().suggestions.clone()
    }

    /// Pick a suggestion by id
    #[must_use]
    pub fn pick(&self, id: epf_collection::RecordId) -> Option<Choice> {
        self.state
            .lock()
            .suggestions
            .iter()
            .find(|choice| choice.id == id)
            .cloned()
    }

    /// Drop current suggestions and invalidate any request in flight
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.issued += 1;
        state.suggestions.clear();
    }

    /// Number of requests issued so far
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.state.lock().issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn study_label_composition() {
        assert_eq!(
            RawCandidate::study(1, "Liver effects", "Smith 2001").display_label(),
            "Liver effects (Smith 2001)"
        );
        assert_eq!(RawCandidate::study(1, "", "Smith 2001").display_label(), "Smith 2001");
        assert_eq!(RawCandidate::study(1, "Liver", " ").display_label(), "Liver");
        assert_eq!(RawCandidate::labelled(1, "Explicit").display_label(), "Explicit");
    }

    #[test]
    fn invalid_candidates_rejected() {
        assert!(RawCandidate::labelled(0, "x").into_choice().is_err());
        assert!(RawCandidate::labelled(-1, "x").into_choice().is_err());
        assert!(RawCandidate::labelled(3, "").into_choice().is_err());
        assert!(RawCandidate::labelled(3, "ok").into_choice().is_ok());
    }

    #[test]
    fn raw_candidate_from_json() {
        let raw: RawCandidate =
            serde_json::from_str(r#"{"id": 4, "value": "Hepatic", "explanation": "dose"}"#).unwrap();

        assert_eq!(raw.label.as_deref(), Some("Hepatic"));
        assert_eq!(raw.detail.as_deref(), Some("dose"));
    }

    #[test]
    fn config_builder() {
        let config = LookupConfig::default().with_min_term_len(3).with_cache_capacity(8);

        assert_eq!(config.min_term_len, 3);
        assert_eq!(config.cache_capacity, 8);
        assert_eq!(config.cache_ttl_secs, 60);
    }
}

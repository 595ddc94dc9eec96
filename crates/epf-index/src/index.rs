//! Selection index with radix tree
//!
//! Provides [`SelectionIndex`]: id to [`Choice`] resolution plus prefix
//! filtering over lowercase labels using radix_trie.

use crate::error::IndexError;
use epf_collection::RecordId;
use radix_trie::{Trie, TrieCommon};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One selectable option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Persisted identity of the option
    pub id: RecordId,

    /// Display label
    pub label: String,

    /// Secondary text (a default explanation for confidence factors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Choice {
    /// Create choice without detail
    #[inline]
    #[must_use]
    pub fn new(id: RecordId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            detail: None,
        }
    }

    /// Validate loosely typed input
    ///
    /// # Errors
    /// Returns error if the id is not strictly positive or the label is blank
    pub fn try_new(id: i64, label: &str, detail: Option<String>) -> Result<Self, IndexError> {
        let record = RecordId::from_signed(id).ok_or(IndexError::InvalidId(id))?;
        let label = label.trim();
        if label.is_empty() {
            return Err(IndexError::EmptyLabel { id });
        }

        Ok(Self {
            id: record,
            label: label.to_string(),
            detail: detail.filter(|d| !d.is_empty()),
        })
    }

    /// With secondary text
    #[inline]
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn trie_key(&self) -> String {
        self.label.to_lowercase()
    }
}

/// Read-mostly registry of the options for one kind of lookup field
///
/// The trie maps lowercase labels to every id carrying that label, so
/// duplicate labels are kept apart.
#[derive(Debug, Default)]
pub struct SelectionIndex {
    by_id: HashMap<RecordId, Choice>,
    trie: Trie<String, Vec<RecordId>>,
}

impl SelectionIndex {
    /// Create empty index
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of choices; later entries replace earlier ones with
    /// the same id
    #[must_use]
    pub fn from_choices<I: IntoIterator<Item = Choice>>(choices: I) -> Self {
        let mut index = Self::new();
        for choice in choices {
            index.insert(choice);
        }
        index
    }

    /// Insert or replace a choice, returning the one it replaced
    pub fn insert(&mut self, choice: Choice) -> Option<Choice> {
        let previous = self.remove(choice.id);

        let key = choice.trie_key();
        match self.trie.get_mut(&key) {
            Some(ids) => ids.push(choice.id),
            None => {
                self.trie.insert(key, vec![choice.id]);
            }
        }
        self.by_id.insert(choice.id, choice);

        previous
    }

    /// Remove a choice by id
    pub fn remove(&mut self, id: RecordId) -> Option<Choice> {
        let choice = self.by_id.remove(&id)?;
        let key = choice.trie_key();

        let now_empty = match self.trie.get_mut(&key) {
            Some(ids) => {
                ids.retain(|existing| *existing != id);
                ids.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.trie.remove(&key);
        }

        Some(choice)
    }

    /// Resolve an id
    #[inline]
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&Choice> {
        self.by_id.get(&id)
    }

    /// Label for an id
    #[inline]
    #[must_use]
    pub fn label(&self, id: RecordId) -> Option<&str> {
        self.by_id.get(&id).map(|choice| choice.label.as_str())
    }

    /// Check membership
    #[inline]
    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Choices whose label starts with `prefix` (case-insensitive)
    ///
    /// Sorted by label, then id. An empty prefix returns every choice.
    #[must_use]
    pub fn matching(&self, prefix: &str) -> Vec<&Choice> {
        let prefix = prefix.trim().to_lowercase();

        let mut found: Vec<&Choice> = if prefix.is_empty() {
            self.by_id.values().collect()
        } else {
            self.trie
                .get_raw_descendant(&prefix)
                .map(|subtrie| {
                    subtrie
                        .iter()
                        .filter(|(label, _)| label.starts_with(&prefix))
                        .flat_map(|(_, ids)| ids.iter())
                        .filter_map(|id| self.by_id.get(id))
                        .collect()
                })
                .unwrap_or_default()
        };

        found.sort_by(|a, b| a.label.cmp(&b.label).then(a.id.cmp(&b.id)));
        found
    }

    /// All choices sorted by label
    #[must_use]
    pub fn choices(&self) -> Vec<&Choice> {
        self.matching("")
    }

    /// Number of choices
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl FromIterator<Choice> for SelectionIndex {
    fn from_iter<I: IntoIterator<Item = Choice>>(iter: I) -> Self {
        Self::from_choices(iter)
    }
}

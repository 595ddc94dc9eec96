//! Per-level collection rules

use crate::item::Visibility;
use serde::{Deserialize, Serialize};

/// When a collection keeps a trailing blank row to fill in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderPolicy {
    /// Never provision a placeholder
    #[default]
    Never,

    /// Always append one after the loaded items
    Always,

    /// Only when nothing was loaded
    WhenEmpty,

    /// Only when the owning record has not been saved yet
    WhenParentNew,
}

impl PlaceholderPolicy {
    /// Check whether a placeholder is due after loading `loaded` items
    #[inline]
    #[must_use]
    pub fn provisions(self, loaded: usize, parent: ParentState) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::WhenEmpty => loaded == 0,
            Self::WhenParentNew => parent.is_new(),
        }
    }

    /// Check whether an emptied collection gets a fresh placeholder
    #[inline]
    #[must_use]
    pub fn reprovisions(self, parent: ParentState) -> bool {
        self.provisions(0, parent)
    }
}

/// Whether the record owning a collection has been persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentState {
    /// Not saved yet
    #[default]
    New,

    /// Loaded from the server
    Persisted,
}

impl ParentState {
    /// Derive from an optional identity
    #[inline]
    #[must_use]
    pub fn from_identity<T>(identity: Option<T>) -> Self {
        if identity.is_some() {
            Self::Persisted
        } else {
            Self::New
        }
    }

    /// Check if the parent is unsaved
    #[inline]
    #[must_use]
    pub fn is_new(self) -> bool {
        matches!(self, Self::New)
    }
}

/// Rules applied to one level of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelPolicy {
    /// Maximum number of items; `None` is unbounded
    pub cardinality_limit: Option<usize>,

    /// Trailing placeholder rule
    pub placeholder: PlaceholderPolicy,

    /// Initial state of items loaded from a record
    pub loaded_visibility: Visibility,

    /// Initial state of placeholders and newly added items
    pub new_item_visibility: Visibility,
}

impl LevelPolicy {
    /// Unbounded, no placeholder, everything collapsed
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy that always keeps a trailing blank row
    #[inline]
    #[must_use]
    pub fn always_placeholder() -> Self {
        Self::new()
            .with_placeholder(PlaceholderPolicy::Always)
            .with_new_item_visibility(Visibility::Expanded)
    }

    /// With cardinality limit
    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.cardinality_limit = limit;
        self
    }

    /// With placeholder rule
    #[inline]
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: PlaceholderPolicy) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// With initial state for loaded items
    #[inline]
    #[must_use]
    pub fn with_loaded_visibility(mut self, visibility: Visibility) -> Self {
        self.loaded_visibility = visibility;
        self
    }

    /// With initial state for new items
    #[inline]
    #[must_use]
    pub fn with_new_item_visibility(mut self, visibility: Visibility) -> Self {
        self.new_item_visibility = visibility;
        self
    }
}

impl Default for LevelPolicy {
    fn default() -> Self {
        Self {
            cardinality_limit: None,
            placeholder: PlaceholderPolicy::Never,
            loaded_visibility: Visibility::Collapsed,
            new_item_visibility: Visibility::Collapsed,
        }
    }
}

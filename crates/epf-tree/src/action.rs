//! Editing actions and button identifiers
//!
//! Every structural edit is an [`Action`]: which level, which ancestor
//! rows (by 1-based slot), which row, and what to do. [`ActionParser`]
//! recovers actions from the textual button identifiers rendered into the
//! page, e.g. `scenarioButton_2_add` or `effectTagButton_1_2_3_showeffecttag`.

use crate::config::EditorConfig;
use crate::error::ConfigError;
use crate::level::Level;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

/// What an action does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Append a blank row
    Add,
    /// Swap with the previous row
    MoveUp,
    /// Swap with the next row
    MoveDown,
    /// Delete the row and its subtree
    Remove,
    /// Expand the row
    Show,
    /// Collapse the row
    Hide,
}

impl ActionKind {
    /// Identifier keyword; show/hide carry the lowercase level name
    #[must_use]
    pub fn keyword(self, level_name: &str) -> String {
        match self {
            Self::Add => "add".to_string(),
            Self::MoveUp => "moveup".to_string(),
            Self::MoveDown => "movedown".to_string(),
            Self::Remove => "remove".to_string(),
            Self::Show => format!("show{}", level_name.to_lowercase()),
            Self::Hide => format!("hide{}", level_name.to_lowercase()),
        }
    }
}

/// Address of one row in the tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemPath {
    /// Level of the row
    pub level: Level,
    /// 1-based slots of the ancestor rows, outermost first
    pub ancestors: Vec<u32>,
    /// 1-based slot of the row
    pub slot: u32,
}

impl ItemPath {
    /// Create item path
    #[must_use]
    pub fn new(level: Level, ancestors: impl Into<Vec<u32>>, slot: u32) -> Self {
        Self {
            level,
            ancestors: ancestors.into(),
            slot,
        }
    }

    /// Ancestors followed by the row's own slot
    #[must_use]
    pub fn slots(&self) -> Vec<u32> {
        let mut slots = self.ancestors.clone();
        slots.push(self.slot);
        slots
    }
}

/// Structural edit request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Action {
    /// Level of the collection being edited
    pub level: Level,
    /// 1-based slots of the ancestor rows, outermost first
    pub ancestors: Vec<u32>,
    /// 1-based slot of the row acted on; `None` for [`ActionKind::Add`]
    pub target: Option<u32>,
    /// What to do
    pub kind: ActionKind,
}

impl Action {
    /// Append a blank row to the collection under `ancestors`
    #[must_use]
    pub fn add(level: Level, ancestors: impl Into<Vec<u32>>) -> Self {
        Self {
            level,
            ancestors: ancestors.into(),
            target: None,
            kind: ActionKind::Add,
        }
    }

    /// Act on one row
    #[must_use]
    pub fn row(level: Level, ancestors: impl Into<Vec<u32>>, target: u32, kind: ActionKind) -> Self {
        Self {
            level,
            ancestors: ancestors.into(),
            target: Some(target),
            kind,
        }
    }

    /// Row acted on, if any
    #[must_use]
    pub fn path(&self) -> Option<ItemPath> {
        self.target
            .map(|slot| ItemPath::new(self.level, self.ancestors.clone(), slot))
    }
}

/// Result of applying an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The tree changed
    Changed,
    /// Nothing happened
    Ignored(IgnoreReason),
}

impl Dispatch {
    /// Check if the tree changed
    #[inline]
    #[must_use]
    pub fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Why an action was a no-op
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// An ancestor slot names no existing row
    UnknownAncestor,
    /// The target slot names no existing row
    NotFound,
    /// Move past the first or last row
    AtBoundary,
    /// Add at the cardinality limit
    LimitReached,
    /// Action does not fit the level, or the row is already in that state
    NotApplicable,
    /// Identifier could not be parsed
    Malformed,
}

impl Display for IgnoreReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnknownAncestor => "unknown ancestor",
            Self::NotFound => "row not found",
            Self::AtBoundary => "already at boundary",
            Self::LimitReached => "cardinality limit reached",
            Self::NotApplicable => "not applicable",
            Self::Malformed => "malformed identifier",
        };
        f.write_str(text)
    }
}

/// Parses button identifiers back into actions
#[derive(Debug, Clone)]
pub struct ActionParser {
    pattern: Regex,
    levels: HashMap<String, Level>,
    keywords: HashMap<Level, String>,
}

impl ActionParser {
    /// Build parser for the prefixes in `config`
    ///
    /// # Errors
    /// Returns error if the prefixes cannot form a pattern
    pub fn new(config: &EditorConfig) -> Result<Self, ConfigError> {
        let mut levels = HashMap::new();
        let mut keywords = HashMap::new();
        for level in Level::ALL {
            let level_config = config.level(level);
            levels.insert(level_config.button_prefix.clone(), level);
            keywords.insert(level, level_config.keyword_name());
        }

        let mut prefixes: Vec<&String> = levels.keys().collect();
        prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let alternation = prefixes
            .iter()
            .map(|prefix| regex::escape(prefix))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&format!(
            r"^(?P<prefix>{alternation})(?P<slots>(?:_\d+)*)_(?P<keyword>[A-Za-z]+)$"
        ))
        .map_err(|err| ConfigError::Invalid(format!("button prefixes: {err}")))?;

        Ok(Self {
            pattern,
            levels,
            keywords,
        })
    }

    /// Parse an identifier; `None` when it does not follow the grammar
    #[must_use]
    pub fn parse(&self, id: &str) -> Option<Action> {
        let captures = self.pattern.captures(id.trim())?;
        let level = *self.levels.get(&captures["prefix"])?;

        let slots = captures["slots"]
            .split('_')
            .filter(|part| !part.is_empty())
            .map(str::parse::<u32>)
            .collect::<Result<Vec<_>, _>>()
            .ok()?;

        let kind = self.kind_for(level, &captures["keyword"])?;
        let depth = level.depth();

        if kind == ActionKind::Add {
            if slots.len() != depth {
                return None;
            }
            return Some(Action::add(level, slots));
        }

        if slots.len() != depth + 1 {
            return None;
        }
        let (ancestors, target) = slots.split_at(depth);
        Some(Action::row(level, ancestors, target[0], kind))
    }

    /// Parse an identifier for the handler of one specific collection
    ///
    /// Rejects identifiers for another level or for a collection under
    /// different ancestors.
    #[must_use]
    pub fn parse_scoped(&self, id: &str, level: Level, ancestors: &[u32]) -> Option<Action> {
        self.parse(id)
            .filter(|action| action.level == level && action.ancestors == ancestors)
    }

    fn kind_for(&self, level: Level, keyword: &str) -> Option<ActionKind> {
        let keyword = keyword.to_lowercase();
        let name = self.keywords.get(&level)?;

        match keyword.as_str() {
            "add" => Some(ActionKind::Add),
            "moveup" => Some(ActionKind::MoveUp),
            "movedown" => Some(ActionKind::MoveDown),
            "remove" => Some(ActionKind::Remove),
            other => match other.strip_prefix("show") {
                Some(rest) if rest == name => Some(ActionKind::Show),
                _ => match other.strip_prefix("hide") {
                    Some(rest) if rest == name => Some(ActionKind::Hide),
                    _ => None,
                },
            },
        }
    }
}

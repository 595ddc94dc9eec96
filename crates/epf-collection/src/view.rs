//! Per-item view models
//!
//! A renderer draws a collection purely from these values; nothing here
//! refers back into the collection.

use crate::item::{ItemKey, RecordId, Visibility};
use serde::Serialize;

/// Alternating row shade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stripe {
    /// Even rows (first, third, ...)
    Primary,
    /// Odd rows
    Secondary,
}

impl Stripe {
    /// Shade for a zero-based position
    #[inline]
    #[must_use]
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Primary
        } else {
            Self::Secondary
        }
    }
}

/// Structural view of one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    /// Stable slot key
    pub key: ItemKey,
    /// 1-based slot number used in identifiers
    pub slot: u32,
    /// 1-based current position
    pub display_order: u32,
    /// Persisted identity
    pub identity: Option<RecordId>,
    /// Caption or detail
    pub visibility: Visibility,
    /// Row shade
    pub stripe: Stripe,
    /// Whether the "move up" affordance is offered
    pub can_move_up: bool,
    /// Whether the "move down" affordance is offered
    pub can_move_down: bool,
    /// Unsaved blank row
    pub is_placeholder: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stripe_alternates() {
        assert_eq!(Stripe::for_index(0), Stripe::Primary);
        assert_eq!(Stripe::for_index(1), Stripe::Secondary);
        assert_eq!(Stripe::for_index(2), Stripe::Primary);
    }
}

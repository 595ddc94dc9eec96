//! Items held by an ordered collection
//!
//! Provides [`OrderedItem`] together with the identity and slot types that
//! keep "which record is this" apart from "where is it shown".

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::num::NonZeroU64;
use std::str::FromStr;

/// Domain data carried by one level of the tree
pub trait Payload: Clone + fmt::Debug + Default + Send + Sync + 'static {
    /// True when nothing has been filled in yet
    fn is_blank(&self) -> bool;
}

/// Persisted primary key of a record
///
/// Always strictly positive; zero and negative keys are not valid
/// server-side identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(NonZeroU64);

impl RecordId {
    /// Create from a raw key, rejecting zero
    #[inline]
    #[must_use]
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Create from a signed key as found in loosely typed input
    #[inline]
    #[must_use]
    pub fn from_signed(raw: i64) -> Option<Self> {
        u64::try_from(raw).ok().and_then(Self::new)
    }

    /// Raw key value
    #[inline]
    #[must_use]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<NonZeroU64>().map(Self)
    }
}

/// Stable zero-based slot of an item within its collection
///
/// Assigned once when the item enters the collection and never reused
/// there. Identifiers and field names embed `slot()` (the key plus one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey(pub u32);

impl ItemKey {
    /// 1-based slot number as it appears in identifiers
    #[inline]
    #[must_use]
    pub fn slot(self) -> u32 {
        self.0 + 1
    }

    /// Key for a 1-based slot number
    #[inline]
    #[must_use]
    pub fn from_slot(slot: u32) -> Option<Self> {
        slot.checked_sub(1).map(Self)
    }
}

impl Display for ItemKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caption-versus-detail presentation state of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only the caption is shown
    #[default]
    Collapsed,

    /// The detail form is shown
    Expanded,
}

impl Visibility {
    /// Check if the detail view is shown
    #[inline]
    #[must_use]
    pub fn is_expanded(self) -> bool {
        matches!(self, Self::Expanded)
    }
}

/// A single record at one tree level
#[derive(Debug, Clone)]
pub struct OrderedItem<P> {
    identity: Option<RecordId>,
    key: ItemKey,
    pub(crate) display_order: u32,
    pub(crate) visibility: Visibility,
    payload: P,
}

impl<P: Payload> OrderedItem<P> {
    pub(crate) fn new(
        identity: Option<RecordId>,
        key: ItemKey,
        visibility: Visibility,
        payload: P,
    ) -> Self {
        Self {
            identity,
            key,
            display_order: 0,
            visibility,
            payload,
        }
    }

    /// Persisted identity, if saved
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Option<RecordId> {
        self.identity
    }

    /// Record the persisted identity (e.g. after a typeahead selection)
    #[inline]
    pub fn set_identity(&mut self, identity: Option<RecordId>) {
        self.identity = identity;
    }

    /// Stable slot key
    #[inline]
    #[must_use]
    pub fn key(&self) -> ItemKey {
        self.key
    }

    /// Current 1-based display order
    #[inline]
    #[must_use]
    pub fn display_order(&self) -> u32 {
        self.display_order
    }

    /// Current presentation state
    #[inline]
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Level data
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Mutable level data
    #[inline]
    pub fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }

    /// Unsaved and still empty
    #[inline]
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.identity.is_none() && self.payload.is_blank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_rejects_zero() {
        assert!(RecordId::new(0).is_none());
        assert_eq!(RecordId::new(7).map(RecordId::get), Some(7));
    }

    #[test]
    fn record_id_from_signed() {
        assert!(RecordId::from_signed(-3).is_none());
        assert!(RecordId::from_signed(0).is_none());
        assert_eq!(RecordId::from_signed(12).map(RecordId::get), Some(12));
    }

    #[test]
    fn record_id_parse() {
        assert_eq!("42".parse::<RecordId>().map(RecordId::get), Ok(42));
        assert!("0".parse::<RecordId>().is_err());
        assert!("abc".parse::<RecordId>().is_err());
    }

    #[test]
    fn item_key_slot_round_trip() {
        assert_eq!(ItemKey(0).slot(), 1);
        assert_eq!(ItemKey::from_slot(3), Some(ItemKey(2)));
        assert_eq!(ItemKey::from_slot(0), None);
    }

    #[test]
    fn visibility_default_is_collapsed() {
        assert_eq!(Visibility::default(), Visibility::Collapsed);
        assert!(Visibility::Expanded.is_expanded());
    }
}

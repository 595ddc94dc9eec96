//! Ordered collection of formset rows
//!
//! Provides [`OrderedCollection`]: the five structural edits (append,
//! move up, move down, remove, renumber) over one level of the tree.

use crate::error::InvariantViolation;
use crate::item::{ItemKey, OrderedItem, Payload, RecordId, Visibility};
use crate::policy::{LevelPolicy, ParentState};
use crate::view::{ItemView, Stripe};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Mutable ordered sequence of items at one tree level
///
/// # Characteristics
/// - Display order is renumbered to `1..=len` after every mutation
/// - Reordering only ever swaps adjacent items
/// - Invalid indices are no-ops, never panics
#[derive(Clone)]
pub struct OrderedCollection<P> {
    items: Vec<OrderedItem<P>>,
    policy: LevelPolicy,
    parent: ParentState,
    next_key: u32,
    blank: BlankFn<P>,
}

/// Builds the payload of a fresh placeholder or "add new" row
pub type BlankFn<P> = Arc<dyn Fn() -> P + Send + Sync>;

impl<P: fmt::Debug> fmt::Debug for OrderedCollection<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedCollection")
            .field("items", &self.items)
            .field("policy", &self.policy)
            .field("parent", &self.parent)
            .field("next_key", &self.next_key)
            .finish_non_exhaustive()
    }
}

impl<P: Payload> Default for OrderedCollection<P> {
    fn default() -> Self {
        Self::new(LevelPolicy::default(), ParentState::default())
    }
}

impl<P: Payload> OrderedCollection<P> {
    /// Create empty collection without provisioning a placeholder
    #[inline]
    #[must_use]
    pub fn new(policy: LevelPolicy, parent: ParentState) -> Self {
        Self {
            items: Vec::new(),
            policy,
            parent,
            next_key: 0,
            blank: Arc::new(P::default),
        }
    }

    /// Build from persisted records, in their stored order
    ///
    /// Applies the cardinality limit, then provisions a trailing
    /// placeholder if the policy asks for one.
    #[must_use]
    pub fn load<I>(records: I, policy: LevelPolicy, parent: ParentState) -> Self
    where
        I: IntoIterator<Item = (Option<RecordId>, P)>,
    {
        Self::load_with(records, policy, parent, Arc::new(P::default))
    }

    /// Same as [`load`](Self::load), with a custom blank-row builder used
    /// for placeholders and blank appends
    #[must_use]
    pub fn load_with<I>(
        records: I,
        policy: LevelPolicy,
        parent: ParentState,
        blank: BlankFn<P>,
    ) -> Self
    where
        I: IntoIterator<Item = (Option<RecordId>, P)>,
    {
        let mut collection = Self::new(policy, parent);
        collection.blank = blank;

        for (identity, payload) in records {
            if !collection.can_add() {
                tracing::debug!(
                    limit = ?policy.cardinality_limit,
                    "dropping loaded record beyond cardinality limit"
                );
                break;
            }
            if collection
                .push(identity, policy.loaded_visibility, payload)
                .is_none()
            {
                break;
            }
        }

        let loaded = collection.items.len();
        if policy.placeholder.provisions(loaded, parent) && collection.can_add() {
            let payload = (collection.blank)();
            let _ = collection.push(None, policy.new_item_visibility, payload);
        }

        collection.renumber();
        collection.debug_check();
        collection
    }

    /// Issue the next slot key; `None` once the key space is used up
    fn push(
        &mut self,
        identity: Option<RecordId>,
        visibility: Visibility,
        payload: P,
    ) -> Option<ItemKey> {
        let Some(next) = self.next_key.checked_add(1) else {
            tracing::warn!(next_key = self.next_key, "slot keys exhausted, insert ignored");
            return None;
        };

        let key = ItemKey(self.next_key);
        self.next_key = next;
        self.items
            .push(OrderedItem::new(identity, key, visibility, payload));
        Some(key)
    }

    fn debug_check(&self) {
        debug_assert!(
            self.check_invariants().is_ok(),
            "ordered collection invariant broken: {:?}",
            self.check_invariants()
        );
    }

    /// Insert at the end
    ///
    /// Returns the new item's key, or `None` when the cardinality limit has
    /// been reached or every slot key has been issued (nothing changes in
    /// either case).
    pub fn append(&mut self, payload: P) -> Option<ItemKey> {
        if !self.can_add() {
            tracing::debug!(len = self.items.len(), "append ignored at cardinality limit");
            return None;
        }

        let key = self.push(None, self.policy.new_item_visibility, payload)?;
        self.renumber();
        self.debug_check();
        Some(key)
    }

    /// Insert a blank row at the end
    pub fn append_blank(&mut self) -> Option<ItemKey> {
        let payload = (self.blank)();
        self.append(payload)
    }

    /// Swap the item at `index` with its predecessor
    ///
    /// Returns `false` (no-op) for the first item or an out-of-range index.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.items.len() {
            tracing::debug!(index, len = self.items.len(), "move up ignored at boundary");
            return false;
        }

        self.items.swap(index, index - 1);
        self.renumber();
        self.debug_check();
        true
    }

    /// Swap the item at `index` with its successor
    ///
    /// Returns `false` (no-op) for the last item or an out-of-range index.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.items.len() {
            tracing::debug!(index, len = self.items.len(), "move down ignored at boundary");
            return false;
        }

        self.items.swap(index, index + 1);
        self.renumber();
        self.debug_check();
        true
    }

    /// Delete the item at `index` and renumber the rest
    ///
    /// If the collection ends up empty and the placeholder policy applies,
    /// a fresh placeholder takes its place.
    pub fn remove(&mut self, index: usize) -> Option<OrderedItem<P>> {
        if index >= self.items.len() {
            tracing::warn!(index, len = self.items.len(), "remove ignored, index out of range");
            return None;
        }

        let removed = self.items.remove(index);

        if self.items.is_empty() && self.policy.placeholder.reprovisions(self.parent) {
            let payload = (self.blank)();
            let _ = self.push(None, self.policy.new_item_visibility, payload);
        }

        self.renumber();
        self.debug_check();
        Some(removed)
    }

    /// Resolve a 1-based slot number taken from an identifier
    ///
    /// The number is one greater than the slot key it names. Returns the
    /// current array index of that item, or `None` for `n <= 0` or an
    /// unknown slot.
    ///
    /// Slot keys are never reused, so `n` is not bounded by [`len`](Self::len):
    /// after a remove and an append, the new row answers to a number past
    /// the current length while the removed row's number resolves to
    /// nothing.
    #[must_use]
    pub fn find_by_display_index(&self, n: i64) -> Option<usize> {
        if n <= 0 {
            return None;
        }

        let key = u32::try_from(n - 1).ok()?;
        self.items.iter().position(|item| item.key().0 == key)
    }

    /// Same as [`find_by_display_index`](Self::find_by_display_index) for a
    /// raw textual token; non-integers resolve to `None`
    #[must_use]
    pub fn find_by_display_token(&self, token: &str) -> Option<usize> {
        let n = token.trim().parse::<i64>().ok()?;
        self.find_by_display_index(n)
    }

    /// Reassign `display_order = index + 1` to every item
    pub fn renumber(&mut self) {
        for (position, item) in (1u32..).zip(self.items.iter_mut()) {
            item.display_order = position;
        }
    }

    /// Expand the item at `index`; returns whether anything changed
    pub fn show(&mut self, index: usize) -> bool {
        self.set_visibility(index, Visibility::Expanded)
    }

    /// Collapse the item at `index`; returns whether anything changed
    pub fn hide(&mut self, index: usize) -> bool {
        self.set_visibility(index, Visibility::Collapsed)
    }

    fn set_visibility(&mut self, index: usize, visibility: Visibility) -> bool {
        match self.items.get_mut(index) {
            Some(item) if item.visibility != visibility => {
                item.visibility = visibility;
                true
            }
            Some(_) => false,
            None => {
                tracing::warn!(index, "visibility toggle ignored, index out of range");
                false
            }
        }
    }

    /// Change the cardinality limit, truncating to the first `limit` items
    pub fn set_cardinality_limit(&mut self, limit: Option<usize>) {
        self.policy.cardinality_limit = limit;

        if let Some(limit) = limit {
            if self.items.len() > limit {
                tracing::debug!(from = self.items.len(), to = limit, "truncating to cardinality limit");
                self.items.truncate(limit);
            }
        }

        self.renumber();
        self.debug_check();
    }

    /// Replace the builder used for placeholders and blank appends
    pub fn set_blank(&mut self, blank: BlankFn<P>) {
        self.blank = blank;
    }

    /// Record that the owning record now has a persisted identity
    #[inline]
    pub fn set_parent_state(&mut self, parent: ParentState) {
        self.parent = parent;
    }

    /// Whether "add new" may be offered
    #[inline]
    #[must_use]
    pub fn can_add(&self) -> bool {
        self.policy
            .cardinality_limit
            .map_or(true, |limit| self.items.len() < limit)
    }

    /// Active policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &LevelPolicy {
        &self.policy
    }

    /// Owning record state
    #[inline]
    #[must_use]
    pub fn parent_state(&self) -> ParentState {
        self.parent
    }

    /// Number of items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in display order
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[OrderedItem<P>] {
        &self.items
    }

    /// Iterate items in display order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, OrderedItem<P>> {
        self.items.iter()
    }

    /// Iterate items mutably in display order
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, OrderedItem<P>> {
        self.items.iter_mut()
    }

    /// Item at array index
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&OrderedItem<P>> {
        self.items.get(index)
    }

    /// Mutable item at array index
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut OrderedItem<P>> {
        self.items.get_mut(index)
    }

    /// Array index of the item with `key`
    #[inline]
    #[must_use]
    pub fn position_of(&self, key: ItemKey) -> Option<usize> {
        self.items.iter().position(|item| item.key() == key)
    }

    /// Item with `key`
    #[inline]
    #[must_use]
    pub fn get_by_key(&self, key: ItemKey) -> Option<&OrderedItem<P>> {
        self.items.iter().find(|item| item.key() == key)
    }

    /// Mutable item with `key`
    #[inline]
    pub fn get_by_key_mut(&mut self, key: ItemKey) -> Option<&mut OrderedItem<P>> {
        self.items.iter_mut().find(|item| item.key() == key)
    }

    /// Current display orders, first to last
    #[must_use]
    pub fn display_orders(&self) -> Vec<u32> {
        self.items.iter().map(OrderedItem::display_order).collect()
    }

    /// Current slot keys, first to last
    #[must_use]
    pub fn keys(&self) -> Vec<ItemKey> {
        self.items.iter().map(OrderedItem::key).collect()
    }

    /// Structural view models, first to last
    #[must_use]
    pub fn views(&self) -> Vec<ItemView> {
        let last = self.items.len().saturating_sub(1);

        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| ItemView {
                key: item.key(),
                slot: item.key().slot(),
                display_order: item.display_order(),
                identity: item.identity(),
                visibility: item.visibility(),
                stripe: Stripe::for_index(index),
                can_move_up: index > 0,
                can_move_down: index < last,
                is_placeholder: item.is_placeholder(),
            })
            .collect()
    }

    /// Verify ordering, key and limit invariants
    ///
    /// # Errors
    /// Returns the first violation found
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut seen = HashSet::with_capacity(self.items.len());

        for (index, item) in self.items.iter().enumerate() {
            let expected = u32::try_from(index + 1).unwrap_or(u32::MAX);
            if item.display_order != expected {
                return Err(InvariantViolation::OrderMismatch {
                    index,
                    expected,
                    found: item.display_order,
                });
            }

            if item.key().0 >= self.next_key {
                return Err(InvariantViolation::KeyOutOfRange {
                    key: item.key(),
                    next: self.next_key,
                });
            }

            if !seen.insert(item.key()) {
                return Err(InvariantViolation::DuplicateKey(item.key()));
            }
        }

        if let Some(limit) = self.policy.cardinality_limit {
            if self.items.len() > limit {
                return Err(InvariantViolation::LimitExceeded {
                    len: self.items.len(),
                    limit,
                });
            }
        }

        Ok(())
    }
}

impl<'a, P> IntoIterator for &'a OrderedCollection<P> {
    type Item = &'a OrderedItem<P>;
    type IntoIter = std::slice::Iter<'a, OrderedItem<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PlaceholderPolicy;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Row {
        name: String,
    }

    impl Row {
        fn named(name: &str) -> Self {
            Self {
                name: name.to_string(),
            }
        }
    }

    impl Payload for Row {
        fn is_blank(&self) -> bool {
            self.name.is_empty()
        }
    }

    fn names(collection: &OrderedCollection<Row>) -> Vec<String> {
        collection
            .iter()
            .map(|item| item.payload().name.clone())
            .collect()
    }

    fn loaded(names: &[&str]) -> OrderedCollection<Row> {
        OrderedCollection::load(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| (RecordId::new(i as u64 + 1), Row::named(n))),
            LevelPolicy::new(),
            ParentState::Persisted,
        )
    }

    #[test]
    fn load_assigns_orders_and_keys() {
        let rows = loaded(&["a", "b", "c"]);

        assert_eq!(rows.display_orders(), vec![1, 2, 3]);
        assert_eq!(rows.keys(), vec![ItemKey(0), ItemKey(1), ItemKey(2)]);
        assert!(rows.check_invariants().is_ok());
    }

    #[test]
    fn load_provisions_trailing_placeholder() {
        let rows = OrderedCollection::load(
            vec![(RecordId::new(4), Row::named("a"))],
            LevelPolicy::always_placeholder(),
            ParentState::Persisted,
        );

        assert_eq!(rows.len(), 2);
        let last = rows.get(1).unwrap();
        assert!(last.is_placeholder());
        assert_eq!(last.display_order(), 2);
        assert_eq!(last.visibility(), Visibility::Expanded);
    }

    #[test]
    fn load_respects_when_empty() {
        let policy = LevelPolicy::new().with_placeholder(PlaceholderPolicy::WhenEmpty);

        let empty = OrderedCollection::<Row>::load(Vec::new(), policy, ParentState::Persisted);
        assert_eq!(empty.len(), 1);

        let filled = OrderedCollection::load(
            vec![(None, Row::named("x"))],
            policy,
            ParentState::Persisted,
        );
        assert_eq!(filled.len(), 1);
        assert!(!filled.get(0).unwrap().is_placeholder());
    }

    #[test]
    fn load_truncates_to_limit() {
        let rows = OrderedCollection::load(
            vec![(None, Row::named("a")), (None, Row::named("b"))],
            LevelPolicy::always_placeholder().with_limit(Some(1)),
            ParentState::Persisted,
        );

        assert_eq!(names(&rows), vec!["a"]);
        assert!(!rows.can_add());
    }

    #[test]
    fn custom_blank_builder_is_used() {
        let mut rows = OrderedCollection::load_with(
            Vec::new(),
            LevelPolicy::always_placeholder(),
            ParentState::New,
            Arc::new(|| Row::named("")),
        );
        rows.append_blank();
        let filled = OrderedCollection::load_with(
            Vec::new(),
            LevelPolicy::new(),
            ParentState::New,
            Arc::new(|| Row::named("template")),
        );

        assert_eq!(rows.len(), 2);
        assert!(filled.is_empty());
    }

    #[test]
    fn append_blank_uses_builder() {
        let mut rows = OrderedCollection::load_with(
            Vec::new(),
            LevelPolicy::new(),
            ParentState::Persisted,
            Arc::new(|| Row::named("template")),
        );
        rows.append_blank();

        assert_eq!(names(&rows), vec!["template"]);
    }

    #[test]
    fn append_sets_next_order() {
        let mut rows = loaded(&["a"]);
        let key = rows.append(Row::named("b")).unwrap();

        assert_eq!(key, ItemKey(1));
        assert_eq!(rows.display_orders(), vec![1, 2]);
        assert!(rows.get(1).unwrap().identity().is_none());
    }

    #[test]
    fn append_at_limit_is_noop() {
        let mut rows = OrderedCollection::load(
            vec![(None, Row::named("a"))],
            LevelPolicy::new().with_limit(Some(1)),
            ParentState::Persisted,
        );

        assert!(rows.append_blank().is_none());
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn move_up_swaps_with_previous() {
        let mut rows = loaded(&["a", "b", "c"]);

        assert!(rows.move_up(2));
        assert_eq!(names(&rows), vec!["a", "c", "b"]);
        assert_eq!(rows.display_orders(), vec![1, 2, 3]);
    }

    #[test]
    fn move_up_first_is_noop() {
        let mut rows = loaded(&["a", "b"]);

        assert!(!rows.move_up(0));
        assert_eq!(names(&rows), vec!["a", "b"]);
    }

    #[test]
    fn move_down_last_is_noop() {
        let mut rows = loaded(&["a", "b"]);

        assert!(!rows.move_down(1));
        assert!(!rows.move_down(7));
        assert_eq!(names(&rows), vec!["a", "b"]);
    }

    #[test]
    fn remove_renumbers() {
        let mut rows = loaded(&["a", "b", "c"]);

        let removed = rows.remove(0).unwrap();
        assert_eq!(removed.payload().name, "a");
        assert_eq!(names(&rows), vec!["b", "c"]);
        assert_eq!(rows.display_orders(), vec![1, 2]);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut rows = loaded(&["a"]);

        assert!(rows.remove(3).is_none());
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn remove_last_reprovisions_placeholder() {
        let mut rows = OrderedCollection::<Row>::load(
            Vec::new(),
            LevelPolicy::always_placeholder(),
            ParentState::New,
        );
        rows.get_mut(0).unwrap().payload_mut().name = "filled".into();

        rows.remove(0);

        assert_eq!(rows.len(), 1);
        assert!(rows.get(0).unwrap().is_placeholder());
        assert_eq!(rows.get(0).unwrap().key(), ItemKey(1));
    }

    #[test]
    fn find_by_display_index_follows_moves() {
        let mut rows = loaded(&["a", "b", "c"]);
        rows.move_up(2);

        // slot 3 ("c") now lives at array index 1
        assert_eq!(rows.find_by_display_index(3), Some(1));
        assert_eq!(rows.find_by_display_index(2), Some(2));
    }

    #[test]
    fn find_by_display_index_sentinels() {
        let rows = loaded(&["a", "b"]);

        assert_eq!(rows.find_by_display_index(0), None);
        assert_eq!(rows.find_by_display_index(-4), None);
        assert_eq!(rows.find_by_display_index(3), None);
        assert_eq!(rows.find_by_display_token("1.5"), None);
        assert_eq!(rows.find_by_display_token("x"), None);
        assert_eq!(rows.find_by_display_token(" 2 "), Some(1));
    }

    #[test]
    fn keys_are_not_reused() {
        let mut rows = loaded(&["a", "b"]);
        rows.remove(1);
        let key = rows.append(Row::named("c")).unwrap();

        assert_eq!(key, ItemKey(2));
        assert_eq!(rows.find_by_display_index(2), None);
    }

    #[test]
    fn slot_numbers_outlive_length() {
        let mut rows = loaded(&["a", "b"]);
        rows.remove(0);
        rows.append(Row::named("c"));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows.find_by_display_index(1), None);
        assert_eq!(rows.find_by_display_index(2), Some(0));
        assert_eq!(rows.find_by_display_index(3), Some(1));
        assert_eq!(rows.get(1).unwrap().payload().name, "c");
        assert_eq!(rows.find_by_display_index(4), None);
    }

    #[test]
    fn append_stops_when_keys_run_out() {
        let mut rows = loaded(&["a"]);
        rows.next_key = u32::MAX - 1;

        assert_eq!(rows.append(Row::named("b")), Some(ItemKey(u32::MAX - 1)));
        assert_eq!(rows.append(Row::named("c")), None);
        assert_eq!(names(&rows), vec!["a", "b"]);
        assert!(rows.check_invariants().is_ok());
    }

    #[test]
    fn renumber_is_idempotent() {
        let mut rows = loaded(&["a", "b", "c"]);
        rows.renumber();
        let first = rows.display_orders();
        rows.renumber();

        assert_eq!(first, rows.display_orders());
    }

    #[test]
    fn show_and_hide_transitions() {
        let mut rows = loaded(&["a"]);

        assert!(rows.show(0));
        assert!(!rows.show(0));
        assert_eq!(rows.get(0).unwrap().visibility(), Visibility::Expanded);
        assert!(rows.hide(0));
        assert!(!rows.hide(0));
        assert!(!rows.show(5));
    }

    #[test]
    fn set_limit_truncates() {
        let mut rows = loaded(&["a", "b", "c"]);
        rows.set_cardinality_limit(Some(1));

        assert_eq!(names(&rows), vec!["a"]);
        assert!(!rows.can_add());

        rows.set_cardinality_limit(None);
        assert!(rows.can_add());
    }

    #[test]
    fn views_reflect_position() {
        let rows = loaded(&["a", "b", "c"]);
        let views = rows.views();

        assert!(!views[0].can_move_up);
        assert!(views[0].can_move_down);
        assert!(views[2].can_move_up);
        assert!(!views[2].can_move_down);
        assert_eq!(views[1].stripe, Stripe::Secondary);
        assert_eq!(views[1].slot, 2);
    }
}

//! Change-tracking list for child collections of an aggregate.
//!
//! A `WatchedList` remembers the baseline it was loaded with and records what
//! happened to it since: which items are new, which baseline items were
//! removed, and which items were added and then removed again. A persistence
//! adapter reads those sets to compute an insert/delete diff without
//! re-reading the store.

use crate::entity::Entity;

/// Item equality used for membership checks.
pub type ItemEq<T> = fn(&T, &T) -> bool;

fn identity_eq<T: Entity>(a: &T, b: &T) -> bool {
    a.id() == b.id()
}

#[derive(Clone)]
pub struct WatchedList<T> {
    initial: Vec<T>,
    current: Vec<T>,
    new: Vec<T>,
    removed_from_initial: Vec<T>,
    removed_new: Vec<T>,
    eq: ItemEq<T>,
}

impl<T: Clone> WatchedList<T> {
    /// Build a list from a baseline, comparing items with `eq`.
    pub fn new(initial: Vec<T>, eq: ItemEq<T>) -> Self {
        Self {
            current: initial.clone(),
            initial,
            new: Vec::new(),
            removed_from_initial: Vec::new(),
            removed_new: Vec::new(),
            eq,
        }
    }

    pub fn empty(eq: ItemEq<T>) -> Self {
        Self::new(Vec::new(), eq)
    }

    fn position_in(&self, items: &[T], item: &T) -> Option<usize> {
        items.iter().position(|x| (self.eq)(x, item))
    }

    fn contained_in(&self, items: &[T], item: &T) -> bool {
        self.position_in(items, item).is_some()
    }

    /// Add `item` unless an equal item is already present.
    ///
    /// Items absent from the baseline are also recorded as new.
    pub fn add(&mut self, item: T) {
        if self.contained_in(&self.current, &item) {
            return;
        }
        if !self.contained_in(&self.initial, &item) {
            self.new.push(item.clone());
        }
        self.current.push(item);
    }

    /// Remove `item` if present; absent items are ignored.
    ///
    /// A removed baseline item is recorded once in `removed_from_initial`. An
    /// item that was added since the baseline leaves `new` and is recorded in
    /// `removed_new`, so it never shows up as a net change.
    pub fn remove(&mut self, item: &T) {
        let Some(pos) = self.position_in(&self.current, item) else {
            return;
        };
        let removed = self.current.remove(pos);

        if self.contained_in(&self.initial, item)
            && !self.contained_in(&self.removed_from_initial, item)
        {
            self.removed_from_initial.push(removed.clone());
        }

        if let Some(new_pos) = self.position_in(&self.new, item) {
            self.new.remove(new_pos);
            if !self.contained_in(&self.removed_new, item) {
                self.removed_new.push(removed);
            }
        }
    }

    /// Swap the present item equal to `item` for `item` itself.
    ///
    /// Used when a member was mutated and the list must hold the updated
    /// value. The copy kept in the new-items set follows along; the baseline
    /// is left untouched. Returns `false` when no equal item is present.
    pub fn replace(&mut self, item: T) -> bool {
        let Some(pos) = self.position_in(&self.current, &item) else {
            return false;
        };
        if let Some(new_pos) = self.position_in(&self.new, &item) {
            self.new[new_pos] = item.clone();
        }
        self.current[pos] = item;
        true
    }

    /// Current members.
    pub fn items(&self) -> &[T] {
        &self.current
    }

    pub fn new_items(&self) -> &[T] {
        &self.new
    }

    /// Every removed item: baseline removals first, then added-then-removed.
    pub fn removed_items(&self) -> Vec<T> {
        self.removed_from_initial
            .iter()
            .chain(self.removed_new.iter())
            .cloned()
            .collect()
    }

    pub fn removed_from_initial_items(&self) -> &[T] {
        &self.removed_from_initial
    }

    pub fn removed_new_items(&self) -> &[T] {
        &self.removed_new
    }

    /// Baseline the list was created with.
    pub fn initial_items(&self) -> &[T] {
        &self.initial
    }

    pub fn contains(&self, item: &T) -> bool {
        self.contained_in(&self.current, item)
    }

    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<&T> {
        self.current.iter().find(|x| predicate(x))
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Whether anything changed relative to the baseline.
    pub fn is_dirty(&self) -> bool {
        !self.new.is_empty() || !self.removed_from_initial.is_empty()
    }
}

impl<T: Entity + Clone> WatchedList<T> {
    /// List whose items are compared by entity identity.
    pub fn by_identity(initial: Vec<T>) -> Self {
        Self::new(initial, identity_eq::<T>)
    }

    pub fn find_by_id(&self, id: &T::Id) -> Option<&T> {
        self.find(|x| x.id() == id)
    }
}

impl<T: Entity + Clone> Default for WatchedList<T> {
    fn default() -> Self {
        Self::by_identity(Vec::new())
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for WatchedList<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WatchedList")
            .field("current", &self.current)
            .field("new", &self.new)
            .field("removed_from_initial", &self.removed_from_initial)
            .field("removed_new", &self.removed_new)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    struct Item {
        id: u32,
        label: &'static str,
    }

    impl Entity for Item {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    fn item(id: u32) -> Item {
        Item { id, label: "v1" }
    }

    fn ids(items: &[Item]) -> Vec<u32> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn baseline_is_current_and_nothing_is_tracked() {
        let list = WatchedList::by_identity(vec![item(1), item(2)]);
        assert_eq!(ids(list.items()), vec![1, 2]);
        assert!(list.new_items().is_empty());
        assert!(list.removed_items().is_empty());
        assert!(!list.is_dirty());
    }

    #[test]
    fn adding_twice_is_idempotent() {
        let mut list = WatchedList::by_identity(vec![]);
        list.add(item(1));
        list.add(item(1));
        assert_eq!(ids(list.items()), vec![1]);
        assert_eq!(ids(list.new_items()), vec![1]);
    }

    #[test]
    fn re_adding_a_baseline_item_is_not_new() {
        let mut list = WatchedList::by_identity(vec![item(1)]);
        list.remove(&item(1));
        list.add(item(1));
        assert_eq!(ids(list.items()), vec![1]);
        assert!(list.new_items().is_empty());
        assert_eq!(ids(list.removed_from_initial_items()), vec![1]);
    }

    #[test]
    fn add_then_remove_is_recorded_as_removed_new_only() {
        let mut list = WatchedList::by_identity(vec![]);
        list.add(item(7));
        list.remove(&item(7));

        assert!(list.items().is_empty());
        assert!(list.new_items().is_empty());
        assert_eq!(ids(list.removed_new_items()), vec![7]);
        assert!(list.removed_from_initial_items().is_empty());
    }

    #[test]
    fn removing_a_baseline_item_twice_records_it_once() {
        let mut list = WatchedList::by_identity(vec![item(1), item(2)]);
        list.remove(&item(1));
        list.remove(&item(1));

        assert_eq!(ids(list.items()), vec![2]);
        assert_eq!(ids(list.removed_from_initial_items()), vec![1]);
        assert!(list.is_dirty());
    }

    #[test]
    fn removing_an_absent_item_is_a_no_op() {
        let mut list = WatchedList::by_identity(vec![item(1)]);
        list.remove(&item(9));
        assert_eq!(ids(list.items()), vec![1]);
        assert!(list.removed_items().is_empty());
    }

    #[test]
    fn removed_items_lists_baseline_removals_first() {
        let mut list = WatchedList::by_identity(vec![item(1)]);
        list.add(item(2));
        list.remove(&item(2));
        list.remove(&item(1));
        assert_eq!(ids(&list.removed_items()), vec![1, 2]);
    }

    // add -> remove -> add keeps the earlier removed_new record.
    #[test]
    fn add_remove_add_cycle_keeps_stale_removed_new_record() {
        let mut list = WatchedList::by_identity(vec![]);
        list.add(item(3));
        list.remove(&item(3));
        list.add(item(3));

        assert_eq!(ids(list.items()), vec![3]);
        assert_eq!(ids(list.new_items()), vec![3]);
        assert_eq!(ids(list.removed_new_items()), vec![3]);
    }

    #[test]
    fn replace_updates_current_and_new_copies() {
        let mut list = WatchedList::by_identity(vec![item(1)]);
        list.add(item(2));

        assert!(list.replace(Item { id: 2, label: "v2" }));
        assert!(list.replace(Item { id: 1, label: "v2" }));
        assert!(!list.replace(Item { id: 9, label: "v2" }));

        assert!(list.items().iter().all(|i| i.label == "v2"));
        assert_eq!(list.new_items()[0].label, "v2");
        assert_eq!(list.initial_items()[0].label, "v1");
    }

    #[test]
    fn custom_predicate_drives_membership() {
        fn same_parity(a: &u32, b: &u32) -> bool {
            a % 2 == b % 2
        }
        let mut list = WatchedList::<u32>::new(vec![2], same_parity);
        list.add(4);
        list.add(5);
        assert_eq!(list.items(), &[2, 5]);
        assert_eq!(list.new_items(), &[5]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u32),
        Remove(u32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![(0u32..12).prop_map(Op::Add), (0u32..12).prop_map(Op::Remove)]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: current always equals baseline ∪ new − removed_from_initial.
        #[test]
        fn current_matches_baseline_plus_new_minus_removed(
            baseline in prop::collection::btree_set(0u32..12, 0..6),
            ops in prop::collection::vec(op(), 0..40),
        ) {
            let mut list = WatchedList::by_identity(baseline.iter().copied().map(item).collect());
            for op in ops {
                match op {
                    Op::Add(id) => list.add(item(id)),
                    Op::Remove(id) => list.remove(&item(id)),
                }
            }

            let mut expected: Vec<u32> = baseline
                .iter()
                .copied()
                .filter(|id| !ids(list.removed_from_initial_items()).contains(id)
                    || ids(list.items()).contains(id))
                .collect();
            expected.extend(ids(list.new_items()));
            expected.sort_unstable();
            expected.dedup();

            let mut current = ids(list.items());
            current.sort_unstable();
            prop_assert_eq!(current, expected);

            for id in ids(list.new_items()) {
                prop_assert!(!baseline.contains(&id));
            }
            let removed_initial = ids(list.removed_from_initial_items());
            let mut dedup = removed_initial.clone();
            dedup.sort_unstable();
            dedup.dedup();
            prop_assert_eq!(removed_initial.len(), dedup.len());
        }
    }
}

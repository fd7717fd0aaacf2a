//! Identifier set and minimal-diff label reconciliation.

use crate::model::related::LabelId;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Ordered set of unique identifiers.
///
/// Iteration and `to_vec` yield identifiers in ascending order, so diffs built
/// from it are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet {
    ids: BTreeSet<Uuid>,
}

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    /// Returns `false` when the id was already present.
    pub fn insert(&mut self, id: Uuid) -> bool {
        self.ids.insert(id)
    }

    /// Returns `false` when the id was not present.
    pub fn remove(&mut self, id: &Uuid) -> bool {
        self.ids.remove(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uuid> {
        self.ids.iter()
    }

    pub fn to_vec(&self) -> Vec<Uuid> {
        self.ids.iter().copied().collect()
    }
}

impl FromIterator<Uuid> for IdSet {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Label links to insert and delete to turn the current set into the desired one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDiff {
    /// In first-seen order of the desired list.
    pub to_add: Vec<LabelId>,
    /// In ascending id order.
    pub to_remove: Vec<LabelId>,
}

impl LabelDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Computes the minimal set of link changes from `current` to `desired`.
///
/// Ids present in both are left alone. Duplicates in `desired` are added at
/// most once. Runs in O(current + desired) set operations.
pub fn reconcile_labels(current: &[LabelId], desired: &[LabelId]) -> LabelDiff {
    let mut remaining: IdSet = current.iter().copied().collect();
    let mut seen = IdSet::new();
    let mut to_add = Vec::new();

    for label_id in desired {
        if !seen.insert(*label_id) {
            continue;
        }
        if remaining.remove(label_id) {
            continue;
        }
        to_add.push(*label_id);
    }

    LabelDiff {
        to_add,
        to_remove: remaining.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::{reconcile_labels, IdSet, LabelDiff};
    use uuid::Uuid;

    fn ids<const N: usize>() -> [Uuid; N] {
        std::array::from_fn(|_| Uuid::new_v4())
    }

    #[test]
    fn id_set_membership_and_removal() {
        let [a, b] = ids::<2>();
        let mut set: IdSet = [a, b, a].into_iter().collect();

        assert_eq!(set.len(), 2);
        assert!(set.contains(&a));
        assert!(set.remove(&a));
        assert!(!set.remove(&a));
        assert!(!set.contains(&a));
        assert_eq!(set.to_vec(), vec![b]);
        assert!(!set.insert(b));
    }

    #[test]
    fn to_vec_is_sorted() {
        let [a, b, c] = ids::<3>();
        let set: IdSet = [c, a, b].into_iter().collect();
        let mut expected = vec![a, b, c];
        expected.sort();
        assert_eq!(set.to_vec(), expected);
    }

    #[test]
    fn reconcile_adds_missing_and_removes_extra() {
        let [a, b, c, d] = ids::<4>();

        let diff = reconcile_labels(&[a, b, c], &[b, c, d]);
        assert_eq!(diff.to_add, vec![d]);
        assert_eq!(diff.to_remove, vec![a]);
    }

    #[test]
    fn reconcile_is_idempotent_once_applied() {
        let [a, b, c, d] = ids::<4>();
        let desired = [b, c, d];
        let diff = reconcile_labels(&[a, b, c], &desired);

        let mut applied: IdSet = [a, b, c].into_iter().collect();
        for id in &diff.to_remove {
            applied.remove(id);
        }
        for id in &diff.to_add {
            applied.insert(*id);
        }

        let second = reconcile_labels(&applied.to_vec(), &desired);
        assert!(second.is_empty());
    }

    #[test]
    fn reconcile_handles_empty_sides() {
        let [a, b] = ids::<2>();

        let clear_all = reconcile_labels(&[a, b], &[]);
        assert!(clear_all.to_add.is_empty());
        assert_eq!(clear_all.to_remove.len(), 2);

        let from_nothing = reconcile_labels(&[], &[b, a]);
        assert_eq!(from_nothing.to_add, vec![b, a]);
        assert!(from_nothing.to_remove.is_empty());

        assert_eq!(reconcile_labels(&[], &[]), LabelDiff::default());
    }

    #[test]
    fn reconcile_ignores_duplicate_desired_ids() {
        let [a, b] = ids::<2>();

        let diff = reconcile_labels(&[a], &[a, a, b, b]);
        assert_eq!(diff.to_add, vec![b]);
        assert!(diff.to_remove.is_empty());
    }
}

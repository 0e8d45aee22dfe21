use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::cache::grouped_store::{GroupedStore, ScopedEntity};
use crate::cache::store::{freeze, Entity};

/// Decides whether a newer version of an entity is worth an update notification.
pub trait Comparable {
    /// Without a rule for the type we can't tell, so we'd rather over-notify than hide a change.
    fn is_updated(&self, _newer: &Self) -> bool {
        true
    }
}

pub enum Change<T> {
    Removed(Arc<T>),
    Added(Arc<T>),
    Changed { old: Arc<T>, new: Arc<T> },
}

/// Outcome of reconciling a full replacement of one parent's collection against the cache.
pub struct GroupDiff<T: Entity> {
    pub removed: Vec<Arc<T>>,
    pub added: Vec<Arc<T>>,
    pub changed: Vec<(Arc<T>, Arc<T>)>,
    pub unchanged: Vec<T::Id>,
}

impl<T: Entity> GroupDiff<T> {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty() && self.changed.is_empty()
    }

    /// Removals first, then additions, then updates.
    pub fn into_changes(self) -> impl Iterator<Item = Change<T>> {
        self.removed
            .into_iter()
            .map(Change::Removed)
            .chain(self.added.into_iter().map(Change::Added))
            .chain(self.changed.into_iter().map(|(old, new)| Change::Changed { old, new }))
    }
}

/// Reconcile using the entity's own comparison rule.
pub fn reconcile<T: ScopedEntity + Comparable>(
    store: &GroupedStore<T>,
    parent_id: T::ParentId,
    incoming: Vec<T>,
) -> GroupDiff<T> {
    reconcile_with(store, parent_id, incoming, |old: &T, new: &T| old.is_updated(new))
}

/// Classifies every id exactly once as added, changed, removed or unchanged and applies the
/// result to the store. Removed entities are gone from the store before this returns, so no
/// notification built from the diff can race a reader still finding them.
pub fn reconcile_with<T: ScopedEntity>(
    store: &GroupedStore<T>,
    parent_id: T::ParentId,
    incoming: Vec<T>,
    is_updated: impl Fn(&T, &T) -> bool,
) -> GroupDiff<T> {
    // copy before touching anything, the canonical instances get merged into below
    let mut remaining: HashMap<T::Id, T> = store.group_snapshot(&parent_id);
    let mut added = Vec::new();
    let mut changed = Vec::new();
    let mut unchanged = Vec::new();
    let mut seen = HashSet::new();

    for entity in incoming {
        if entity.parent_id() != parent_id {
            error!(
                "Bulk update for {:?} contained {:?} belonging to {:?}, skipping it",
                parent_id,
                entity.id(),
                entity.parent_id()
            );
            continue;
        }
        if !seen.insert(entity.id()) {
            warn!("Bulk update for {:?} listed {:?} more than once, keeping the first", parent_id, entity.id());
            continue;
        }

        match remaining.remove(&entity.id()) {
            Some(old) => {
                if is_updated(&old, &entity) {
                    let stored = store.put(entity);
                    changed.push((Arc::new(old), freeze(&stored)));
                } else {
                    unchanged.push(old.id());
                }
            }
            None => {
                let stored = store.put(entity);
                added.push(freeze(&stored));
            }
        }
    }

    let mut removed = remaining.into_values().collect::<Vec<_>>();
    removed.sort_by_key(|entity| entity.id());
    for entity in &removed {
        store.remove(&parent_id, &entity.id());
    }

    debug!(
        "Reconciled {:?}: {} added, {} changed, {} removed, {} unchanged",
        parent_id,
        added.len(),
        changed.len(),
        removed.len(),
        unchanged.len()
    );

    GroupDiff {
        removed: removed.into_iter().map(Arc::new).collect(),
        added,
        changed,
        unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::grouped_store::tests::{badge, open_store, Badge};

    impl Comparable for Badge {
        fn is_updated(&self, newer: &Self) -> bool {
            self.label != newer.label
        }
    }

    fn ids(entities: &[Arc<Badge>]) -> Vec<u64> {
        entities.iter().map(|b| b.id).collect()
    }

    #[test]
    fn every_id_lands_in_exactly_one_class() {
        let store = open_store();
        // A = 1, B = 2, C = 3, D = 4
        store.put(badge(7, 1, "a"));
        store.put(badge(7, 2, "b"));
        store.put(badge(7, 3, "c"));

        let diff = reconcile(&store, 7, vec![badge(7, 1, "a prime"), badge(7, 3, "c"), badge(7, 4, "d")]);

        assert_eq!(ids(&diff.removed), vec![2]);
        assert_eq!(ids(&diff.added), vec![4]);
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed[0].0.label, "a");
        assert_eq!(diff.changed[0].1.label, "a prime");
        assert_eq!(diff.unchanged, vec![3]);

        assert!(store.get(&7, &2).is_none());
        assert_eq!(store.get(&7, &1).unwrap().read().label, "a prime");
        assert!(store.contains(&7, &4));
    }

    #[test]
    fn changes_come_out_removals_first() {
        let store = open_store();
        store.put(badge(1, 1, "stays"));
        store.put(badge(1, 2, "goes"));

        let diff = reconcile(&store, 1, vec![badge(1, 1, "renamed"), badge(1, 3, "new")]);
        let order = diff
            .into_changes()
            .map(|change| match change {
                Change::Removed(b) => ("removed", b.id),
                Change::Added(b) => ("added", b.id),
                Change::Changed { new, .. } => ("changed", new.id),
            })
            .collect::<Vec<_>>();

        assert_eq!(order, vec![("removed", 2), ("added", 3), ("changed", 1)]);
    }

    #[test]
    fn default_rule_treats_everything_as_changed() {
        #[derive(Clone)]
        struct Plain(u64);
        impl Entity for Plain {
            type Id = u64;
            fn id(&self) -> u64 {
                self.0
            }
        }
        impl ScopedEntity for Plain {
            type ParentId = u64;
            fn parent_id(&self) -> u64 {
                1
            }
        }
        impl Comparable for Plain {}

        let store = GroupedStore::new(crate::cache::policy::Gate::new(
            true,
            crate::cache::policy::CachePolicy::all(),
            Default::default(),
        ));
        store.put(Plain(1));

        let diff = reconcile(&store, 1, vec![Plain(1)]);
        assert_eq!(diff.changed.len(), 1);
        assert!(diff.unchanged.is_empty());
    }

    #[test]
    fn empty_replacement_removes_everything() {
        let store = open_store();
        store.put(badge(1, 1, "x"));
        store.put(badge(1, 2, "y"));

        let diff = reconcile(&store, 1, Vec::new());
        assert_eq!(ids(&diff.removed), vec![1, 2]);
        assert_eq!(store.group_len(&1), 0);
    }

    #[test]
    fn entities_for_other_parents_are_skipped() {
        let store = open_store();
        let diff = reconcile(&store, 1, vec![badge(2, 1, "stray"), badge(1, 2, "fine")]);

        assert_eq!(ids(&diff.added), vec![2]);
        assert!(!store.contains(&2, &1));
    }

    #[test]
    fn repeated_ids_are_classified_once() {
        let store = open_store();
        store.put(badge(1, 1, "a"));

        let diff = reconcile(&store, 1, vec![badge(1, 1, "b"), badge(1, 1, "c")]);
        assert_eq!(diff.changed.len() + diff.added.len(), 1);
        assert_eq!(diff.changed[0].1.label, "b");
        assert_eq!(store.get(&1, &1).unwrap().read().label, "b");

        let diff = reconcile(&store, 1, vec![badge(1, 2, "new"), badge(1, 1, "b"), badge(1, 2, "again")]);
        assert_eq!(ids(&diff.added), vec![2]);
        assert!(diff.changed.is_empty());
        assert_eq!(diff.unchanged, vec![1]);
    }

    #[test]
    fn identical_replacement_is_empty() {
        let store = open_store();
        store.put(badge(1, 1, "x"));

        let diff = reconcile_with(&store, 1, vec![badge(1, 1, "x")], |old: &Badge, new: &Badge| old != new);
        assert!(diff.is_empty());
        assert_eq!(diff.unchanged, vec![1]);
    }
}

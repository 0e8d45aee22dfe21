use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::trace;

use gearcache_lib::util::markers::UserId;

use crate::cache::policy::Gate;

/// A live handle to a cached entity. The store merges newer versions into the same allocation,
/// so everyone holding one of these sees updates as they land.
pub type Shared<T> = Arc<RwLock<T>>;

pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Copy + Eq + Hash + Ord + Debug + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    /// Fold a newer version of the same entity into the cached instance.
    fn merge(&mut self, newer: Self) {
        *self = newer;
    }

    /// The account this entity describes, if any. Used by the gate to always keep our own state.
    fn user_id(&self) -> Option<UserId> {
        None
    }
}

/// Point in time copy of a live handle, for handing out in notifications
pub fn freeze<T: Clone>(shared: &Shared<T>) -> Arc<T> {
    Arc::new(shared.read().clone())
}

pub(crate) fn detached<T>(entity: T) -> Shared<T> {
    Arc::new(RwLock::new(entity))
}

pub struct EntityStore<T: Entity> {
    entries: RwLock<HashMap<T::Id, Shared<T>>>,
    gate: Gate<T>,
}

impl<T: Entity> EntityStore<T> {
    pub fn new(gate: Gate<T>) -> Self {
        EntityStore {
            entries: Default::default(),
            gate,
        }
    }

    pub fn get(&self, id: &T::Id) -> Option<Shared<T>> {
        self.entries.read().get(id).cloned()
    }

    /// An independent copy, later updates to the cached instance don't reach it.
    pub fn get_snapshot(&self, id: &T::Id) -> Option<T> {
        self.entries.read().get(id).map(|entity| entity.read().clone())
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.entries.read().contains_key(id)
    }

    /// Store or merge the entity, handing back the canonical instance. Rejected entities come back
    /// detached so the caller can still use them, but nobody else will ever see them.
    pub fn put(&self, entity: T) -> Shared<T> {
        self.try_put(entity).unwrap_or_else(detached)
    }

    /// Like `put` but tells the caller when the gate turned the entity away.
    pub fn try_put(&self, entity: T) -> Result<Shared<T>, T> {
        let id = entity.id();
        // upgradable so no other writer can remove the entry between the lookup and the merge
        let entries = self.entries.upgradable_read();
        let existing = entries.get(&id).cloned();

        if !self.gate.admit(&entity, existing.is_some()) {
            trace!("Cache gate rejected {:?}", id);
            return Err(entity);
        }

        match existing {
            Some(existing) => {
                existing.write().merge(entity);
                Ok(existing)
            }
            None => {
                let shared = Arc::new(RwLock::new(entity));
                RwLockUpgradableReadGuard::upgrade(entries).insert(id, shared.clone());
                Ok(shared)
            }
        }
    }

    pub fn remove(&self, id: &T::Id) -> Option<Shared<T>> {
        self.entries.write().remove(id)
    }

    /// Removes every entry matching the predicate in a single write pass.
    pub fn remove_where(&self, predicate: impl Fn(&T) -> bool) -> Vec<Shared<T>> {
        let mut entries = self.entries.write();
        let ids = entries
            .iter()
            .filter(|(_, entity)| predicate(&entity.read()))
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();

        ids.into_iter().filter_map(|id| entries.remove(&id)).collect()
    }

    pub fn all(&self) -> Vec<Shared<T>> {
        self.entries.read().values().cloned().collect()
    }

    pub fn find_first(&self, predicate: impl Fn(&T) -> bool) -> Option<Shared<T>> {
        self.entries
            .read()
            .values()
            .find(|entity| predicate(&entity.read()))
            .cloned()
    }

    pub fn find_all(&self, predicate: impl Fn(&T) -> bool) -> Vec<Shared<T>> {
        self.entries
            .read()
            .values()
            .filter(|entity| predicate(&entity.read()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use gearcache_lib::util::markers::UserId;

    use super::*;
    use crate::cache::policy::{CachePolicy, Gate, SelfUser};

    #[derive(Clone, Debug, PartialEq)]
    pub struct Note {
        pub id: u64,
        pub owner: Option<UserId>,
        pub text: String,
        pub pinned: Option<bool>,
    }

    impl Entity for Note {
        type Id = u64;

        fn id(&self) -> u64 {
            self.id
        }

        fn merge(&mut self, newer: Self) {
            self.text = newer.text;
            self.owner = newer.owner;
            if newer.pinned.is_some() {
                self.pinned = newer.pinned;
            }
        }

        fn user_id(&self) -> Option<UserId> {
            self.owner
        }
    }

    pub fn note(id: u64, text: &str) -> Note {
        Note {
            id,
            owner: None,
            text: text.to_string(),
            pinned: None,
        }
    }

    fn open_store() -> EntityStore<Note> {
        EntityStore::new(Gate::new(true, CachePolicy::all(), SelfUser::default()))
    }

    #[test]
    fn put_then_get_returns_the_same_instance() {
        let store = open_store();
        let first = store.put(note(1, "hello"));
        let fetched = store.get(&1).unwrap();

        assert!(Arc::ptr_eq(&first, &fetched));
        assert_eq!(fetched.read().text, "hello");
    }

    #[test]
    fn updates_are_merged_in_place() {
        let store = open_store();
        let held = store.put(Note {
            pinned: Some(true),
            ..note(1, "before")
        });

        let returned = store.put(note(1, "after"));

        assert!(Arc::ptr_eq(&held, &returned));
        assert_eq!(held.read().text, "after");
        // merge keeps what the newer version didn't carry
        assert_eq!(held.read().pinned, Some(true));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn snapshots_are_independent_of_later_updates() {
        let store = open_store();
        store.put(note(1, "old"));
        let snapshot = store.get_snapshot(&1).unwrap();

        store.put(note(1, "new"));

        assert_eq!(snapshot.text, "old");
        assert_eq!(store.get_snapshot(&1).unwrap().text, "new");
    }

    #[test]
    fn rejected_puts_leave_the_store_untouched() {
        let store = EntityStore::new(Gate::new(true, CachePolicy::none(), SelfUser::default()));

        for _ in 0..3 {
            let detached = store.put(note(5, "nope"));
            assert_eq!(detached.read().text, "nope");
        }

        assert!(store.get(&5).is_none());
        assert!(store.is_empty());
        assert!(store.try_put(note(5, "again")).is_err());
    }

    #[test]
    fn remove_returns_the_entity_and_forgets_it() {
        let store = open_store();
        store.put(note(3, "bye"));

        let removed = store.remove(&3).unwrap();
        assert_eq!(removed.read().text, "bye");
        assert!(store.get(&3).is_none());
        assert!(store.remove(&3).is_none());
    }

    #[test]
    fn find_scans_all_entries() {
        let store = open_store();
        store.put(note(1, "apple"));
        store.put(note(2, "banana"));
        store.put(note(3, "avocado"));

        let first = store.find_first(|n| n.text.starts_with('b')).unwrap();
        assert_eq!(first.read().id, 2);

        let mut found = store
            .find_all(|n| n.text.starts_with('a'))
            .iter()
            .map(|n| n.read().id)
            .collect::<Vec<_>>();
        found.sort();
        assert_eq!(found, vec![1, 3]);

        let removed = store.remove_where(|n| n.text.len() > 5);
        assert_eq!(removed.len(), 2);
        assert_eq!(store.all().len(), 1);
    }

    #[test]
    fn freeze_copies_the_current_state() {
        let store = open_store();
        let live = store.put(note(9, "first"));
        let frozen = freeze(&live);
        store.put(note(9, "second"));

        assert_eq!(frozen.text, "first");
        assert_eq!(live.read().text, "second");
    }
}

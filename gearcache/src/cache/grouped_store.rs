use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::{debug, error, trace};

use crate::cache::policy::Gate;
use crate::cache::store::{detached, Entity, Shared};

/// An entity that only exists inside a parent (a guild or a thread).
pub trait ScopedEntity: Entity {
    type ParentId: Copy + Eq + Hash + Ord + Debug + Send + Sync + 'static;

    fn parent_id(&self) -> Self::ParentId;
}

type Entries<T> = HashMap<<T as Entity>::Id, Shared<T>>;

/// `None` once the group has been taken out of the store. Writers that looked the group up
/// before that happened find it retired under its own lock and go back for a live one.
type Group<T> = Arc<RwLock<Option<Entries<T>>>>;

fn fresh_group<T: Entity>() -> Group<T> {
    Arc::new(RwLock::new(Some(HashMap::new())))
}

// retires the group once its last entry is gone, the caller still has to unmap it
fn retire_if_empty<T: Entity>(parent_id: &impl Debug, entries: &mut Option<Entries<T>>) -> bool {
    let empty = entries.as_ref().map_or(false, HashMap::is_empty);
    if empty {
        *entries = None;
        trace!("Dropping empty group for {:?}", parent_id);
    }
    empty
}

/// Two level store: parent id -> entity id -> entity. Every parent gets its own lock so writes
/// to one guild never wait on reads of another. Empty groups are dropped again.
pub struct GroupedStore<T: ScopedEntity> {
    groups: RwLock<HashMap<T::ParentId, Group<T>>>,
    gate: Gate<T>,
}

impl<T: ScopedEntity> GroupedStore<T> {
    pub fn new(gate: Gate<T>) -> Self {
        GroupedStore {
            groups: Default::default(),
            gate,
        }
    }

    // never creates a group, passive lookups shouldn't grow the store
    fn group(&self, parent_id: &T::ParentId) -> Option<Group<T>> {
        self.groups.read().get(parent_id).cloned()
    }

    // a live group for the parent, replacing one that got retired but is still mapped
    fn group_for_insert(&self, parent_id: T::ParentId) -> Group<T> {
        let mut groups = self.groups.write();
        let group = groups.entry(parent_id).or_insert_with(fresh_group::<T>);
        if group.read().is_none() {
            *group = fresh_group::<T>();
        }
        group.clone()
    }

    // takes the group out of the map if it is still the mapped one
    fn unmap(&self, parent_id: &T::ParentId, group: &Group<T>) {
        let mut groups = self.groups.write();
        if groups.get(parent_id).map_or(false, |mapped| Arc::ptr_eq(mapped, group)) {
            groups.remove(parent_id);
        }
    }

    pub fn get(&self, parent_id: &T::ParentId, id: &T::Id) -> Option<Shared<T>> {
        self.group(parent_id)?.read().as_ref()?.get(id).cloned()
    }

    pub fn get_snapshot(&self, parent_id: &T::ParentId, id: &T::Id) -> Option<T> {
        self.get(parent_id, id).map(|entity| entity.read().clone())
    }

    pub fn contains(&self, parent_id: &T::ParentId, id: &T::Id) -> bool {
        self.get(parent_id, id).is_some()
    }

    /// Stores or merges the entity under its own parent id.
    pub fn put(&self, entity: T) -> Shared<T> {
        self.try_put(entity).unwrap_or_else(detached)
    }

    pub fn try_put(&self, entity: T) -> Result<Shared<T>, T> {
        let parent_id = entity.parent_id();
        let id = entity.id();

        let mut group = match self.group(&parent_id) {
            Some(group) => group,
            None => {
                // check before creating the group so rejected entities don't leave empty ones behind
                if !self.gate.admit(&entity, false) {
                    trace!("Cache gate rejected {:?} in {:?}", id, parent_id);
                    return Err(entity);
                }
                self.group_for_insert(parent_id)
            }
        };

        loop {
            let entries = group.upgradable_read();
            let existing = match entries.as_ref() {
                Some(entries) => entries.get(&id).cloned(),
                None => {
                    // removed or emptied since we looked it up
                    drop(entries);
                    group = self.group_for_insert(parent_id);
                    continue;
                }
            };

            if !self.gate.admit(&entity, existing.is_some()) {
                trace!("Cache gate rejected {:?} in {:?}", id, parent_id);
                drop(entries);
                self.remove_if_empty(&parent_id, &group);
                return Err(entity);
            }

            return match existing {
                Some(existing) => {
                    existing.write().merge(entity);
                    Ok(existing)
                }
                None => {
                    let shared = Arc::new(RwLock::new(entity));
                    let mut entries = RwLockUpgradableReadGuard::upgrade(entries);
                    if let Some(entries) = entries.as_mut() {
                        entries.insert(id, shared.clone());
                    }
                    Ok(shared)
                }
            };
        }
    }

    // a group created for an entity the gate then turned down
    fn remove_if_empty(&self, parent_id: &T::ParentId, group: &Group<T>) {
        let retired = {
            let mut entries = group.write();
            retire_if_empty(parent_id, &mut *entries)
        };
        if retired {
            self.unmap(parent_id, group);
        }
    }

    pub fn remove(&self, parent_id: &T::ParentId, id: &T::Id) -> Option<Shared<T>> {
        let group = self.group(parent_id)?;
        let (removed, retired) = {
            let mut entries = group.write();
            let removed = entries.as_mut()?.remove(id);
            let retired = retire_if_empty(parent_id, &mut *entries);
            (removed, retired)
        };
        if retired {
            self.unmap(parent_id, &group);
        }
        removed
    }

    /// Drops the whole nested collection for a parent that went away.
    pub fn remove_group(&self, parent_id: &T::ParentId) -> Vec<Shared<T>> {
        let group = self.groups.write().remove(parent_id);
        let removed = group
            .and_then(|group| group.write().take())
            .map(|entries| entries.into_values().collect::<Vec<_>>())
            .unwrap_or_default();
        if !removed.is_empty() {
            debug!("Dropped {} cached entries for {:?}", removed.len(), parent_id);
        }
        removed
    }

    /// Removes the entries of one parent matching the predicate.
    pub fn remove_in_group_where(&self, parent_id: &T::ParentId, predicate: impl Fn(&T) -> bool) -> Vec<Shared<T>> {
        let group = match self.group(parent_id) {
            Some(group) => group,
            None => return Vec::new(),
        };
        let (removed, retired) = {
            let mut entries = group.write();
            let removed = match entries.as_mut() {
                Some(entries) => {
                    let ids = entries
                        .iter()
                        .filter(|(_, entity)| predicate(&entity.read()))
                        .map(|(id, _)| *id)
                        .collect::<Vec<_>>();
                    ids.into_iter().filter_map(|id| entries.remove(&id)).collect::<Vec<_>>()
                }
                None => Vec::new(),
            };
            let retired = retire_if_empty(parent_id, &mut *entries);
            (removed, retired)
        };
        if retired {
            self.unmap(parent_id, &group);
        }
        removed
    }

    /// Makes the parent's collection match `entities`: known ids are merged in place, new ones are
    /// inserted and anything missing is removed and handed back.
    pub fn replace_group(&self, parent_id: T::ParentId, entities: Vec<T>) -> Vec<Shared<T>> {
        let mut stale = self.group_snapshot_ids(&parent_id);

        for entity in entities {
            if entity.parent_id() != parent_id {
                error!(
                    "Refusing to store {:?} under {:?}, it belongs to {:?}",
                    entity.id(),
                    parent_id,
                    entity.parent_id()
                );
                continue;
            }
            stale.remove(&entity.id());
            self.put(entity);
        }

        stale.iter().filter_map(|id| self.remove(&parent_id, id)).collect()
    }

    fn group_snapshot_ids(&self, parent_id: &T::ParentId) -> HashSet<T::Id> {
        self.group(parent_id)
            .and_then(|group| group.read().as_ref().map(|entries| entries.keys().copied().collect()))
            .unwrap_or_default()
    }

    pub fn group_all(&self, parent_id: &T::ParentId) -> Vec<Shared<T>> {
        self.group(parent_id)
            .and_then(|group| group.read().as_ref().map(|entries| entries.values().cloned().collect()))
            .unwrap_or_default()
    }

    /// Copies of everything cached for a parent, taken under a single read lock.
    pub fn group_snapshot(&self, parent_id: &T::ParentId) -> HashMap<T::Id, T> {
        self.group(parent_id)
            .and_then(|group| {
                group.read().as_ref().map(|entries| {
                    entries
                        .iter()
                        .map(|(id, entity)| (*id, entity.read().clone()))
                        .collect()
                })
            })
            .unwrap_or_default()
    }

    pub fn group_len(&self, parent_id: &T::ParentId) -> usize {
        self.group(parent_id)
            .and_then(|group| group.read().as_ref().map(HashMap::len))
            .unwrap_or(0)
    }

    fn live_groups(&self) -> Vec<(T::ParentId, Group<T>)> {
        self.groups
            .read()
            .iter()
            .map(|(parent_id, group)| (*parent_id, group.clone()))
            .collect()
    }

    pub fn all(&self) -> HashMap<T::ParentId, Vec<Shared<T>>> {
        self.live_groups()
            .into_iter()
            .filter_map(|(parent_id, group)| {
                let entries = group.read().as_ref()?.values().cloned().collect::<Vec<_>>();
                Some((parent_id, entries))
            })
            .collect()
    }

    pub fn find_first(&self, predicate: impl Fn(&T) -> bool) -> Option<Shared<T>> {
        self.live_groups().iter().find_map(|(_, group)| {
            group
                .read()
                .as_ref()?
                .values()
                .find(|entity| predicate(&entity.read()))
                .cloned()
        })
    }

    pub fn find_all(&self, predicate: impl Fn(&T) -> bool) -> Vec<Shared<T>> {
        self.live_groups()
            .iter()
            .flat_map(|(_, group)| {
                group
                    .read()
                    .as_ref()
                    .map(|entries| {
                        entries
                            .values()
                            .filter(|entity| predicate(&entity.read()))
                            .cloned()
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default()
            })
            .collect()
    }

    pub fn group_count(&self) -> usize {
        self.groups.read().len()
    }

    pub fn len(&self) -> usize {
        self.live_groups()
            .iter()
            .map(|(_, group)| group.read().as_ref().map_or(0, HashMap::len))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

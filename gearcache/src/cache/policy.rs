use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gearcache_lib::util::markers::{GuildId, UserId};

use crate::cache::grouped_store::ScopedEntity;

/// Per object predicate deciding whether something is worth keeping in memory.
pub struct CachePolicy<T>(Arc<dyn Fn(&T) -> bool + Send + Sync>);

impl<T> Clone for CachePolicy<T> {
    fn clone(&self) -> Self {
        CachePolicy(self.0.clone())
    }
}

impl<T: 'static> Default for CachePolicy<T> {
    fn default() -> Self {
        CachePolicy::all()
    }
}

impl<T: 'static> CachePolicy<T> {
    pub fn new(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        CachePolicy(Arc::new(predicate))
    }

    pub fn all() -> Self {
        CachePolicy::new(|_| true)
    }

    pub fn none() -> Self {
        CachePolicy::new(|_| false)
    }

    pub fn admits(&self, entity: &T) -> bool {
        (self.0)(entity)
    }

    pub fn or(self, other: CachePolicy<T>) -> Self {
        CachePolicy::new(move |entity| self.admits(entity) || other.admits(entity))
    }

    pub fn and(self, other: CachePolicy<T>) -> Self {
        CachePolicy::new(move |entity| self.admits(entity) && other.admits(entity))
    }
}

impl<T: ScopedEntity<ParentId = GuildId>> CachePolicy<T> {
    /// Only keep entities belonging to one of these guilds
    pub fn in_guilds(guilds: impl IntoIterator<Item = GuildId>) -> Self {
        let guilds = guilds.into_iter().collect::<HashSet<_>>();
        CachePolicy::new(move |entity: &T| guilds.contains(&entity.parent_id()))
    }
}

/// The account we're connected as. Unknown until the first READY arrives.
#[derive(Clone, Default)]
pub struct SelfUser(Arc<AtomicU64>);

impl SelfUser {
    pub fn set(&self, user_id: UserId) {
        self.0.store(user_id.get(), Ordering::SeqCst)
    }

    pub fn get(&self) -> Option<UserId> {
        UserId::new_checked(self.0.load(Ordering::SeqCst))
    }

    pub fn is(&self, user_id: UserId) -> bool {
        self.0.load(Ordering::SeqCst) == user_id.get()
    }
}

/// Collection flag + policy check every store runs before it mutates anything.
pub struct Gate<T> {
    enabled: bool,
    policy: CachePolicy<T>,
    self_user: SelfUser,
}

impl<T: 'static> Gate<T> {
    pub fn new(enabled: bool, policy: CachePolicy<T>, self_user: SelfUser) -> Self {
        Gate {
            enabled,
            policy,
            self_user,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl<T: crate::cache::store::Entity> Gate<T> {
    /// Our own state is always kept, no matter the flags. Entities already in the store keep
    /// receiving updates, otherwise they'd go stale the moment the policy changes its mind.
    pub fn admit(&self, entity: &T, cached: bool) -> bool {
        if let Some(user_id) = entity.user_id() {
            if self.self_user.is(user_id) {
                return true;
            }
        }

        if !self.enabled {
            return false;
        }

        cached || self.policy.admits(entity)
    }
}

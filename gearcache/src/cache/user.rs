use tracing::trace;

use gearcache_lib::util::markers::UserId;

use crate::cache::diff::Comparable;
use crate::cache::store::{Entity, Shared};
use crate::cache::Cache;
use crate::gateway::UserPayload;

#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub discriminator: String,
    pub global_name: Option<String>,
    pub avatar: Option<String>,
    pub bot: bool,
    //not caching the system flag since those can't be members of a guild
    pub public_flags: u64,
}

impl User {
    pub fn from_payload(user: UserPayload) -> Self {
        User {
            id: user.id,
            name: user.username,
            discriminator: user.discriminator,
            global_name: user.global_name,
            avatar: user.avatar,
            bot: user.bot,
            public_flags: user.public_flags.unwrap_or_default(),
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }

    fn user_id(&self) -> Option<UserId> {
        Some(self.id)
    }
}

// the id and bot flag can't change so only check what could have
impl Comparable for User {
    fn is_updated(&self, newer: &Self) -> bool {
        self.name != newer.name
            || self.discriminator != newer.discriminator
            || self.global_name != newer.global_name
            || self.avatar != newer.avatar
            || self.public_flags != newer.public_flags
    }
}

impl Cache {
    pub fn get_user(&self, user_id: &UserId) -> Option<Shared<User>> {
        self.users().get(user_id)
    }

    /// Number of cached guild memberships we know of for this user.
    pub fn mutual_guild_count(&self, user_id: &UserId) -> u16 {
        self.mutual_guilds.lock().get(user_id).copied().unwrap_or(0)
    }

    pub(crate) fn add_mutual_guild(&self, user_id: UserId) -> u16 {
        let mut mutual = self.mutual_guilds.lock();
        let count = mutual.entry(user_id).or_insert(0);
        *count += 1;
        *count
    }

    /// Forget one membership, purging the user once nothing else references them. Our own user
    /// never gets purged.
    pub(crate) fn remove_mutual_guild(&self, user_id: UserId) -> bool {
        let mut mutual = self.mutual_guilds.lock();
        let remaining = match mutual.get_mut(&user_id) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => 0,
        };
        if remaining > 0 {
            return false;
        }
        mutual.remove(&user_id);

        if self.self_user().is(user_id) {
            return false;
        }
        trace!("User {} has no more mutual guilds, purging them from the cache", user_id);
        self.users().remove(&user_id).is_some()
    }
}

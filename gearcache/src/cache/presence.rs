use gearcache_lib::util::markers::{GuildId, UserId};

pub use crate::gateway::{ActivityPayload as Activity, ClientStatusPayload as ClientStatus, Status};

use crate::cache::diff::Comparable;
use crate::cache::grouped_store::ScopedEntity;
use crate::cache::store::{Entity, Shared};
use crate::cache::Cache;
use crate::gateway::PresencePayload;

#[derive(Clone, Debug, PartialEq)]
pub struct Presence {
    pub guild_id: GuildId,
    pub user_id: UserId,
    pub status: Status,
    pub activities: Vec<Activity>,
    pub client_status: ClientStatus,
}

impl Presence {
    pub fn from_payload(guild_id: GuildId, presence: PresencePayload) -> Self {
        Presence {
            guild_id,
            user_id: presence.user.id,
            status: presence.status,
            activities: presence.activities,
            client_status: presence.client_status,
        }
    }
}

impl Entity for Presence {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.user_id
    }

    fn user_id(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}

impl ScopedEntity for Presence {
    type ParentId = GuildId;

    fn parent_id(&self) -> GuildId {
        self.guild_id
    }
}

impl Comparable for Presence {
    fn is_updated(&self, newer: &Self) -> bool {
        self != newer
    }
}

impl Cache {
    pub fn get_presence(&self, guild_id: &GuildId, user_id: &UserId) -> Option<Shared<Presence>> {
        self.presences().get(guild_id, user_id)
    }

    /// Store the presence, offline users are dropped instead since there's nothing to show for them.
    /// Returns the previous presence if there was one.
    pub fn update_presence(&self, presence: Presence) -> Option<Presence> {
        let old = self.presences().get_snapshot(&presence.guild_id, &presence.user_id);
        if presence.status == Status::Offline && !self.self_user().is(presence.user_id) {
            self.presences().remove(&presence.guild_id, &presence.user_id);
        } else {
            self.presences().put(presence);
        }
        old
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;

    fn presence(status: Status) -> Presence {
        Presence {
            guild_id: GuildId::new(1),
            user_id: UserId::new(2),
            status,
            activities: Vec::new(),
            client_status: ClientStatus::default(),
        }
    }

    #[test]
    fn offline_users_are_dropped() {
        let cache = Cache::new(CacheConfig::default());
        assert!(cache.update_presence(presence(Status::Online)).is_none());

        let old = cache.update_presence(presence(Status::Offline)).unwrap();
        assert_eq!(old.status, Status::Online);
        assert!(cache.get_presence(&GuildId::new(1), &UserId::new(2)).is_none());
    }

    #[test]
    fn own_presence_is_kept_even_when_offline() {
        let cache = Cache::new(CacheConfig::default());
        cache.self_user().set(UserId::new(2));
        cache.update_presence(presence(Status::Offline));

        assert_eq!(
            cache.get_presence(&GuildId::new(1), &UserId::new(2)).unwrap().read().status,
            Status::Offline
        );
    }
}

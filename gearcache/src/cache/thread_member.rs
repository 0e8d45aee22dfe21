use tracing::warn;

use gearcache_lib::util::markers::{ChannelId, GuildId, UserId};

use crate::cache::diff::Comparable;
use crate::cache::grouped_store::ScopedEntity;
use crate::cache::store::{Entity, Shared};
use crate::cache::Cache;
use crate::gateway::ThreadMemberPayload;

/// Someone who joined a thread. Grouped by the thread they're in, not the guild.
#[derive(Clone, Debug, PartialEq)]
pub struct ThreadMember {
    pub thread_id: ChannelId,
    pub user_id: UserId,
    pub join_timestamp: String,
    pub flags: u64,
}

impl ThreadMember {
    /// Members nested in a thread event leave out ids the event itself already carries.
    pub fn from_payload(thread_id: ChannelId, user_id: Option<UserId>, member: &ThreadMemberPayload) -> Option<Self> {
        let user_id = match member.user_id.or(user_id) {
            Some(user_id) => user_id,
            None => {
                warn!("Thread member for {} arrived without a user id", thread_id);
                return None;
            }
        };
        Some(ThreadMember {
            thread_id: member.id.unwrap_or(thread_id),
            user_id,
            join_timestamp: member.join_timestamp.clone(),
            flags: member.flags,
        })
    }
}

impl Entity for ThreadMember {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.user_id
    }

    fn user_id(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}

impl ScopedEntity for ThreadMember {
    type ParentId = ChannelId;

    fn parent_id(&self) -> ChannelId {
        self.thread_id
    }
}

impl Comparable for ThreadMember {
    fn is_updated(&self, newer: &Self) -> bool {
        self.flags != newer.flags
    }
}

impl Cache {
    pub fn thread_members_of(&self, thread_id: &ChannelId) -> Vec<Shared<ThreadMember>> {
        self.thread_members().group_all(thread_id)
    }

    /// Threads of a guild the user is part of.
    pub fn joined_threads(&self, guild_id: GuildId, user_id: &UserId) -> Vec<ChannelId> {
        self.guild_threads(guild_id)
            .iter()
            .map(|thread| thread.read().id)
            .filter(|thread_id| self.thread_members().contains(thread_id, user_id))
            .collect()
    }
}

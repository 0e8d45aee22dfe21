use tracing::trace;

use gearcache_lib::util::markers::{GuildId, RoleId, UserId};

use crate::cache::diff::Comparable;
use crate::cache::grouped_store::ScopedEntity;
use crate::cache::store::{Entity, Shared};
use crate::cache::{Cache, User};
use crate::gateway::MemberPayload;

#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    pub guild_id: GuildId,
    pub user: User,
    pub nick: Option<String>,
    pub avatar: Option<String>,
    pub roles: Vec<RoleId>,
    pub joined_at: Option<String>,
    pub premium_since: Option<String>,
    // member updates don't always carry these
    pub deaf: Option<bool>,
    pub mute: Option<bool>,
    pub pending: bool,
    pub communication_disabled_until: Option<String>,
}

impl Member {
    pub fn from_payload(guild_id: GuildId, member: MemberPayload) -> Self {
        Member {
            guild_id,
            user: User::from_payload(member.user),
            nick: member.nick,
            avatar: member.avatar,
            roles: member.roles,
            joined_at: member.joined_at,
            premium_since: member.premium_since,
            deaf: member.deaf,
            mute: member.mute,
            pending: member.pending,
            communication_disabled_until: member.communication_disabled_until,
        }
    }

    pub fn has_role(&self, role_id: RoleId) -> bool {
        self.roles.contains(&role_id)
    }
}

impl Entity for Member {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.user.id
    }

    fn merge(&mut self, newer: Self) {
        let deaf = newer.deaf.or(self.deaf);
        let mute = newer.mute.or(self.mute);
        let joined_at = newer.joined_at.clone().or_else(|| self.joined_at.take());
        *self = Member {
            deaf,
            mute,
            joined_at,
            ..newer
        };
    }

    fn user_id(&self) -> Option<UserId> {
        Some(self.user.id)
    }
}

impl ScopedEntity for Member {
    type ParentId = GuildId;

    fn parent_id(&self) -> GuildId {
        self.guild_id
    }
}

impl Comparable for Member {
    fn is_updated(&self, newer: &Self) -> bool {
        self.nick != newer.nick
            || self.avatar != newer.avatar
            || self.pending != newer.pending
            || self.premium_since != newer.premium_since
            || self.communication_disabled_until != newer.communication_disabled_until
            || newer.deaf.map_or(false, |deaf| self.deaf != Some(deaf))
            || newer.mute.map_or(false, |mute| self.mute != Some(mute))
            || self.roles != newer.roles
            || self.user.is_updated(&newer.user)
    }
}

impl Cache {
    pub fn get_member(&self, guild_id: &GuildId, user_id: &UserId) -> Option<Shared<Member>> {
        self.members().get(guild_id, user_id)
    }

    /// Store a member and keep the user store and mutual guild counts in line with it. Members the
    /// policy doesn't want are handed back untouched.
    pub fn cache_member(&self, member: Member) -> Result<Shared<Member>, Member> {
        let guild_id = member.guild_id;
        let user_id = member.user.id;
        let known = self.members().contains(&guild_id, &user_id);
        let user = member.user.clone();

        let stored = self.members().try_put(member)?;
        if !known {
            let count = self.add_mutual_guild(user_id);
            trace!("Cached member {} in guild {}, {} mutual guilds", user_id, guild_id, count);
        }
        self.users().put(user);

        Ok(stored)
    }

    pub fn uncache_member(&self, guild_id: &GuildId, user_id: &UserId) -> Option<Shared<Member>> {
        let removed = self.members().remove(guild_id, user_id)?;
        self.remove_mutual_guild(*user_id);
        Some(removed)
    }
}

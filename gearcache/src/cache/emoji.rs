use gearcache_lib::util::markers::{EmojiId, GuildId, RoleId, UserId};

use crate::cache::diff::Comparable;
use crate::cache::grouped_store::ScopedEntity;
use crate::cache::store::Entity;
use crate::gateway::EmojiPayload;

#[derive(Clone, Debug, PartialEq)]
pub struct Emoji {
    pub guild_id: GuildId,
    pub id: EmojiId,
    pub name: String,
    pub roles: Vec<RoleId>,
    // uploader, only visible with the right permissions
    pub creator: Option<UserId>,
    pub require_colons: bool,
    pub managed: bool,
    pub animated: bool,
    pub available: bool,
}

impl Emoji {
    pub fn from_payload(guild_id: GuildId, emoji: EmojiPayload) -> Self {
        Emoji {
            guild_id,
            id: emoji.id,
            name: emoji.name.unwrap_or_default(),
            roles: emoji.roles,
            creator: emoji.user.map(|user| user.id),
            require_colons: emoji.require_colons,
            managed: emoji.managed,
            animated: emoji.animated,
            available: emoji.available,
        }
    }
}

impl Entity for Emoji {
    type Id = EmojiId;

    fn id(&self) -> EmojiId {
        self.id
    }

    fn merge(&mut self, newer: Self) {
        let creator = newer.creator.or(self.creator);
        *self = Emoji { creator, ..newer };
    }
}

impl ScopedEntity for Emoji {
    type ParentId = GuildId;

    fn parent_id(&self) -> GuildId {
        self.guild_id
    }
}

// the creator can't change and isn't always sent, so it doesn't count
impl Comparable for Emoji {
    fn is_updated(&self, newer: &Self) -> bool {
        self.name != newer.name
            || self.roles != newer.roles
            || self.available != newer.available
            || self.animated != newer.animated
            || self.require_colons != newer.require_colons
    }
}

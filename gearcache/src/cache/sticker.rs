use gearcache_lib::util::markers::{GuildId, StickerId, UserId};

use crate::cache::diff::Comparable;
use crate::cache::grouped_store::ScopedEntity;
use crate::cache::store::Entity;
use crate::gateway::StickerPayload;

#[derive(Clone, Debug, PartialEq)]
pub struct Sticker {
    pub guild_id: GuildId,
    pub id: StickerId,
    pub name: String,
    pub description: Option<String>,
    pub tags: String,
    pub format_type: u8,
    pub available: bool,
    pub creator: Option<UserId>,
}

impl Sticker {
    pub fn from_payload(guild_id: GuildId, sticker: StickerPayload) -> Self {
        Sticker {
            guild_id,
            id: sticker.id,
            name: sticker.name,
            description: sticker.description,
            tags: sticker.tags,
            format_type: sticker.format_type,
            available: sticker.available,
            creator: sticker.user.map(|user| user.id),
        }
    }
}

impl Entity for Sticker {
    type Id = StickerId;

    fn id(&self) -> StickerId {
        self.id
    }

    fn merge(&mut self, newer: Self) {
        let creator = newer.creator.or(self.creator);
        *self = Sticker { creator, ..newer };
    }
}

impl ScopedEntity for Sticker {
    type ParentId = GuildId;

    fn parent_id(&self) -> GuildId {
        self.guild_id
    }
}

// format can't be changed after upload
impl Comparable for Sticker {
    fn is_updated(&self, newer: &Self) -> bool {
        self.name != newer.name
            || self.description != newer.description
            || self.tags != newer.tags
            || self.available != newer.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sticker(tags: &str) -> Sticker {
        Sticker {
            guild_id: GuildId::new(1),
            id: StickerId::new(5),
            name: "gear".to_string(),
            description: None,
            tags: tags.to_string(),
            format_type: 1,
            available: true,
            creator: None,
        }
    }

    #[test]
    fn tag_edits_are_updates() {
        assert!(sticker("cog").is_updated(&sticker("gear")));
        assert!(!sticker("cog").is_updated(&sticker("cog")));
        assert!(!sticker("cog").is_updated(&Sticker {
            format_type: 2,
            ..sticker("cog")
        }));
    }
}

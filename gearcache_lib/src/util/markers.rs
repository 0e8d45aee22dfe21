use twilight_model::id::marker::{
    ChannelMarker, EmojiMarker, GenericMarker, GuildMarker, RoleMarker, StageMarker, StickerMarker, UserMarker,
};
use twilight_model::id::Id;

pub type ChannelId = Id<ChannelMarker>;
pub type EmojiId = Id<EmojiMarker>;
pub type GenericId = Id<GenericMarker>;
pub type GuildId = Id<GuildMarker>;
pub type RoleId = Id<RoleMarker>;
pub type StageId = Id<StageMarker>;
pub type StickerId = Id<StickerMarker>;
pub type UserId = Id<UserMarker>;

// shards are plain numbers on the gateway, no snowflake involved
pub type ShardId = u64;

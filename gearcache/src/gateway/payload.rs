use serde::Deserialize;
use twilight_model::channel::ChannelType;
use twilight_model::guild::Permissions;

use gearcache_lib::util::markers::{ChannelId, EmojiId, GenericId, GuildId, RoleId, StageId, StickerId, UserId};

#[derive(Clone, Debug, Deserialize)]
pub struct UserPayload {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub public_flags: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MemberPayload {
    // absent when nested inside a guild create or member chunk
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    pub user: UserPayload,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleId>,
    #[serde(default)]
    pub joined_at: Option<String>,
    #[serde(default)]
    pub premium_since: Option<String>,
    #[serde(default)]
    pub deaf: Option<bool>,
    #[serde(default)]
    pub mute: Option<bool>,
    #[serde(default)]
    pub pending: bool,
    #[serde(default)]
    pub communication_disabled_until: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RolePayload {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub unicode_emoji: Option<String>,
    #[serde(default)]
    pub position: i64,
    pub permissions: Permissions,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub mentionable: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmojiPayload {
    pub id: EmojiId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleId>,
    #[serde(default)]
    pub user: Option<UserPayload>,
    #[serde(default)]
    pub require_colons: bool,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub animated: bool,
    #[serde(default = "available_by_default")]
    pub available: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StickerPayload {
    pub id: StickerId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub format_type: u8,
    #[serde(default = "available_by_default")]
    pub available: bool,
    #[serde(default)]
    pub user: Option<UserPayload>,
}

fn available_by_default() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct PermissionOverwritePayload {
    pub id: GenericId,
    #[serde(rename = "type")]
    pub kind: u8,
    pub allow: Permissions,
    pub deny: Permissions,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ThreadMetadataPayload {
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub auto_archive_duration: u16,
    #[serde(default)]
    pub archive_timestamp: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChannelPayload {
    pub id: ChannelId,
    #[serde(rename = "type")]
    pub kind: ChannelType,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub user_limit: Option<u32>,
    #[serde(default)]
    pub rate_limit_per_user: Option<u16>,
    #[serde(default)]
    pub parent_id: Option<ChannelId>,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    #[serde(default)]
    pub permission_overwrites: Vec<PermissionOverwritePayload>,
    #[serde(default)]
    pub thread_metadata: Option<ThreadMetadataPayload>,
    #[serde(default)]
    pub member_count: Option<u32>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VoiceStatePayload {
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    pub user_id: UserId,
    #[serde(default)]
    pub member: Option<MemberPayload>,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub self_deaf: bool,
    #[serde(default)]
    pub self_mute: bool,
    #[serde(default)]
    pub self_stream: bool,
    #[serde(default)]
    pub self_video: bool,
    #[serde(default)]
    pub suppress: bool,
    #[serde(default)]
    pub request_to_speak_timestamp: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Online,
    Idle,
    Dnd,
    Invisible,
    Offline,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ActivityPayload {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct ClientStatusPayload {
    #[serde(default)]
    pub desktop: Option<Status>,
    #[serde(default)]
    pub mobile: Option<Status>,
    #[serde(default)]
    pub web: Option<Status>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PresenceUserPayload {
    pub id: UserId,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PresencePayload {
    pub user: PresenceUserPayload,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    pub status: Status,
    #[serde(default)]
    pub activities: Vec<ActivityPayload>,
    #[serde(default)]
    pub client_status: ClientStatusPayload,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ThreadMemberPayload {
    // thread id, absent when nested in a thread create
    #[serde(default)]
    pub id: Option<ChannelId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    #[serde(default)]
    pub join_timestamp: String,
    #[serde(default)]
    pub flags: u64,
    #[serde(default)]
    pub member: Option<MemberPayload>,
    #[serde(default)]
    pub presence: Option<PresencePayload>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StageInstancePayload {
    pub id: StageId,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub topic: String,
    #[serde(default)]
    pub privacy_level: u8,
    #[serde(default)]
    pub guild_scheduled_event_id: Option<GenericId>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GuildPayload {
    pub id: GuildId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub splash: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub owner_id: UserId,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub preferred_locale: String,
    #[serde(default)]
    pub vanity_url_code: Option<String>,
    #[serde(default)]
    pub verification_level: u8,
    #[serde(default)]
    pub mfa_level: u8,
    #[serde(default)]
    pub nsfw_level: u8,
    #[serde(default)]
    pub premium_tier: u8,
    #[serde(default)]
    pub max_members: Option<u64>,
    #[serde(default)]
    pub max_presences: Option<u64>,
    #[serde(default)]
    pub member_count: Option<u64>,
    #[serde(default)]
    pub joined_at: Option<String>,
    #[serde(default)]
    pub large: Option<bool>,
    #[serde(default)]
    pub unavailable: bool,

    #[serde(default)]
    pub roles: Vec<RolePayload>,
    #[serde(default)]
    pub emojis: Vec<EmojiPayload>,
    #[serde(default)]
    pub stickers: Vec<StickerPayload>,
    #[serde(default)]
    pub channels: Vec<ChannelPayload>,
    #[serde(default)]
    pub threads: Vec<ChannelPayload>,
    #[serde(default)]
    pub members: Vec<MemberPayload>,
    #[serde(default)]
    pub voice_states: Vec<VoiceStatePayload>,
    #[serde(default)]
    pub presences: Vec<PresencePayload>,
    #[serde(default)]
    pub stage_instances: Vec<StageInstancePayload>,
}

/// Guild entry in READY and the body of GUILD_DELETE
#[derive(Clone, Debug, Deserialize)]
pub struct UnavailableGuildPayload {
    pub id: GuildId,
    #[serde(default)]
    pub unavailable: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReadyPayload {
    pub user: UserPayload,
    #[serde(default)]
    pub guilds: Vec<UnavailableGuildPayload>,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub shard: Option<[u64; 2]>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MemberChunkPayload {
    pub guild_id: GuildId,
    #[serde(default)]
    pub members: Vec<MemberPayload>,
    pub chunk_index: u32,
    pub chunk_count: u32,
    #[serde(default)]
    pub presences: Vec<PresencePayload>,
    #[serde(default)]
    pub nonce: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MemberRemovePayload {
    pub guild_id: GuildId,
    pub user: UserPayload,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RoleEventPayload {
    pub guild_id: GuildId,
    pub role: RolePayload,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RoleDeletePayload {
    pub guild_id: GuildId,
    pub role_id: RoleId,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmojisUpdatePayload {
    pub guild_id: GuildId,
    pub emojis: Vec<EmojiPayload>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StickersUpdatePayload {
    pub guild_id: GuildId,
    pub stickers: Vec<StickerPayload>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ThreadDeletePayload {
    pub id: ChannelId,
    pub guild_id: GuildId,
    #[serde(default)]
    pub parent_id: Option<ChannelId>,
    #[serde(rename = "type")]
    pub kind: ChannelType,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ThreadMembersUpdatePayload {
    pub id: ChannelId,
    pub guild_id: GuildId,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub added_members: Vec<ThreadMemberPayload>,
    #[serde(default)]
    pub removed_member_ids: Vec<UserId>,
}

use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use gearcache_lib::util::error::CacheError;
use gearcache_lib::util::markers::ShardId;
use gearcache_lib::util::CacheResult;

pub use payload::*;

pub mod payload;

/// Every gateway dispatch this layer knows how to fold into the cache.
#[derive(Clone, Debug)]
pub enum GatewayEvent {
    Ready(Box<ReadyPayload>),
    Resumed,
    GuildCreate(Box<GuildPayload>),
    GuildUpdate(Box<GuildPayload>),
    GuildDelete(UnavailableGuildPayload),
    MemberChunk(MemberChunkPayload),
    MemberAdd(Box<MemberPayload>),
    MemberUpdate(Box<MemberPayload>),
    MemberRemove(MemberRemovePayload),
    ChannelCreate(Box<ChannelPayload>),
    ChannelUpdate(Box<ChannelPayload>),
    ChannelDelete(Box<ChannelPayload>),
    ThreadCreate(Box<ChannelPayload>),
    ThreadUpdate(Box<ChannelPayload>),
    ThreadDelete(ThreadDeletePayload),
    ThreadMemberUpdate(Box<ThreadMemberPayload>),
    ThreadMembersUpdate(ThreadMembersUpdatePayload),
    RoleCreate(RoleEventPayload),
    RoleUpdate(RoleEventPayload),
    RoleDelete(RoleDeletePayload),
    EmojisUpdate(EmojisUpdatePayload),
    StickersUpdate(StickersUpdatePayload),
    VoiceStateUpdate(Box<VoiceStatePayload>),
    PresenceUpdate(Box<PresencePayload>),
    StageInstanceCreate(StageInstancePayload),
    StageInstanceUpdate(StageInstancePayload),
    StageInstanceDelete(StageInstancePayload),
    UserUpdate(UserPayload),
}

impl GatewayEvent {
    /// Decode a dispatch body by its event name. Events we don't cache anything for are `None`.
    pub fn decode(name: &str, data: Value) -> CacheResult<Option<GatewayEvent>> {
        let event = match name {
            "READY" => GatewayEvent::Ready(serde_json::from_value(data)?),
            "RESUMED" => GatewayEvent::Resumed,
            "GUILD_CREATE" => GatewayEvent::GuildCreate(serde_json::from_value(data)?),
            "GUILD_UPDATE" => GatewayEvent::GuildUpdate(serde_json::from_value(data)?),
            "GUILD_DELETE" => GatewayEvent::GuildDelete(serde_json::from_value(data)?),
            "GUILD_MEMBERS_CHUNK" => GatewayEvent::MemberChunk(serde_json::from_value(data)?),
            "GUILD_MEMBER_ADD" => GatewayEvent::MemberAdd(serde_json::from_value(data)?),
            "GUILD_MEMBER_UPDATE" => GatewayEvent::MemberUpdate(serde_json::from_value(data)?),
            "GUILD_MEMBER_REMOVE" => GatewayEvent::MemberRemove(serde_json::from_value(data)?),
            "CHANNEL_CREATE" => GatewayEvent::ChannelCreate(serde_json::from_value(data)?),
            "CHANNEL_UPDATE" => GatewayEvent::ChannelUpdate(serde_json::from_value(data)?),
            "CHANNEL_DELETE" => GatewayEvent::ChannelDelete(serde_json::from_value(data)?),
            "THREAD_CREATE" => GatewayEvent::ThreadCreate(serde_json::from_value(data)?),
            "THREAD_UPDATE" => GatewayEvent::ThreadUpdate(serde_json::from_value(data)?),
            "THREAD_DELETE" => GatewayEvent::ThreadDelete(serde_json::from_value(data)?),
            "THREAD_MEMBER_UPDATE" => GatewayEvent::ThreadMemberUpdate(serde_json::from_value(data)?),
            "THREAD_MEMBERS_UPDATE" => GatewayEvent::ThreadMembersUpdate(serde_json::from_value(data)?),
            "GUILD_ROLE_CREATE" => GatewayEvent::RoleCreate(serde_json::from_value(data)?),
            "GUILD_ROLE_UPDATE" => GatewayEvent::RoleUpdate(serde_json::from_value(data)?),
            "GUILD_ROLE_DELETE" => GatewayEvent::RoleDelete(serde_json::from_value(data)?),
            "GUILD_EMOJIS_UPDATE" => GatewayEvent::EmojisUpdate(serde_json::from_value(data)?),
            "GUILD_STICKERS_UPDATE" => GatewayEvent::StickersUpdate(serde_json::from_value(data)?),
            "VOICE_STATE_UPDATE" => GatewayEvent::VoiceStateUpdate(serde_json::from_value(data)?),
            "PRESENCE_UPDATE" => GatewayEvent::PresenceUpdate(serde_json::from_value(data)?),
            "STAGE_INSTANCE_CREATE" => GatewayEvent::StageInstanceCreate(serde_json::from_value(data)?),
            "STAGE_INSTANCE_UPDATE" => GatewayEvent::StageInstanceUpdate(serde_json::from_value(data)?),
            "STAGE_INSTANCE_DELETE" => GatewayEvent::StageInstanceDelete(serde_json::from_value(data)?),
            "USER_UPDATE" => GatewayEvent::UserUpdate(serde_json::from_value(data)?),
            other => {
                trace!("Ignoring gateway event {}", other);
                return Ok(None);
            }
        };
        Ok(Some(event))
    }

    pub fn name(&self) -> &'static str {
        match self {
            GatewayEvent::Ready(_) => "READY",
            GatewayEvent::Resumed => "RESUMED",
            GatewayEvent::GuildCreate(_) => "GUILD_CREATE",
            GatewayEvent::GuildUpdate(_) => "GUILD_UPDATE",
            GatewayEvent::GuildDelete(_) => "GUILD_DELETE",
            GatewayEvent::MemberChunk(_) => "GUILD_MEMBERS_CHUNK",
            GatewayEvent::MemberAdd(_) => "GUILD_MEMBER_ADD",
            GatewayEvent::MemberUpdate(_) => "GUILD_MEMBER_UPDATE",
            GatewayEvent::MemberRemove(_) => "GUILD_MEMBER_REMOVE",
            GatewayEvent::ChannelCreate(_) => "CHANNEL_CREATE",
            GatewayEvent::ChannelUpdate(_) => "CHANNEL_UPDATE",
            GatewayEvent::ChannelDelete(_) => "CHANNEL_DELETE",
            GatewayEvent::ThreadCreate(_) => "THREAD_CREATE",
            GatewayEvent::ThreadUpdate(_) => "THREAD_UPDATE",
            GatewayEvent::ThreadDelete(_) => "THREAD_DELETE",
            GatewayEvent::ThreadMemberUpdate(_) => "THREAD_MEMBER_UPDATE",
            GatewayEvent::ThreadMembersUpdate(_) => "THREAD_MEMBERS_UPDATE",
            GatewayEvent::RoleCreate(_) => "GUILD_ROLE_CREATE",
            GatewayEvent::RoleUpdate(_) => "GUILD_ROLE_UPDATE",
            GatewayEvent::RoleDelete(_) => "GUILD_ROLE_DELETE",
            GatewayEvent::EmojisUpdate(_) => "GUILD_EMOJIS_UPDATE",
            GatewayEvent::StickersUpdate(_) => "GUILD_STICKERS_UPDATE",
            GatewayEvent::VoiceStateUpdate(_) => "VOICE_STATE_UPDATE",
            GatewayEvent::PresenceUpdate(_) => "PRESENCE_UPDATE",
            GatewayEvent::StageInstanceCreate(_) => "STAGE_INSTANCE_CREATE",
            GatewayEvent::StageInstanceUpdate(_) => "STAGE_INSTANCE_UPDATE",
            GatewayEvent::StageInstanceDelete(_) => "STAGE_INSTANCE_DELETE",
            GatewayEvent::UserUpdate(_) => "USER_UPDATE",
        }
    }
}

/// A decoded event together with where it came from.
#[derive(Clone, Debug)]
pub struct Dispatch {
    pub shard: ShardId,
    pub sequence: u64,
    pub event: GatewayEvent,
}

/// Raw dispatch frame as handed over by the transport, tagged with its shard.
#[derive(Deserialize)]
struct Frame {
    #[serde(default)]
    shard: ShardId,
    s: Option<u64>,
    t: Option<String>,
    #[serde(default)]
    d: Value,
}

impl Dispatch {
    pub fn new(shard: ShardId, sequence: u64, event: GatewayEvent) -> Self {
        Dispatch { shard, sequence, event }
    }

    /// Decode a single json frame. Non dispatch frames and events we ignore are `None`.
    pub fn from_frame(raw: &str) -> CacheResult<Option<Dispatch>> {
        let frame: Frame = serde_json::from_str(raw)?;
        let name = match frame.t {
            Some(name) => name,
            None => return Ok(None),
        };
        let sequence = frame.s.ok_or(CacheError::MissingField("s"))?;

        Ok(GatewayEvent::decode(&name, frame.d)?.map(|event| Dispatch::new(frame.shard, sequence, event)))
    }
}

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use gearcache_lib::util::markers::{ChannelId, GuildId, RoleId, ShardId, UserId};

use crate::cache::{
    Channel, Emoji, Guild, Member, Presence, Role, StageInstance, Sticker, ThreadMember, User, VoiceState,
};

/// What happened to the cache, carrying frozen copies of the state before and after.
#[derive(Clone, Debug)]
pub enum CacheEvent {
    Ready { user: Arc<User>, guilds: usize },
    /// Every guild the shard was waiting on has arrived
    GuildsReady,
    GuildReady(Arc<Guild>),
    GuildJoin(Arc<Guild>),
    GuildAvailable(Arc<Guild>),
    GuildUnavailable { guild_id: GuildId, guild: Option<Arc<Guild>> },
    GuildUpdate { old: Option<Arc<Guild>>, new: Arc<Guild> },
    GuildLeave { guild_id: GuildId, guild: Option<Arc<Guild>> },

    ChannelCreate(Arc<Channel>),
    ChannelUpdate { old: Option<Arc<Channel>>, new: Arc<Channel> },
    ChannelDelete(Arc<Channel>),

    MemberJoin(Arc<Member>),
    MemberUpdate { old: Option<Arc<Member>>, new: Arc<Member> },
    MemberLeave { guild_id: GuildId, user: Arc<User>, member: Option<Arc<Member>> },
    MembersChunk { guild_id: GuildId, chunk_index: u32, chunk_count: u32, members: Vec<Arc<Member>> },

    RoleCreate(Arc<Role>),
    RoleUpdate { old: Option<Arc<Role>>, new: Arc<Role> },
    RoleDelete { guild_id: GuildId, role_id: RoleId, role: Option<Arc<Role>> },

    EmojiCreate(Arc<Emoji>),
    EmojiUpdate { old: Arc<Emoji>, new: Arc<Emoji> },
    EmojiDelete(Arc<Emoji>),

    StickerCreate(Arc<Sticker>),
    StickerUpdate { old: Arc<Sticker>, new: Arc<Sticker> },
    StickerDelete(Arc<Sticker>),

    VoiceJoin { channel_id: ChannelId, state: Arc<VoiceState> },
    VoiceMove { from: ChannelId, to: ChannelId, state: Arc<VoiceState> },
    VoiceLeave { guild_id: GuildId, user_id: UserId, from: Option<ChannelId>, old: Option<Arc<VoiceState>> },
    /// Same channel, something like mute or deafen changed
    VoiceStateUpdate { old: Option<Arc<VoiceState>>, new: Arc<VoiceState> },

    PresenceUpdate { old: Option<Arc<Presence>>, new: Arc<Presence> },

    ThreadMemberAdd(Arc<ThreadMember>),
    ThreadMemberUpdate { old: Option<Arc<ThreadMember>>, new: Arc<ThreadMember> },
    ThreadMemberRemove { thread_id: ChannelId, user_id: UserId, member: Option<Arc<ThreadMember>> },

    StageInstanceCreate(Arc<StageInstance>),
    StageInstanceUpdate { old: Option<Arc<StageInstance>>, new: Arc<StageInstance> },
    StageInstanceDelete(Arc<StageInstance>),

    SelfUpdate { old: Option<Arc<User>>, new: Arc<User> },
}

impl CacheEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CacheEvent::Ready { .. } => "Ready",
            CacheEvent::GuildsReady => "GuildsReady",
            CacheEvent::GuildReady(_) => "GuildReady",
            CacheEvent::GuildJoin(_) => "GuildJoin",
            CacheEvent::GuildAvailable(_) => "GuildAvailable",
            CacheEvent::GuildUnavailable { .. } => "GuildUnavailable",
            CacheEvent::GuildUpdate { .. } => "GuildUpdate",
            CacheEvent::GuildLeave { .. } => "GuildLeave",
            CacheEvent::ChannelCreate(_) => "ChannelCreate",
            CacheEvent::ChannelUpdate { .. } => "ChannelUpdate",
            CacheEvent::ChannelDelete(_) => "ChannelDelete",
            CacheEvent::MemberJoin(_) => "MemberJoin",
            CacheEvent::MemberUpdate { .. } => "MemberUpdate",
            CacheEvent::MemberLeave { .. } => "MemberLeave",
            CacheEvent::MembersChunk { .. } => "MembersChunk",
            CacheEvent::RoleCreate(_) => "RoleCreate",
            CacheEvent::RoleUpdate { .. } => "RoleUpdate",
            CacheEvent::RoleDelete { .. } => "RoleDelete",
            CacheEvent::EmojiCreate(_) => "EmojiCreate",
            CacheEvent::EmojiUpdate { .. } => "EmojiUpdate",
            CacheEvent::EmojiDelete(_) => "EmojiDelete",
            CacheEvent::StickerCreate(_) => "StickerCreate",
            CacheEvent::StickerUpdate { .. } => "StickerUpdate",
            CacheEvent::StickerDelete(_) => "StickerDelete",
            CacheEvent::VoiceJoin { .. } => "VoiceJoin",
            CacheEvent::VoiceMove { .. } => "VoiceMove",
            CacheEvent::VoiceLeave { .. } => "VoiceLeave",
            CacheEvent::VoiceStateUpdate { .. } => "VoiceStateUpdate",
            CacheEvent::PresenceUpdate { .. } => "PresenceUpdate",
            CacheEvent::ThreadMemberAdd(_) => "ThreadMemberAdd",
            CacheEvent::ThreadMemberUpdate { .. } => "ThreadMemberUpdate",
            CacheEvent::ThreadMemberRemove { .. } => "ThreadMemberRemove",
            CacheEvent::StageInstanceCreate(_) => "StageInstanceCreate",
            CacheEvent::StageInstanceUpdate { .. } => "StageInstanceUpdate",
            CacheEvent::StageInstanceDelete(_) => "StageInstanceDelete",
            CacheEvent::SelfUpdate { .. } => "SelfUpdate",
        }
    }
}

/// Where the gateway event that caused a notification came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Origin {
    pub shard: ShardId,
    pub sequence: u64,
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub shard: ShardId,
    pub sequence: u64,
    pub event: CacheEvent,
}

impl Notification {
    pub fn new(origin: Origin, event: CacheEvent) -> Self {
        Notification {
            shard: origin.shard,
            sequence: origin.sequence,
            event,
        }
    }
}

/// Receives notifications as the cache produces them. Must never block, handlers call this while
/// they're still processing the gateway event.
pub trait EventSink: Send + Sync {
    fn dispatch(&self, notification: Notification);
}

impl EventSink for UnboundedSender<Notification> {
    fn dispatch(&self, notification: Notification) {
        if let Err(e) = self.send(notification) {
            warn!("Dropping {} notification, nobody is listening anymore", e.0.event.name());
        }
    }
}

/// Keeps every notification in memory, mostly useful to see what a batch of events produced.
#[derive(Default)]
pub struct Recorder {
    notifications: Mutex<Vec<Notification>>,
}

impl Recorder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock())
    }

    /// Names of everything recorded so far, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.notifications
            .lock()
            .iter()
            .map(|notification| notification.event.name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.notifications.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.lock().is_empty()
    }
}

impl EventSink for Recorder {
    fn dispatch(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Origin {
        Origin { shard: 2, sequence: 7 }
    }

    #[test]
    fn recorder_keeps_order() {
        let recorder = Recorder::new();
        recorder.dispatch(Notification::new(origin(), CacheEvent::GuildsReady));
        recorder.dispatch(Notification::new(
            origin(),
            CacheEvent::GuildLeave {
                guild_id: GuildId::new(1),
                guild: None,
            },
        ));

        assert_eq!(recorder.names(), vec!["GuildsReady", "GuildLeave"]);
        let taken = recorder.take();
        assert_eq!(taken[0].shard, 2);
        assert_eq!(taken[1].sequence, 7);
        assert!(recorder.is_empty());
    }

    #[test]
    fn channel_sink_survives_a_closed_receiver() {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        sender.dispatch(Notification::new(origin(), CacheEvent::GuildsReady));
        drop(receiver);
        // must not panic
        sender.dispatch(Notification::new(origin(), CacheEvent::GuildsReady));
    }
}

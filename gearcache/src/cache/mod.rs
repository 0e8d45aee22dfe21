use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use gearcache_lib::util::markers::UserId;

pub mod channel;
pub mod config;
pub mod diff;
pub mod emoji;
pub mod grouped_store;
pub mod guild;
pub mod member;
pub mod policy;
pub mod presence;
pub mod readiness;
pub mod role;
pub mod stage_instance;
pub mod sticker;
pub mod store;
pub mod thread_member;
pub mod user;
pub mod voice_index;
pub mod voice_state;

pub use channel::Channel;
pub use config::{CacheConfig, CacheFlags, MemberCachePolicy};
pub use emoji::Emoji;
pub use grouped_store::{GroupedStore, ScopedEntity};
pub use guild::Guild;
pub use member::Member;
pub use policy::{CachePolicy, Gate, SelfUser};
pub use presence::Presence;
pub use readiness::ReadinessTracker;
pub use role::Role;
pub use stage_instance::StageInstance;
pub use sticker::Sticker;
pub use store::{Entity, EntityStore, Shared};
pub use thread_member::ThreadMember;
pub use user::User;
pub use voice_index::{ConnectedMembers, VoiceTransition};
pub use voice_state::VoiceState;

/// Every cached collection, each behind its own locks.
pub struct Cache {
    self_user: SelfUser,
    flags: CacheFlags,

    guilds: EntityStore<Guild>,
    channels: EntityStore<Channel>,
    users: EntityStore<User>,
    stage_instances: EntityStore<StageInstance>,

    members: GroupedStore<Member>,
    roles: GroupedStore<Role>,
    voice_states: Arc<GroupedStore<VoiceState>>,
    presences: GroupedStore<Presence>,
    emojis: GroupedStore<Emoji>,
    stickers: GroupedStore<Sticker>,
    thread_members: GroupedStore<ThreadMember>,

    readiness: ReadinessTracker,
    connected: ConnectedMembers,

    // cached memberships per user, users without any left get purged
    mutual_guilds: Mutex<HashMap<UserId, u16>>,
}

impl Cache {
    pub fn new(config: CacheConfig) -> Self {
        let self_user = SelfUser::default();
        let flags = config.flags;
        let gate = |flag: CacheFlags| flags.contains(flag);

        let voice_states = Arc::new(GroupedStore::new(Gate::new(
            gate(CacheFlags::VOICE_STATES),
            CachePolicy::all(),
            self_user.clone(),
        )));

        info!(
            "Initializing cache with flags {:?} and member policy {}",
            flags,
            config.member_policy.name()
        );

        let member_policy = match config.member_policy {
            MemberCachePolicy::All => CachePolicy::all(),
            MemberCachePolicy::None => CachePolicy::none(),
            MemberCachePolicy::InVoice => {
                let voice_states = voice_states.clone();
                CachePolicy::new(move |member: &Member| voice_states.contains(&member.guild_id, &member.user.id))
            }
            MemberCachePolicy::Custom(policy) => policy,
        };

        Cache {
            guilds: EntityStore::new(Gate::new(gate(CacheFlags::GUILDS), CachePolicy::all(), self_user.clone())),
            channels: EntityStore::new(Gate::new(gate(CacheFlags::CHANNELS), CachePolicy::all(), self_user.clone())),
            users: EntityStore::new(Gate::new(gate(CacheFlags::USERS), CachePolicy::all(), self_user.clone())),
            stage_instances: EntityStore::new(Gate::new(
                gate(CacheFlags::STAGE_INSTANCES),
                CachePolicy::all(),
                self_user.clone(),
            )),
            members: GroupedStore::new(Gate::new(gate(CacheFlags::MEMBERS), member_policy, self_user.clone())),
            roles: GroupedStore::new(Gate::new(gate(CacheFlags::ROLES), CachePolicy::all(), self_user.clone())),
            voice_states,
            presences: GroupedStore::new(Gate::new(
                gate(CacheFlags::PRESENCES),
                config.presence_policy,
                self_user.clone(),
            )),
            emojis: GroupedStore::new(Gate::new(gate(CacheFlags::EMOJIS), CachePolicy::all(), self_user.clone())),
            stickers: GroupedStore::new(Gate::new(gate(CacheFlags::STICKERS), CachePolicy::all(), self_user.clone())),
            thread_members: GroupedStore::new(Gate::new(
                gate(CacheFlags::THREAD_MEMBERS),
                CachePolicy::all(),
                self_user.clone(),
            )),
            readiness: ReadinessTracker::new(),
            connected: ConnectedMembers::new(),
            mutual_guilds: Default::default(),
            flags,
            self_user,
        }
    }

    pub fn flags(&self) -> CacheFlags {
        self.flags
    }

    pub fn self_user(&self) -> &SelfUser {
        &self.self_user
    }

    pub fn guilds(&self) -> &EntityStore<Guild> {
        &self.guilds
    }

    pub fn channels(&self) -> &EntityStore<Channel> {
        &self.channels
    }

    pub fn users(&self) -> &EntityStore<User> {
        &self.users
    }

    pub fn stage_instances(&self) -> &EntityStore<StageInstance> {
        &self.stage_instances
    }

    pub fn members(&self) -> &GroupedStore<Member> {
        &self.members
    }

    pub fn roles(&self) -> &GroupedStore<Role> {
        &self.roles
    }

    pub fn voice_states(&self) -> &GroupedStore<VoiceState> {
        &self.voice_states
    }

    pub fn presences(&self) -> &GroupedStore<Presence> {
        &self.presences
    }

    pub fn emojis(&self) -> &GroupedStore<Emoji> {
        &self.emojis
    }

    pub fn stickers(&self) -> &GroupedStore<Sticker> {
        &self.stickers
    }

    pub fn thread_members(&self) -> &GroupedStore<ThreadMember> {
        &self.thread_members
    }

    pub fn readiness(&self) -> &ReadinessTracker {
        &self.readiness
    }

    pub fn connected(&self) -> &ConnectedMembers {
        &self.connected
    }

    /// Entry counts per collection, for metrics
    pub fn sizes(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("guilds", self.guilds.len()),
            ("channels", self.channels.len()),
            ("users", self.users.len()),
            ("stage_instances", self.stage_instances.len()),
            ("members", self.members.len()),
            ("roles", self.roles.len()),
            ("voice_states", self.voice_states.len()),
            ("presences", self.presences.len()),
            ("emojis", self.emojis.len()),
            ("stickers", self.stickers.len()),
            ("thread_members", self.thread_members.len()),
        ]
    }
}

impl Default for Cache {
    fn default() -> Self {
        Cache::new(CacheConfig::default())
    }
}

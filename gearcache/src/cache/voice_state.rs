use tracing::trace;

use gearcache_lib::util::markers::{ChannelId, GuildId, UserId};

use crate::cache::diff::Comparable;
use crate::cache::grouped_store::ScopedEntity;
use crate::cache::store::Entity;
use crate::cache::voice_index::VoiceTransition;
use crate::cache::Cache;
use crate::gateway::VoiceStatePayload;

#[derive(Clone, Debug, PartialEq)]
pub struct VoiceState {
    pub guild_id: GuildId,
    pub user_id: UserId,
    pub channel_id: Option<ChannelId>,
    pub session_id: String,
    pub deaf: bool,
    pub mute: bool,
    pub self_deaf: bool,
    pub self_mute: bool,
    pub self_stream: bool,
    pub self_video: bool,
    pub suppress: bool,
    pub request_to_speak_timestamp: Option<String>,
}

impl VoiceState {
    pub fn from_payload(guild_id: GuildId, state: VoiceStatePayload) -> Self {
        VoiceState {
            guild_id,
            user_id: state.user_id,
            channel_id: state.channel_id,
            session_id: state.session_id,
            deaf: state.deaf,
            mute: state.mute,
            self_deaf: state.self_deaf,
            self_mute: state.self_mute,
            self_stream: state.self_stream,
            self_video: state.self_video,
            suppress: state.suppress,
            request_to_speak_timestamp: state.request_to_speak_timestamp,
        }
    }

    pub fn in_channel(guild_id: GuildId, user_id: UserId, channel_id: ChannelId) -> Self {
        VoiceState {
            guild_id,
            user_id,
            channel_id: Some(channel_id),
            session_id: String::new(),
            deaf: false,
            mute: false,
            self_deaf: false,
            self_mute: false,
            self_stream: false,
            self_video: false,
            suppress: false,
            request_to_speak_timestamp: None,
        }
    }
}

impl Entity for VoiceState {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.user_id
    }

    fn user_id(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}

impl ScopedEntity for VoiceState {
    type ParentId = GuildId;

    fn parent_id(&self) -> GuildId {
        self.guild_id
    }
}

impl Comparable for VoiceState {
    fn is_updated(&self, newer: &Self) -> bool {
        self != newer
    }
}

/// Result of applying a voice state to the cache.
#[derive(Debug)]
pub struct VoiceUpdate {
    pub old: Option<VoiceState>,
    pub transition: VoiceTransition,
    /// false when the store turned the state away, the connection index is left alone then
    pub cached: bool,
}

impl Cache {
    /// Apply a voice state and move the user through the connection index to match.
    /// Leaving is stored as the absence of a voice state.
    pub fn update_voice_state(&self, state: VoiceState) -> VoiceUpdate {
        let guild_id = state.guild_id;
        let user_id = state.user_id;
        let old = self.voice_states().get_snapshot(&guild_id, &user_id);
        let old_channel = old.as_ref().and_then(|old| old.channel_id);
        let new_channel = state.channel_id;
        let transition = VoiceTransition::classify(old_channel, new_channel);

        let cached = match new_channel {
            Some(_) => self.voice_states().try_put(state).is_ok(),
            None => {
                self.voice_states().remove(&guild_id, &user_id);
                true
            }
        };

        if cached {
            if old_channel != new_channel {
                self.connected().apply(guild_id, user_id, old_channel, new_channel);
            }
        } else {
            trace!("Voice state for {} in {} not cached, leaving the index alone", user_id, guild_id);
        }

        VoiceUpdate {
            old,
            transition,
            cached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, CacheFlags};

    fn ids() -> (GuildId, UserId, ChannelId, ChannelId) {
        (GuildId::new(1), UserId::new(2), ChannelId::new(10), ChannelId::new(20))
    }

    #[test]
    fn join_move_leave_keeps_the_index_in_step() {
        let cache = Cache::new(CacheConfig::default());
        let (guild, user, first, second) = ids();

        let joined = cache.update_voice_state(VoiceState::in_channel(guild, user, first));
        assert_eq!(joined.transition, VoiceTransition::Joined { channel_id: first });
        assert!(cache.connected().is_connected(first, user));

        let moved = cache.update_voice_state(VoiceState::in_channel(guild, user, second));
        assert_eq!(moved.transition, VoiceTransition::Moved { from: first, to: second });
        assert_eq!(moved.old.unwrap().channel_id, Some(first));
        assert!(!cache.connected().is_connected(first, user));
        assert!(cache.connected().is_connected(second, user));

        let left = cache.update_voice_state(VoiceState {
            channel_id: None,
            ..VoiceState::in_channel(guild, user, second)
        });
        assert_eq!(left.transition, VoiceTransition::Left { from: Some(second) });
        assert_eq!(cache.connected().channel_of(guild, user), None);
        assert!(cache.voice_states().get(&guild, &user).is_none());
    }

    #[test]
    fn mute_changes_are_not_transitions() {
        let cache = Cache::new(CacheConfig::default());
        let (guild, user, channel, _) = ids();
        cache.update_voice_state(VoiceState::in_channel(guild, user, channel));

        let update = cache.update_voice_state(VoiceState {
            self_mute: true,
            ..VoiceState::in_channel(guild, user, channel)
        });

        assert_eq!(update.transition, VoiceTransition::StateChanged);
        assert!(cache.voice_states().get(&guild, &user).unwrap().read().self_mute);
        assert_eq!(cache.connected().connected(channel).len(), 1);
    }

    #[test]
    fn rejected_states_stay_out_of_the_index() {
        let cache = Cache::new(CacheConfig::default().with_flags(CacheFlags::all() - CacheFlags::VOICE_STATES));
        let (guild, user, channel, _) = ids();

        let update = cache.update_voice_state(VoiceState::in_channel(guild, user, channel));

        assert!(!update.cached);
        assert!(!cache.connected().is_connected(channel, user));
        assert_eq!(cache.connected().channel_count(), 0);
    }
}

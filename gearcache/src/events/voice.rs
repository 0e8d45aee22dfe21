use std::sync::Arc;

use tracing::{trace, warn};

use crate::cache::{VoiceState, VoiceTransition};
use crate::dispatch::{CacheEvent, Origin};
use crate::events::member::cache_nested_member;
use crate::gateway::VoiceStatePayload;
use crate::util::CacheContext;

pub fn on_voice_state_update(mut payload: VoiceStatePayload, origin: Origin, context: &CacheContext) {
    let guild_id = match payload.guild_id {
        Some(guild_id) => guild_id,
        None => {
            warn!("Received a voice state update for {} outside of a guild", payload.user_id);
            return;
        }
    };
    let member = payload.member.take();
    let state = VoiceState::from_payload(guild_id, payload);
    let user_id = state.user_id;
    let new = Arc::new(state.clone());

    let update = context.cache.update_voice_state(state);

    // after the voice state so an in voice member policy already sees it
    if let Some(member) = member {
        cache_nested_member(guild_id, member, context);
    }

    let old = update.old.map(Arc::new);
    let event = match update.transition {
        VoiceTransition::Joined { channel_id } => CacheEvent::VoiceJoin { channel_id, state: new },
        VoiceTransition::Moved { from, to } => CacheEvent::VoiceMove { from, to, state: new },
        VoiceTransition::Left { from: None } => {
            trace!("User {} left voice in {} but wasn't connected to begin with", user_id, guild_id);
            return;
        }
        VoiceTransition::Left { from } => CacheEvent::VoiceLeave {
            guild_id,
            user_id,
            from,
            old,
        },
        VoiceTransition::StateChanged => CacheEvent::VoiceStateUpdate { old, new },
    };
    context.dispatch(origin, event);
}

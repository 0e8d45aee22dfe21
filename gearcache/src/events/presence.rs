use std::sync::Arc;

use tracing::{trace, warn};

use crate::cache::diff::Comparable;
use crate::cache::Presence;
use crate::dispatch::{CacheEvent, Origin};
use crate::gateway::PresencePayload;
use crate::util::CacheContext;

pub fn on_presence_update(payload: PresencePayload, origin: Origin, context: &CacheContext) {
    let guild_id = match payload.guild_id {
        Some(guild_id) => guild_id,
        None => {
            warn!("Received a presence update for {} outside of a guild", payload.user.id);
            return;
        }
    };
    let presence = Presence::from_payload(guild_id, payload);
    let new = Arc::new(presence.clone());

    let old = context.cache.update_presence(presence);
    if let Some(old) = &old {
        if !old.is_updated(&new) {
            trace!("Presence update for {} in {} didn't change anything", new.user_id, guild_id);
            return;
        }
    }

    context.dispatch(
        origin,
        CacheEvent::PresenceUpdate {
            old: old.map(Arc::new),
            new,
        },
    );
}

use tracing::{info, warn};

use crate::cache::store::freeze;
use crate::cache::Guild;
use crate::dispatch::{CacheEvent, Origin};
use crate::gateway::{GuildPayload, UnavailableGuildPayload};
use crate::util::CacheContext;

pub fn on_guild_create(payload: GuildPayload, origin: Origin, context: &CacheContext) {
    let guild_id = payload.id;
    let readiness = context.cache.readiness();

    if payload.unavailable {
        // still in an outage, keep whatever we had
        let guild = context.cache.set_guild_unavailable(guild_id);
        let was_pending = readiness.mark_ready(origin.shard, guild_id);
        warn!("Guild {} is still unavailable", guild_id);
        context.dispatch(
            origin,
            CacheEvent::GuildUnavailable {
                guild_id,
                guild: guild.as_ref().map(freeze),
            },
        );
        finish_pending(was_pending, origin, context);
        return;
    }

    let guild = context.cache.load_guild(payload);
    let was_unavailable = readiness.mark_available(guild_id);
    let was_pending = readiness.mark_ready(origin.shard, guild_id);
    let frozen = freeze(&guild);

    let event = if was_pending {
        CacheEvent::GuildReady(frozen)
    } else if was_unavailable {
        info!("Guild {} is available again", guild_id);
        CacheEvent::GuildAvailable(frozen)
    } else {
        info!("Joined guild {} ({})", frozen.name, guild_id);
        CacheEvent::GuildJoin(frozen)
    };
    context.dispatch(origin, event);
    finish_pending(was_pending, origin, context);
}

pub fn on_guild_update(payload: GuildPayload, origin: Origin, context: &CacheContext) {
    let old = context.cache.guilds().get_snapshot(&payload.id);
    if old.is_none() {
        warn!("Received a guild update for a guild that wasn't cached: {}", payload.id);
    }

    let new = context.cache.guilds().put(Guild::from_payload(&payload));
    context.dispatch(
        origin,
        CacheEvent::GuildUpdate {
            old: old.map(Into::into),
            new: freeze(&new),
        },
    );
}

pub fn on_guild_delete(event: UnavailableGuildPayload, origin: Origin, context: &CacheContext) {
    let guild_id = event.id;
    let readiness = context.cache.readiness();

    if event.unavailable {
        let guild = context.cache.set_guild_unavailable(guild_id);
        let was_pending = readiness.mark_ready(origin.shard, guild_id);
        info!("Guild {} became unavailable", guild_id);
        context.dispatch(
            origin,
            CacheEvent::GuildUnavailable {
                guild_id,
                guild: guild.as_ref().map(freeze),
            },
        );
        finish_pending(was_pending, origin, context);
    } else {
        let was_pending = readiness.is_unready(origin.shard, guild_id);
        let old = context.cache.remove_guild(guild_id);
        if old.is_none() {
            warn!("Received a guild delete event for a server that wasn't cached: {}", guild_id);
        }
        context.dispatch(
            origin,
            CacheEvent::GuildLeave {
                guild_id,
                guild: old.as_ref().map(freeze),
            },
        );
        finish_pending(was_pending, origin, context);
    }
}

// the shard is done once the last pending guild arrived or went away
fn finish_pending(was_pending: bool, origin: Origin, context: &CacheContext) {
    if was_pending && context.cache.readiness().is_shard_ready(origin.shard) {
        info!("Shard {} received all of its guilds", origin.shard);
        context.dispatch(origin, CacheEvent::GuildsReady);
    }
}

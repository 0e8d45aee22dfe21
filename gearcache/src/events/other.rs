use std::sync::Arc;

use tracing::{info, trace, warn};

use crate::cache::diff::Comparable;
use crate::cache::store::freeze;
use crate::cache::User;
use crate::dispatch::{CacheEvent, Origin};
use crate::gateway::{ReadyPayload, UserPayload};
use crate::util::CacheContext;

pub fn on_ready(ready: ReadyPayload, origin: Origin, context: &CacheContext) {
    let user = User::from_payload(ready.user);
    // has to be known before anything else gets cached so the gate keeps our own state
    context.cache.self_user().set(user.id);
    let user = context.cache.users().put(user);

    // fresh session, every guild will be sent again
    let readiness = context.cache.readiness();
    readiness.reset_shard(origin.shard);
    for guild in &ready.guilds {
        readiness.mark_unready(origin.shard, guild.id);
    }

    info!(
        "Shard {} is ready as {}, waiting on {} guilds",
        origin.shard,
        user.read().name,
        ready.guilds.len()
    );
    context.dispatch(
        origin,
        CacheEvent::Ready {
            user: freeze(&user),
            guilds: ready.guilds.len(),
        },
    );

    if ready.guilds.is_empty() {
        context.dispatch(origin, CacheEvent::GuildsReady);
    }
}

pub fn on_resume(origin: Origin, context: &CacheContext) {
    // nothing got lost, the gateway replays what we missed
    let pending = context.cache.readiness().unready_guilds(origin.shard);
    if pending.is_empty() {
        trace!("Shard {} resumed", origin.shard);
    } else {
        warn!("Shard {} resumed while still waiting on {} guilds", origin.shard, pending.len());
    }
}

/// Only ever fires for our own user.
pub fn on_user_update(payload: UserPayload, origin: Origin, context: &CacheContext) {
    let user = User::from_payload(payload);
    let old = context.cache.users().get_snapshot(&user.id);
    if let Some(old) = &old {
        if !old.is_updated(&user) {
            return;
        }
    }

    let new = context.cache.users().put(user);
    context.dispatch(
        origin,
        CacheEvent::SelfUpdate {
            old: old.map(Arc::new),
            new: freeze(&new),
        },
    );
}

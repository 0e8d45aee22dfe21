use std::sync::Arc;

use tracing::{info, trace};

use crate::cache::diff::Comparable;
use crate::cache::store::freeze;
use crate::cache::Channel;
use crate::dispatch::{CacheEvent, Origin};
use crate::gateway::ChannelPayload;
use crate::util::CacheContext;

pub fn on_channel_create(payload: ChannelPayload, origin: Origin, context: &CacheContext) {
    let channel = context.cache.channels().put(Channel::from_payload(payload));
    context.dispatch(origin, CacheEvent::ChannelCreate(freeze(&channel)));
}

pub fn on_channel_update(payload: ChannelPayload, origin: Origin, context: &CacheContext) {
    let channel = Channel::from_payload(payload);
    let old = context.cache.channels().get_snapshot(&channel.id);

    if let Some(old) = &old {
        if !old.is_updated(&channel) {
            trace!("Channel update for {} didn't change anything", channel.id);
            return;
        }
    }

    let new = context.cache.channels().put(channel);
    context.dispatch(
        origin,
        CacheEvent::ChannelUpdate {
            old: old.map(Arc::new),
            new: freeze(&new),
        },
    );
}

pub fn on_channel_delete(payload: ChannelPayload, origin: Origin, context: &CacheContext) {
    let removed = match context.cache.remove_channel(&payload.id) {
        Some(removed) => freeze(&removed),
        None => Arc::new(Channel::from_payload(payload)),
    };
    info!("Channel {} was deleted", removed.id);
    context.dispatch(origin, CacheEvent::ChannelDelete(removed));
}

use std::sync::Arc;

use tracing::{trace, warn};

use crate::cache::diff::Comparable;
use crate::cache::store::freeze;
use crate::cache::{Channel, Presence, ThreadMember};
use crate::dispatch::{CacheEvent, Origin};
use crate::events::channel::{on_channel_create, on_channel_update};
use crate::events::member::cache_nested_member;
use crate::gateway::{ChannelPayload, ThreadDeletePayload, ThreadMemberPayload, ThreadMembersUpdatePayload};
use crate::util::CacheContext;

pub fn on_thread_create(thread: ChannelPayload, origin: Origin, context: &CacheContext) {
    on_channel_create(thread, origin, context)
}

pub fn on_thread_update(thread: ChannelPayload, origin: Origin, context: &CacheContext) {
    on_channel_update(thread, origin, context)
}

pub fn on_thread_delete(delete: ThreadDeletePayload, origin: Origin, context: &CacheContext) {
    let removed = match context.cache.remove_channel(&delete.id) {
        Some(removed) => freeze(&removed),
        // all we know about it is in the delete itself
        None => Arc::new(Channel {
            id: delete.id,
            guild_id: Some(delete.guild_id),
            kind: delete.kind,
            name: String::new(),
            position: 0,
            topic: None,
            nsfw: false,
            bitrate: 0,
            user_limit: 0,
            rate_limit_per_user: 0,
            parent_id: delete.parent_id,
            owner_id: None,
            permission_overwrites: Vec::new(),
            thread_metadata: None,
            member_count: None,
        }),
    };
    context.dispatch(origin, CacheEvent::ChannelDelete(removed));
}

/// Only ever sent for our own thread membership.
pub fn on_thread_member_update(payload: ThreadMemberPayload, origin: Origin, context: &CacheContext) {
    let thread_id = match payload.id {
        Some(thread_id) => thread_id,
        None => {
            warn!("Received a thread member update without a thread id");
            return;
        }
    };
    let member = match ThreadMember::from_payload(thread_id, context.cache.self_user().get(), &payload) {
        Some(member) => member,
        None => return,
    };

    let old = context.cache.thread_members().get_snapshot(&thread_id, &member.user_id);
    if let Some(old) = &old {
        if !old.is_updated(&member) {
            trace!("Thread member update for {} in {} didn't change anything", member.user_id, thread_id);
            return;
        }
    }

    let new = freeze(&context.cache.thread_members().put(member));
    let event = match old {
        Some(old) => CacheEvent::ThreadMemberUpdate {
            old: Some(Arc::new(old)),
            new,
        },
        None => CacheEvent::ThreadMemberAdd(new),
    };
    context.dispatch(origin, event);
}

pub fn on_thread_members_update(update: ThreadMembersUpdatePayload, origin: Origin, context: &CacheContext) {
    let thread_id = update.id;
    if let Some(thread) = context.cache.get_channel(&thread_id) {
        thread.write().member_count = Some(update.member_count);
    }

    for user_id in update.removed_member_ids {
        let removed = context.cache.thread_members().remove(&thread_id, &user_id);
        context.dispatch(
            origin,
            CacheEvent::ThreadMemberRemove {
                thread_id,
                user_id,
                member: removed.as_ref().map(freeze),
            },
        );
    }

    for mut added in update.added_members {
        let member = match ThreadMember::from_payload(thread_id, None, &added) {
            Some(member) => member,
            None => continue,
        };
        if let Some(guild_member) = added.member.take() {
            cache_nested_member(update.guild_id, guild_member, context);
        }
        if let Some(presence) = added.presence.take() {
            context
                .cache
                .update_presence(Presence::from_payload(update.guild_id, presence));
        }

        let stored = context.cache.thread_members().put(member);
        context.dispatch(origin, CacheEvent::ThreadMemberAdd(freeze(&stored)));
    }
}

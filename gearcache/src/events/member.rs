use std::sync::Arc;

use tracing::{debug, warn};

use gearcache_lib::util::markers::GuildId;

use crate::cache::diff::Comparable;
use crate::cache::store::freeze;
use crate::cache::{Member, Presence, Shared, User};
use crate::dispatch::{CacheEvent, Origin};
use crate::gateway::{MemberChunkPayload, MemberPayload, MemberRemovePayload};
use crate::util::CacheContext;

// members the policy rejects still get their notification, just without being kept around
fn store_member(member: Member, context: &CacheContext) -> Arc<Member> {
    match context.cache.cache_member(member) {
        Ok(stored) => freeze(&stored),
        Err(rejected) => Arc::new(rejected),
    }
}

fn guild_of(member: &MemberPayload, event: &str) -> Option<GuildId> {
    if member.guild_id.is_none() {
        warn!("Received a {} for user {} without a guild id", event, member.user.id);
    }
    member.guild_id
}

pub fn on_member_add(payload: MemberPayload, origin: Origin, context: &CacheContext) {
    let guild_id = match guild_of(&payload, "member add") {
        Some(guild_id) => guild_id,
        None => return,
    };
    context.cache.adjust_member_count(&guild_id, 1);

    let member = store_member(Member::from_payload(guild_id, payload), context);
    context.dispatch(origin, CacheEvent::MemberJoin(member));
}

pub fn on_member_update(payload: MemberPayload, origin: Origin, context: &CacheContext) {
    let guild_id = match guild_of(&payload, "member update") {
        Some(guild_id) => guild_id,
        None => return,
    };
    let old = context.cache.members().get_snapshot(&guild_id, &payload.user.id);
    let member = Member::from_payload(guild_id, payload);

    if let Some(old) = &old {
        if !old.is_updated(&member) {
            // still store it, merge fills in what we had missing
            context.cache.members().put(member);
            return;
        }
    }

    let new = store_member(member, context);
    context.dispatch(
        origin,
        CacheEvent::MemberUpdate {
            old: old.map(Arc::new),
            new,
        },
    );
}

pub fn on_member_remove(payload: MemberRemovePayload, origin: Origin, context: &CacheContext) {
    let guild_id = payload.guild_id;
    let user_id = payload.user.id;
    context.cache.adjust_member_count(&guild_id, -1);

    let member = context.cache.uncache_member(&guild_id, &user_id);
    context.dispatch(
        origin,
        CacheEvent::MemberLeave {
            guild_id,
            user: Arc::new(User::from_payload(payload.user)),
            member: member.as_ref().map(freeze),
        },
    );
}

pub fn on_member_chunk(chunk: MemberChunkPayload, origin: Origin, context: &CacheContext) {
    let guild_id = chunk.guild_id;
    debug!(
        "Received chunk {}/{} for guild {} with {} members",
        chunk.chunk_index + 1,
        chunk.chunk_count,
        guild_id,
        chunk.members.len()
    );

    let members = chunk
        .members
        .into_iter()
        .map(|member| store_member(Member::from_payload(guild_id, member), context))
        .collect::<Vec<_>>();

    for presence in chunk.presences {
        context.cache.update_presence(Presence::from_payload(guild_id, presence));
    }

    context.dispatch(
        origin,
        CacheEvent::MembersChunk {
            guild_id,
            chunk_index: chunk.chunk_index,
            chunk_count: chunk.chunk_count,
            members,
        },
    );
}

/// Members nested in other events (voice states, thread members) get cached along the way.
pub(crate) fn cache_nested_member(guild_id: GuildId, payload: MemberPayload, context: &CacheContext) -> Option<Shared<Member>> {
    context.cache.cache_member(Member::from_payload(guild_id, payload)).ok()
}

use std::sync::Arc;

use tracing::trace;

use crate::cache::diff::Comparable;
use crate::cache::store::freeze;
use crate::cache::Role;
use crate::dispatch::{CacheEvent, Origin};
use crate::gateway::{RoleDeletePayload, RoleEventPayload};
use crate::util::CacheContext;

pub fn on_role_create(create: RoleEventPayload, origin: Origin, context: &CacheContext) {
    let role = context.cache.roles().put(Role::from_payload(create.guild_id, create.role));
    context.dispatch(origin, CacheEvent::RoleCreate(freeze(&role)));
}

pub fn on_role_update(update: RoleEventPayload, origin: Origin, context: &CacheContext) {
    let role = Role::from_payload(update.guild_id, update.role);
    let old = context.cache.roles().get_snapshot(&role.guild_id, &role.id);
    if let Some(old) = &old {
        if !old.is_updated(&role) {
            trace!("Role update for {} didn't change anything", role.id);
            return;
        }
    }

    let new = context.cache.roles().put(role);
    context.dispatch(
        origin,
        CacheEvent::RoleUpdate {
            old: old.map(Arc::new),
            new: freeze(&new),
        },
    );
}

pub fn on_role_delete(delete: RoleDeletePayload, origin: Origin, context: &CacheContext) {
    let removed = context.cache.remove_role(&delete.guild_id, &delete.role_id);
    context.dispatch(
        origin,
        CacheEvent::RoleDelete {
            guild_id: delete.guild_id,
            role_id: delete.role_id,
            role: removed.as_ref().map(freeze),
        },
    );
}

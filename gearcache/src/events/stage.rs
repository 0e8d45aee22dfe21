use std::sync::Arc;

use tracing::trace;

use crate::cache::diff::Comparable;
use crate::cache::store::freeze;
use crate::cache::StageInstance;
use crate::dispatch::{CacheEvent, Origin};
use crate::gateway::StageInstancePayload;
use crate::util::CacheContext;

pub fn on_stage_instance_create(stage: StageInstancePayload, origin: Origin, context: &CacheContext) {
    let stage = context.cache.stage_instances().put(StageInstance::from_payload(stage));
    context.dispatch(origin, CacheEvent::StageInstanceCreate(freeze(&stage)));
}

pub fn on_stage_instance_update(stage: StageInstancePayload, origin: Origin, context: &CacheContext) {
    let stage = StageInstance::from_payload(stage);
    let old = context.cache.stage_instances().get_snapshot(&stage.id);
    if let Some(old) = &old {
        if !old.is_updated(&stage) {
            trace!("Stage instance update for {} didn't change anything", stage.id);
            return;
        }
    }

    let new = context.cache.stage_instances().put(stage);
    context.dispatch(
        origin,
        CacheEvent::StageInstanceUpdate {
            old: old.map(Arc::new),
            new: freeze(&new),
        },
    );
}

pub fn on_stage_instance_delete(stage: StageInstancePayload, origin: Origin, context: &CacheContext) {
    let removed = match context.cache.stage_instances().remove(&stage.id) {
        Some(removed) => freeze(&removed),
        None => Arc::new(StageInstance::from_payload(stage)),
    };
    context.dispatch(origin, CacheEvent::StageInstanceDelete(removed));
}

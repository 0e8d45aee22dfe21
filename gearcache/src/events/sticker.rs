use crate::cache::diff::{reconcile, Change};
use crate::cache::Sticker;
use crate::dispatch::{CacheEvent, Origin};
use crate::gateway::StickersUpdatePayload;
use crate::util::CacheContext;

pub fn on_stickers_update(update: StickersUpdatePayload, origin: Origin, context: &CacheContext) {
    let guild_id = update.guild_id;
    let stickers = update
        .stickers
        .into_iter()
        .map(|sticker| Sticker::from_payload(guild_id, sticker))
        .collect();

    let diff = reconcile(context.cache.stickers(), guild_id, stickers);
    context.dispatch_all(
        origin,
        diff.into_changes().map(|change| match change {
            Change::Removed(sticker) => CacheEvent::StickerDelete(sticker),
            Change::Added(sticker) => CacheEvent::StickerCreate(sticker),
            Change::Changed { old, new } => CacheEvent::StickerUpdate { old, new },
        }),
    );
}

use crate::cache::diff::{reconcile, Change};
use crate::cache::Emoji;
use crate::dispatch::{CacheEvent, Origin};
use crate::gateway::EmojisUpdatePayload;
use crate::util::CacheContext;

/// The update carries the complete emoji list, so diff it against what we had.
pub fn on_emojis_update(update: EmojisUpdatePayload, origin: Origin, context: &CacheContext) {
    let guild_id = update.guild_id;
    let emojis = update
        .emojis
        .into_iter()
        .map(|emoji| Emoji::from_payload(guild_id, emoji))
        .collect();

    let diff = reconcile(context.cache.emojis(), guild_id, emojis);
    context.dispatch_all(
        origin,
        diff.into_changes().map(|change| match change {
            Change::Removed(emoji) => CacheEvent::EmojiDelete(emoji),
            Change::Added(emoji) => CacheEvent::EmojiCreate(emoji),
            Change::Changed { old, new } => CacheEvent::EmojiUpdate { old, new },
        }),
    );
}

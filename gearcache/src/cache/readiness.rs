use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use tracing::{debug, trace};

use gearcache_lib::util::markers::{GuildId, ShardId};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GuildReadiness {
    Unready,
    Ready,
}

impl GuildReadiness {
    pub fn name(&self) -> &str {
        match self {
            GuildReadiness::Unready => "Unready",
            GuildReadiness::Ready => "Ready",
        }
    }
}

/// Which guilds each shard is still waiting on, and which guilds are currently in an outage.
/// The two sets sit behind their own locks so checking one never waits on the other.
#[derive(Default)]
pub struct ReadinessTracker {
    unready: RwLock<HashMap<ShardId, HashSet<GuildId>>>,
    unavailable: RwLock<HashSet<GuildId>>,
}

impl ReadinessTracker {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn mark_unready(&self, shard: ShardId, guild_id: GuildId) {
        trace!("Guild {} is pending on shard {}", guild_id, shard);
        self.unready.write().entry(shard).or_default().insert(guild_id);
    }

    /// Returns if the guild was pending on this shard.
    pub fn mark_ready(&self, shard: ShardId, guild_id: GuildId) -> bool {
        let mut unready = self.unready.write();
        match unready.get_mut(&shard) {
            Some(pending) => pending.remove(&guild_id),
            None => false,
        }
    }

    pub fn is_unready(&self, shard: ShardId, guild_id: GuildId) -> bool {
        self.unready
            .read()
            .get(&shard)
            .map(|pending| pending.contains(&guild_id))
            .unwrap_or(false)
    }

    pub fn readiness(&self, shard: ShardId, guild_id: GuildId) -> GuildReadiness {
        if self.is_unready(shard, guild_id) {
            GuildReadiness::Unready
        } else {
            GuildReadiness::Ready
        }
    }

    pub fn unready_guilds(&self, shard: ShardId) -> Vec<GuildId> {
        self.unready
            .read()
            .get(&shard)
            .map(|pending| pending.iter().copied().collect())
            .unwrap_or_default()
    }

    /// True once the shard has no guilds left to receive.
    pub fn is_shard_ready(&self, shard: ShardId) -> bool {
        self.unready
            .read()
            .get(&shard)
            .map(|pending| pending.is_empty())
            .unwrap_or(true)
    }

    /// Forget everything pending on a shard, used when it starts a fresh session.
    pub fn reset_shard(&self, shard: ShardId) {
        if let Some(pending) = self.unready.write().remove(&shard) {
            if !pending.is_empty() {
                debug!("Shard {} restarted with {} guilds still pending", shard, pending.len());
            }
        }
    }

    pub fn mark_unavailable(&self, guild_id: GuildId) {
        self.unavailable.write().insert(guild_id);
    }

    /// Returns if the guild was unavailable before.
    pub fn mark_available(&self, guild_id: GuildId) -> bool {
        self.unavailable.write().remove(&guild_id)
    }

    pub fn is_unavailable(&self, guild_id: GuildId) -> bool {
        self.unavailable.read().contains(&guild_id)
    }

    pub fn unavailable_guilds(&self) -> Vec<GuildId> {
        self.unavailable.read().iter().copied().collect()
    }

    /// We left the guild, it should not show up in any set anymore.
    pub fn forget(&self, guild_id: GuildId) {
        for pending in self.unready.write().values_mut() {
            pending.remove(&guild_id);
        }
        self.unavailable.write().remove(&guild_id);
    }

    pub fn unready_counts(&self) -> Vec<(ShardId, usize)> {
        self.unready
            .read()
            .iter()
            .map(|(shard, pending)| (*shard, pending.len()))
            .collect()
    }
}

use gearcache_lib::util::markers::{ChannelId, GenericId, GuildId, StageId};

use crate::cache::diff::Comparable;
use crate::cache::store::{Entity, Shared};
use crate::cache::Cache;
use crate::gateway::StageInstancePayload;

#[derive(Clone, Debug, PartialEq)]
pub struct StageInstance {
    pub id: StageId,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub topic: String,
    pub privacy_level: u8,
    pub scheduled_event_id: Option<GenericId>,
}

impl StageInstance {
    pub fn from_payload(stage: StageInstancePayload) -> Self {
        StageInstance {
            id: stage.id,
            guild_id: stage.guild_id,
            channel_id: stage.channel_id,
            topic: stage.topic,
            privacy_level: stage.privacy_level,
            scheduled_event_id: stage.guild_scheduled_event_id,
        }
    }
}

impl Entity for StageInstance {
    type Id = StageId;

    fn id(&self) -> StageId {
        self.id
    }
}

impl Comparable for StageInstance {
    fn is_updated(&self, newer: &Self) -> bool {
        self.topic != newer.topic || self.privacy_level != newer.privacy_level
    }
}

impl Cache {
    /// The live stage in a stage channel, there's at most one.
    pub fn stage_in_channel(&self, channel_id: ChannelId) -> Option<Shared<StageInstance>> {
        self.stage_instances().find_first(|stage| stage.channel_id == channel_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;

    #[test]
    fn stages_are_found_by_channel() {
        let cache = Cache::new(CacheConfig::default());
        cache.stage_instances().put(StageInstance {
            id: StageId::new(1),
            guild_id: GuildId::new(2),
            channel_id: ChannelId::new(3),
            topic: "gears".to_string(),
            privacy_level: 2,
            scheduled_event_id: None,
        });

        assert_eq!(cache.stage_in_channel(ChannelId::new(3)).unwrap().read().topic, "gears");
        assert!(cache.stage_in_channel(ChannelId::new(4)).is_none());
    }
}

use prometheus::{Encoder, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use tracing::warn;

use gearcache_lib::util::markers::ShardId;
use gearcache_lib::util::CacheResult;

use crate::cache::Cache;

pub struct Metrics {
    pub registry: Registry,

    pub gateway_events: IntCounterVec,
    pub notifications: IntCounterVec,

    pub cached_entities: IntGaugeVec,
    pub unready_guilds: IntGaugeVec,
    pub unavailable_guilds: IntGauge,
}

impl Metrics {
    pub fn new() -> CacheResult<Self> {
        let registry = Registry::new_custom(Some("gearcache".to_string()), None)?;

        let gateway_events = IntCounterVec::new(
            Opts::new("gateway_events", "Received gateway events"),
            &["shard", "event"],
        )?;
        registry.register(Box::new(gateway_events.clone()))?;

        let notifications = IntCounterVec::new(
            Opts::new("notifications", "Notifications handed to the event sink"),
            &["event"],
        )?;
        registry.register(Box::new(notifications.clone()))?;

        let cached_entities = IntGaugeVec::new(
            Opts::new("cached_entities", "Cached entities per collection"),
            &["collection"],
        )?;
        registry.register(Box::new(cached_entities.clone()))?;

        let unready_guilds = IntGaugeVec::new(
            Opts::new("unready_guilds", "Guilds each shard is still waiting on"),
            &["shard"],
        )?;
        registry.register(Box::new(unready_guilds.clone()))?;

        let unavailable_guilds = IntGauge::new("unavailable_guilds", "Guilds currently in an outage")?;
        registry.register(Box::new(unavailable_guilds.clone()))?;

        Ok(Metrics {
            registry,
            gateway_events,
            notifications,
            cached_entities,
            unready_guilds,
            unavailable_guilds,
        })
    }

    pub fn count_gateway_event(&self, shard: ShardId, event: &str) {
        match self
            .gateway_events
            .get_metric_with_label_values(&[&shard.to_string(), event])
        {
            Ok(counter) => counter.inc(),
            Err(e) => warn!("Failed to count gateway event {}: {}", event, e),
        }
    }

    pub fn count_notification(&self, event: &str) {
        match self.notifications.get_metric_with_label_values(&[event]) {
            Ok(counter) => counter.inc(),
            Err(e) => warn!("Failed to count notification {}: {}", event, e),
        }
    }

    /// Sizes are only known by walking the cache, so these gauges get refreshed on demand
    /// instead of on every write.
    pub fn recalculate(&self, cache: &Cache) -> CacheResult<()> {
        self.cached_entities.reset();
        for (collection, size) in cache.sizes() {
            self.cached_entities
                .get_metric_with_label_values(&[collection])?
                .set(size as i64);
        }

        self.unready_guilds.reset();
        for (shard, pending) in cache.readiness().unready_counts() {
            self.unready_guilds
                .get_metric_with_label_values(&[&shard.to_string()])?
                .set(pending as i64);
        }

        self.unavailable_guilds
            .set(cache.readiness().unavailable_guilds().len() as i64);
        Ok(())
    }

    /// Everything in the prometheus text format.
    pub fn render(&self) -> CacheResult<String> {
        let mut buffer = vec![];
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode(&metric_families, &mut buffer)?;

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

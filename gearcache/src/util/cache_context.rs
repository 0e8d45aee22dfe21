use std::sync::Arc;

use tracing::trace;

use gearcache_lib::util::CacheResult;

use crate::cache::{Cache, CacheConfig};
use crate::dispatch::{CacheEvent, EventSink, Notification, Origin};
use crate::util::Metrics;

/// Everything a gateway handler needs: the cache itself, metrics and where to send notifications.
pub struct CacheContext {
    pub cache: Cache,
    pub metrics: Metrics,
    sink: Arc<dyn EventSink>,
}

impl CacheContext {
    pub fn new(config: CacheConfig, sink: Arc<dyn EventSink>) -> CacheResult<Self> {
        Ok(CacheContext {
            cache: Cache::new(config),
            metrics: Metrics::new()?,
            sink,
        })
    }

    /// Hand a notification to the sink, tagged with the event that caused it.
    pub fn dispatch(&self, origin: Origin, event: CacheEvent) {
        trace!("Shard {} seq {}: {}", origin.shard, origin.sequence, event.name());
        self.metrics.count_notification(event.name());
        self.sink.dispatch(Notification::new(origin, event));
    }

    pub fn dispatch_all(&self, origin: Origin, events: impl IntoIterator<Item = CacheEvent>) {
        for event in events {
            self.dispatch(origin, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Recorder;

    #[test]
    fn dispatch_reaches_the_sink_and_metrics() {
        let recorder = Arc::new(Recorder::new());
        let context = CacheContext::new(CacheConfig::default(), recorder.clone()).unwrap();

        context.dispatch_all(
            Origin { shard: 1, sequence: 3 },
            vec![CacheEvent::GuildsReady, CacheEvent::GuildsReady],
        );

        assert_eq!(recorder.len(), 2);
        let counted = context
            .metrics
            .notifications
            .get_metric_with_label_values(&["GuildsReady"])
            .unwrap()
            .get();
        assert_eq!(counted, 2);
    }
}

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use gearcache::cache::CacheConfig;
use gearcache::dispatch::Notification;
use gearcache::events::handle_gateway_event;
use gearcache::gateway::Dispatch;
use gearcache::CacheContext;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    info!("GearCache v{} initializing!", VERSION);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("GearCache")
        .build()?;
    let result = runtime.block_on(async_main());

    info!("Replay finished, giving the last tasks 5 seconds to finish up");
    runtime.shutdown_timeout(Duration::from_secs(5));

    result
}

async fn async_main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = CacheConfig::from_env()?;
    let (sender, mut receiver) = unbounded_channel::<Notification>();
    let context = Arc::new(CacheContext::new(config, Arc::new(sender))?);

    // drain notifications on their own task, the handlers never wait on this
    let consumer = tokio::spawn(async move {
        let mut received = 0u64;
        while let Some(notification) = receiver.recv().await {
            debug!(
                "Shard {} seq {}: {}",
                notification.shard,
                notification.sequence,
                notification.event.name()
            );
            received += 1;
        }
        received
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut frames = 0u64;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        frames += 1;
        match Dispatch::from_frame(&line) {
            Ok(Some(dispatch)) => handle_gateway_event(dispatch, &context),
            Ok(None) => {}
            Err(e) => warn!("Skipping frame {}: {}", frames, e),
        }
    }

    context.metrics.recalculate(&context.cache)?;
    info!("Replayed {} frames, final metrics:\n{}", frames, context.metrics.render()?);

    // dropping the context closes the channel so the consumer can finish
    drop(context);
    let received = consumer.await?;
    info!("{} notifications were dispatched", received);

    Ok(())
}

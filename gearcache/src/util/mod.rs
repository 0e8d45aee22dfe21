pub use cache_context::CacheContext;
pub use metrics::Metrics;

pub mod cache_context;
mod metrics;

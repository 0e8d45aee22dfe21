pub use crate::cache::Cache;
pub use crate::util::{CacheContext, Metrics};

pub mod cache;
pub mod dispatch;
pub mod events;
pub mod gateway;
pub mod util;

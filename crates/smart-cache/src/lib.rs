#![doc = include_str!("../README.md")]

mod builder;
mod cache;
mod clock;
mod config;
mod erased;
mod error;
mod event;
#[cfg(feature = "metrics")]
mod metrics;
mod registry;
mod sweeper;
mod traits;

pub use builder::CacheBuilder;
pub use cache::Cache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, DEFAULT_CHECK_INTERVAL, DEFAULT_KEEP_DURATION};
pub use error::{ResolveError, Result};
pub use event::CacheEvent;
#[cfg(feature = "metrics")]
pub use metrics::CacheMetrics;
pub use traits::{SmartInit, StaticInit};

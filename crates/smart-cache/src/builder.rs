use std::sync::Arc;
use std::time::Duration;

use crate::cache::Cache;
use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::event::{CacheEvent, Listener};

/// Builder for configuring a Cache.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use smart_cache::CacheBuilder;
///
/// let cache = CacheBuilder::new()
///     .keep_duration(Duration::from_secs(300))
///     .check_interval(Duration::from_secs(10))
///     .build();
///
/// assert_eq!(cache.config().keep_duration, Duration::from_secs(300));
/// ```
pub struct CacheBuilder {
	config: CacheConfig,
	clock: Option<Arc<dyn Clock>>,
	listener: Option<Listener>,
	debug_log: bool,
}

impl CacheBuilder {
	/// Create a builder with the default configuration.
	pub fn new() -> Self {
		Self {
			config: CacheConfig::default(),
			clock: None,
			listener: None,
			debug_log: false,
		}
	}

	/// Replace the whole timing configuration.
	pub fn config(mut self, config: CacheConfig) -> Self {
		self.config = config;
		self
	}

	/// Set how long new entries survive without being accessed.
	///
	/// Default: 2 minutes
	pub fn keep_duration(mut self, keep: Duration) -> Self {
		assert!(!keep.is_zero(), "keep_duration must be greater than zero");
		self.config.keep_duration = keep;
		self
	}

	/// Set how often the background sweeper runs.
	///
	/// Default: 30 seconds
	pub fn check_interval(mut self, interval: Duration) -> Self {
		assert!(!interval.is_zero(), "check_interval must be greater than zero");
		self.config.check_interval = interval;
		self
	}

	/// Use `clock` for access stamps and expiry checks.
	///
	/// Default: [`SystemClock`]
	pub fn clock(mut self, clock: impl Clock) -> Self {
		self.clock = Some(Arc::new(clock));
		self
	}

	/// Receive a [`CacheEvent`] for every spawn, reuse, eviction and sweeper transition.
	pub fn listener(mut self, listener: impl Fn(&CacheEvent) + Send + Sync + 'static) -> Self {
		self.listener = Some(Arc::new(listener));
		self
	}

	/// Start with debug logging enabled. See [`Cache::set_debug_log`].
	pub fn debug_log(mut self, enabled: bool) -> Self {
		self.debug_log = enabled;
		self
	}

	/// Build the cache with the configured settings.
	pub fn build(self) -> Cache {
		let clock: Arc<dyn Clock> = match self.clock {
			Some(clock) => clock,
			None => Arc::new(SystemClock),
		};
		Cache::from_parts(self.config, clock, self.listener, self.debug_log)
	}
}

impl Default for CacheBuilder {
	fn default() -> Self {
		Self::new()
	}
}

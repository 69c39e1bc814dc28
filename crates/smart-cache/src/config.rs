use std::time::Duration;

/// How long an entry survives without being accessed, unless overridden per resolve.
pub const DEFAULT_KEEP_DURATION: Duration = Duration::from_secs(2 * 60);

/// How often the background sweeper looks for expired entries.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Timing configuration for a [`Cache`](crate::Cache).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
	/// Default keep duration for new entries.
	pub keep_duration: Duration,
	/// Interval between sweep ticks.
	pub check_interval: Duration,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			keep_duration: DEFAULT_KEEP_DURATION,
			check_interval: DEFAULT_CHECK_INTERVAL,
		}
	}
}

impl CacheConfig {
	pub(crate) fn validate(&self) {
		assert!(!self.keep_duration.is_zero(), "keep_duration must be greater than zero");
		assert!(!self.check_interval.is_zero(), "check_interval must be greater than zero");
	}
}

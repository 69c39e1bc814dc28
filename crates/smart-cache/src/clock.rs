//! Time sources used for expiry checks.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Source of "now" for access stamps and expiry checks.
///
/// The background sweeper always waits in real time; only the expiry
/// arithmetic goes through the clock.
pub trait Clock: Send + Sync + 'static {
	fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Instant {
		Instant::now()
	}
}

/// Clock that only moves when told to.
///
/// Share it with the cache through an `Arc` and call [`advance`](Self::advance)
/// to simulate elapsed time.
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use smart_cache::{Cache, Clock, ManualClock};
///
/// let clock = Arc::new(ManualClock::new());
/// let cache = Cache::builder().clock(clock.clone()).build();
///
/// let before = clock.now();
/// clock.advance(Duration::from_secs(90));
/// assert_eq!(clock.now() - before, Duration::from_secs(90));
/// # drop(cache);
/// ```
#[derive(Debug)]
pub struct ManualClock {
	base: Instant,
	offset: Mutex<Duration>,
}

impl ManualClock {
	pub fn new() -> Self {
		Self {
			base: Instant::now(),
			offset: Mutex::new(Duration::ZERO),
		}
	}

	/// Move the clock forward by `by`.
	pub fn advance(&self, by: Duration) {
		*self.offset.lock() += by;
	}

	/// Total time advanced since creation.
	pub fn elapsed(&self) -> Duration {
		*self.offset.lock()
	}
}

impl Default for ManualClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Instant {
		self.base + *self.offset.lock()
	}
}

impl<C: Clock> Clock for std::sync::Arc<C> {
	fn now(&self) -> Instant {
		(**self).now()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_manual_clock_only_moves_on_advance() {
		let clock = ManualClock::new();
		let start = clock.now();
		assert_eq!(clock.now(), start);

		clock.advance(Duration::from_secs(151));
		assert_eq!(clock.now() - start, Duration::from_secs(151));
		assert_eq!(clock.elapsed(), Duration::from_secs(151));
	}

	#[test]
	fn test_system_clock_is_monotonic() {
		let clock = SystemClock;
		let a = clock.now();
		let b = clock.now();
		assert!(b >= a);
	}
}

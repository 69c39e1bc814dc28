//! Cache activity metrics.

/// Counters describing what a cache has been doing.
///
/// # Example
///
/// ```
/// use smart_cache::Cache;
///
/// let cache = Cache::new();
/// cache.resolve_with(|| 1u32);
/// cache.resolve_with(|| 2u32);
///
/// let metrics = cache.metrics();
/// assert_eq!(metrics.spawns, 1);
/// assert_eq!(metrics.hits, 1);
/// println!("Hit rate: {:.2}%", metrics.hit_rate() * 100.0);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
	/// Resolves served by an existing entry.
	pub hits: u64,
	/// Resolves that found no entry, whether or not construction succeeded.
	pub misses: u64,
	/// Instances constructed and stored.
	pub spawns: u64,
	/// Entries dropped by the sweeper after their keep duration ran out.
	pub evictions: u64,
	/// Entries dropped through `remove()`.
	pub removals: u64,
	/// Sweep ticks performed, background or manual.
	pub sweeps: u64,
	/// Current number of entries.
	pub entry_count: usize,
}

impl CacheMetrics {
	/// Ratio of hits to all resolves, between 0.0 and 1.0.
	///
	/// Returns 0.0 if nothing has been resolved yet.
	pub fn hit_rate(&self) -> f64 {
		let total = self.hits + self.misses;
		if total == 0 {
			0.0
		} else {
			self.hits as f64 / total as f64
		}
	}

	/// Total number of resolve calls (hits + misses).
	pub fn total_resolves(&self) -> u64 {
		self.hits + self.misses
	}
}

use std::any::TypeId;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "metrics")]
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::builder::CacheBuilder;
use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::erased::Entry;
use crate::error::{ResolveError, Result};
use crate::event::{CacheEvent, Listener};
#[cfg(feature = "metrics")]
use crate::metrics::CacheMetrics;
use crate::registry::Registry;
use crate::sweeper::{Signal, Sweeper};
use crate::traits::{SmartInit, StaticInit};

static SHARED: Lazy<Cache> = Lazy::new(Cache::new);

/// Thread-safe, type-keyed instance cache.
///
/// The cache holds at most one instance per concrete type. Resolving a type
/// hands out the cached instance if there is one, and otherwise builds it from
/// an explicit factory, a registered strategy, or one of the capability traits
/// ([`SmartInit`], [`StaticInit`]).
///
/// # Expiry
///
/// Every entry remembers when it was last resolved and how long it may sit
/// idle (its keep duration, 2 minutes unless overridden). A background
/// sweeper thread wakes every check interval (30 seconds by default), drops
/// entries that have been idle for longer than their keep duration, and
/// exits once the cache is empty. The next resolve starts it again.
///
/// An entry that has expired but not yet been swept is still handed out (and
/// refreshed) by resolve.
///
/// # Locking
///
/// Constructors run without the cache's state lock held, so a constructor may
/// resolve its own dependencies from the same cache. Concurrent misses on one
/// type wait for each other and construct at most once. A constructor that
/// resolves its own type, directly or through a cycle, deadlocks.
///
/// Event listeners run under the state lock and must not call back into the
/// cache.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use smart_cache::Cache;
///
/// struct Counter {
///     value: u32,
/// }
///
/// let cache = Cache::new();
/// cache.register(|| Counter { value: 1 });
///
/// let first = cache.resolve::<Counter>().unwrap();
/// let second = cache.resolve::<Counter>().unwrap();
/// assert_eq!(first.value, 1);
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub struct Cache {
	inner: Arc<Inner>,
}

pub(crate) struct Inner {
	config: CacheConfig,
	clock: Arc<dyn Clock>,
	registry: Registry,
	state: Mutex<State>,
	listener: Option<Listener>,
	debug_log: AtomicBool,
	/// Metrics: resolves served from an existing entry
	#[cfg(feature = "metrics")]
	hits: AtomicU64,
	/// Metrics: resolves that found no entry
	#[cfg(feature = "metrics")]
	misses: AtomicU64,
	/// Metrics: instances constructed
	#[cfg(feature = "metrics")]
	spawns: AtomicU64,
	/// Metrics: entries expired by the sweeper
	#[cfg(feature = "metrics")]
	evictions: AtomicU64,
	/// Metrics: explicit removals
	#[cfg(feature = "metrics")]
	removals: AtomicU64,
	/// Metrics: sweep ticks
	#[cfg(feature = "metrics")]
	sweeps: AtomicU64,
}

/// Everything guarded by the state lock.
///
/// `sweeper` is `Some` exactly when `entries` is non-empty.
struct State {
	entries: HashMap<TypeId, Entry, ahash::RandomState>,
	/// Per-type build slots for misses currently constructing
	building: HashMap<TypeId, Arc<Mutex<()>>, ahash::RandomState>,
	sweeper: Option<Sweeper>,
}

impl Cache {
	/// Create a cache with the default configuration: entries are kept for
	/// 2 minutes after their last access and swept every 30 seconds.
	pub fn new() -> Self {
		CacheBuilder::new().build()
	}

	/// Create a cache with custom timing.
	///
	/// # Panics
	///
	/// Panics if either duration in `config` is zero.
	pub fn with_config(config: CacheConfig) -> Self {
		CacheBuilder::new().config(config).build()
	}

	/// Start configuring a cache.
	pub fn builder() -> CacheBuilder {
		CacheBuilder::new()
	}

	/// The process-wide cache, created on first use with the default configuration.
	///
	/// This is a convenience for code that wants ambient access; caches
	/// created with [`Cache::new`] are fully independent of it.
	pub fn shared() -> &'static Cache {
		&SHARED
	}

	pub(crate) fn from_parts(
		config: CacheConfig,
		clock: Arc<dyn Clock>,
		listener: Option<Listener>,
		debug_log: bool,
	) -> Self {
		config.validate();
		Self {
			inner: Arc::new(Inner {
				config,
				clock,
				registry: Registry::new(),
				state: Mutex::new(State {
					entries: HashMap::default(),
					building: HashMap::default(),
					sweeper: None,
				}),
				listener,
				debug_log: AtomicBool::new(debug_log),
				#[cfg(feature = "metrics")]
				hits: AtomicU64::new(0),
				#[cfg(feature = "metrics")]
				misses: AtomicU64::new(0),
				#[cfg(feature = "metrics")]
				spawns: AtomicU64::new(0),
				#[cfg(feature = "metrics")]
				evictions: AtomicU64::new(0),
				#[cfg(feature = "metrics")]
				removals: AtomicU64::new(0),
				#[cfg(feature = "metrics")]
				sweeps: AtomicU64::new(0),
			}),
		}
	}

	/// Register how to build a `T`.
	///
	/// A later registration for the same type replaces the earlier one.
	/// Registering does not touch an instance that is already cached.
	pub fn register<T, F>(&self, constructor: F)
	where
		T: Send + Sync + 'static,
		F: Fn() -> T + Send + Sync + 'static,
	{
		let replaced = self.inner.registry.register(constructor);
		if replaced {
			tracing::debug!(type_name = std::any::type_name::<T>(), "replaced construction strategy");
		}
	}

	/// Forget the registered strategy for `T`. Returns true if there was one.
	pub fn unregister<T: 'static>(&self) -> bool {
		self.inner.registry.unregister::<T>()
	}

	/// Whether a strategy is registered for `T`.
	pub fn is_registered<T: 'static>(&self) -> bool {
		self.inner.registry.contains::<T>()
	}

	/// Resolve a `T` using its registered strategy.
	///
	/// # Errors
	///
	/// Returns [`ResolveError::MissingStrategy`] if `T` is not cached and no
	/// strategy is registered for it. Nothing is stored in that case.
	pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
		self.inner.resolve(None, || {
			self.inner.registry.construct::<T>().ok_or_else(ResolveError::missing::<T>)
		})
	}

	/// Like [`resolve`](Self::resolve), and set the entry's keep duration to `keep`.
	///
	/// The override applies to an already cached entry as well.
	pub fn resolve_keep<T: Send + Sync + 'static>(&self, keep: Duration) -> Result<Arc<T>> {
		self.inner.resolve(Some(keep), || {
			self.inner.registry.construct::<T>().ok_or_else(ResolveError::missing::<T>)
		})
	}

	/// Resolve a `T`, building it with `factory` if it is not cached.
	///
	/// The factory takes precedence over any registered strategy and is only
	/// called on a miss.
	pub fn resolve_with<T, F>(&self, factory: F) -> Arc<T>
	where
		T: Send + Sync + 'static,
		F: FnOnce() -> T,
	{
		let Ok(value) = self.inner.resolve::<T, Infallible, _>(None, || Ok(factory()));
		value
	}

	/// Like [`resolve_with`](Self::resolve_with), and set the entry's keep duration to `keep`.
	pub fn resolve_keep_with<T, F>(&self, keep: Duration, factory: F) -> Arc<T>
	where
		T: Send + Sync + 'static,
		F: FnOnce() -> T,
	{
		let Ok(value) = self.inner.resolve::<T, Infallible, _>(Some(keep), || Ok(factory()));
		value
	}

	/// Resolve a `T`, preferring a registered strategy and falling back to [`SmartInit::init`].
	pub fn resolve_default<T>(&self, keep: Option<Duration>) -> Arc<T>
	where
		T: SmartInit + Send + Sync + 'static,
	{
		let Ok(value) = self.inner.resolve::<T, Infallible, _>(keep, || {
			Ok(self.inner.registry.construct::<T>().unwrap_or_else(T::init))
		});
		value
	}

	/// Resolve a `T`, preferring a registered strategy and falling back to [`StaticInit::instance`].
	pub fn resolve_instance<T>(&self, keep: Option<Duration>) -> Arc<T>
	where
		T: StaticInit + Send + Sync + 'static,
	{
		let Ok(value) = self.inner.resolve::<T, Infallible, _>(keep, || {
			Ok(self.inner.registry.construct::<T>().unwrap_or_else(T::instance))
		});
		value
	}

	/// Drop the cached `T`, if any, and return it.
	///
	/// Stops the sweeper when this empties the cache.
	pub fn remove<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
		let mut state = self.inner.state.lock();
		let entry = state.entries.remove(&TypeId::of::<T>())?;

		#[cfg(feature = "metrics")]
		self.inner.removals.fetch_add(1, Ordering::Relaxed);
		if self.debug_log() {
			tracing::debug!(type_name = entry.type_name(), "removed cached instance");
		}
		self.inner.emit(CacheEvent::Removed {
			type_name: entry.type_name(),
		});

		if state.entries.is_empty() {
			self.inner.stop_sweeper(&mut state);
		}
		entry.value_arc::<T>()
	}

	/// Run one sweep now: drop every expired entry and stop the sweeper if
	/// nothing is left. Returns the number of entries dropped.
	///
	/// The background sweeper calls this on its own; calling it directly is
	/// useful with a [`ManualClock`](crate::ManualClock).
	pub fn sweep(&self) -> usize {
		let mut state = self.inner.state.lock();
		self.inner.purge_expired(&mut state)
	}

	/// Check if an instance of `T` is cached, without refreshing it.
	pub fn contains<T: 'static>(&self) -> bool {
		self.inner.state.lock().entries.contains_key(&TypeId::of::<T>())
	}

	/// Keep duration of the cached `T`, if any.
	pub fn keep_duration_of<T: 'static>(&self) -> Option<Duration> {
		self.inner.state.lock().entries.get(&TypeId::of::<T>()).map(Entry::keep_duration)
	}

	/// Number of cached instances.
	pub fn len(&self) -> usize {
		self.inner.state.lock().entries.len()
	}

	/// Check if cache is empty.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Whether the background sweeper is currently running.
	pub fn is_sweeping(&self) -> bool {
		self.inner.state.lock().sweeper.is_some()
	}

	/// The configuration this cache was built with.
	pub fn config(&self) -> CacheConfig {
		self.inner.config
	}

	/// Turn debug logging of spawns, evictions and sweeper transitions on or off.
	///
	/// On [`Cache::shared`] this is the process-wide switch.
	pub fn set_debug_log(&self, enabled: bool) {
		self.inner.debug_log.store(enabled, Ordering::Relaxed);
	}

	/// Whether debug logging is on.
	pub fn debug_log(&self) -> bool {
		self.inner.debug_log()
	}

	/// Snapshot of the cache's activity counters.
	#[cfg(feature = "metrics")]
	pub fn metrics(&self) -> CacheMetrics {
		CacheMetrics {
			hits: self.inner.hits.load(Ordering::Relaxed),
			misses: self.inner.misses.load(Ordering::Relaxed),
			spawns: self.inner.spawns.load(Ordering::Relaxed),
			evictions: self.inner.evictions.load(Ordering::Relaxed),
			removals: self.inner.removals.load(Ordering::Relaxed),
			sweeps: self.inner.sweeps.load(Ordering::Relaxed),
			entry_count: self.len(),
		}
	}
}

impl Default for Cache {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Cache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("Cache")
			.field("config", &self.inner.config)
			.field("entries", &state.entries.len())
			.field("sweeping", &state.sweeper.is_some())
			.finish()
	}
}

impl Inner {
	fn debug_log(&self) -> bool {
		self.debug_log.load(Ordering::Relaxed)
	}

	fn emit(&self, event: CacheEvent) {
		if let Some(listener) = &self.listener {
			listener(&event);
		}
	}

	/// Look up the entry for `T`, building it with `build` on a miss, then
	/// refresh it and make sure the sweeper runs.
	///
	/// The state lock is released while `build` runs, so a constructor may
	/// resolve other types from this cache. Misses on the same type queue on
	/// that type's build slot and construct at most once between them.
	fn resolve<T, E, F>(self: &Arc<Self>, keep: Option<Duration>, build: F) -> Result<Arc<T>, E>
	where
		T: Send + Sync + 'static,
		F: FnOnce() -> Result<T, E>,
	{
		let type_id = TypeId::of::<T>();
		let type_name = std::any::type_name::<T>();

		let slot = {
			let mut state = self.state.lock();
			if let Some(value) = self.reuse::<T>(&mut state, keep) {
				#[cfg(feature = "metrics")]
				self.hits.fetch_add(1, Ordering::Relaxed);
				self.ensure_sweeper(&mut state);
				return Ok(value);
			}
			#[cfg(feature = "metrics")]
			self.misses.fetch_add(1, Ordering::Relaxed);
			Arc::clone(state.building.entry(type_id).or_default())
		};

		let _building = slot.lock();

		// Someone else may have built it while we queued.
		{
			let mut state = self.state.lock();
			if let Some(value) = self.reuse::<T>(&mut state, keep) {
				Self::release_slot(&mut state, type_id, &slot);
				self.ensure_sweeper(&mut state);
				return Ok(value);
			}
		}

		let built = build();

		let mut state = self.state.lock();
		Self::release_slot(&mut state, type_id, &slot);
		let value = built?;

		let now = self.clock.now();
		let mut entry = Entry::new(value, now, self.config.keep_duration);
		if let Some(keep) = keep {
			entry.set_keep_duration(keep);
		}
		debug_assert_eq!(entry.type_id(), type_id);
		let Some(value) = entry.value_arc::<T>() else {
			unreachable!("cache entry for `{type_name}` holds a different type");
		};
		state.entries.insert(type_id, entry);

		#[cfg(feature = "metrics")]
		self.spawns.fetch_add(1, Ordering::Relaxed);
		if self.debug_log() {
			tracing::debug!(type_name, "spawned cached instance");
		}
		self.emit(CacheEvent::Spawned {
			type_name,
		});

		self.ensure_sweeper(&mut state);
		Ok(value)
	}

	/// Refresh and hand out the cached `T`, if there is one.
	fn reuse<T: Send + Sync + 'static>(&self, state: &mut State, keep: Option<Duration>) -> Option<Arc<T>> {
		let type_name = std::any::type_name::<T>();
		let entry = state.entries.get_mut(&TypeId::of::<T>())?;

		if let Some(keep) = keep {
			entry.set_keep_duration(keep);
		}
		entry.touch(self.clock.now());

		let Some(value) = entry.value_arc::<T>() else {
			unreachable!("cache entry for `{type_name}` holds a different type");
		};
		self.emit(CacheEvent::Reused {
			type_name,
		});
		Some(value)
	}

	/// Drop the build slot for `type_id` once the last resolve queued on it is done.
	fn release_slot(state: &mut State, type_id: TypeId, slot: &Arc<Mutex<()>>) {
		// Clones are only taken under the state lock: the map's plus ours means nobody else waits.
		if Arc::strong_count(slot) == 2 {
			state.building.remove(&type_id);
		}
	}

	fn ensure_sweeper(self: &Arc<Self>, state: &mut State) {
		if state.sweeper.is_some() {
			return;
		}
		match Sweeper::spawn(Arc::downgrade(self), self.config.check_interval) {
			Ok(sweeper) => {
				state.sweeper = Some(sweeper);
				if self.debug_log() {
					tracing::debug!(
						check_interval_ms = self.config.check_interval.as_millis() as u64,
						"sweeper started"
					);
				}
				self.emit(CacheEvent::SweeperStarted);
			}
			// Retried on the next resolve.
			Err(err) => tracing::warn!(error = %err, "failed to start sweeper thread"),
		}
	}

	fn stop_sweeper(&self, state: &mut State) {
		// Dropping the handle signals the thread.
		if state.sweeper.take().is_none() {
			return;
		}
		if self.debug_log() {
			tracing::debug!("sweeper stopped");
		}
		self.emit(CacheEvent::SweeperStopped);
	}

	/// Drop expired entries and stop the sweeper if the cache is left empty.
	fn purge_expired(&self, state: &mut State) -> usize {
		let now = self.clock.now();
		let before = state.entries.len();
		let debug_log = self.debug_log();

		state.entries.retain(|_, entry| {
			if !entry.is_expired(now) {
				return true;
			}
			if debug_log {
				tracing::debug!(
					type_name = entry.type_name(),
					idle_ms = now.saturating_duration_since(entry.last_access()).as_millis() as u64,
					"killed expired cached instance"
				);
			}
			self.emit(CacheEvent::Evicted {
				type_name: entry.type_name(),
			});
			false
		});

		let removed = before - state.entries.len();
		#[cfg(feature = "metrics")]
		{
			self.sweeps.fetch_add(1, Ordering::Relaxed);
			self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
		}
		tracing::trace!(removed, remaining = state.entries.len(), "sweep tick");

		if state.entries.is_empty() {
			self.stop_sweeper(state);
		}
		removed
	}

	/// One background tick. Returns false when the calling thread should exit.
	pub(crate) fn sweep_tick(&self, signal: &Signal) -> bool {
		let mut state = self.state.lock();
		// Replaced or stopped while we waited for the lock
		if signal.is_stopped() {
			return false;
		}
		self.purge_expired(&mut state);
		state.sweeper.is_some()
	}
}

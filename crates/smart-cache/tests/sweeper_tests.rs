//! Background sweeper behaviour in real time, with short intervals.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use smart_cache::{Cache, CacheEvent};

const KEEP: Duration = Duration::from_millis(40);
const CHECK: Duration = Duration::from_millis(20);

fn fast_cache() -> (Cache, Arc<AtomicUsize>, Arc<AtomicUsize>) {
	let evicted = Arc::new(AtomicUsize::new(0));
	let stopped = Arc::new(AtomicUsize::new(0));
	let (e, s) = (evicted.clone(), stopped.clone());
	let cache = Cache::builder()
		.keep_duration(KEEP)
		.check_interval(CHECK)
		.listener(move |event: &CacheEvent| match event {
			CacheEvent::Evicted {
				..
			} => {
				e.fetch_add(1, Ordering::SeqCst);
			}
			CacheEvent::SweeperStopped => {
				s.fetch_add(1, Ordering::SeqCst);
			}
			_ => {}
		})
		.build();
	(cache, evicted, stopped)
}

#[test]
fn test_background_sweep_expires_entries() {
	let (cache, evicted, stopped) = fast_cache();
	let calls = Arc::new(AtomicUsize::new(0));
	{
		let calls = calls.clone();
		cache.register(move || {
			calls.fetch_add(1, Ordering::SeqCst);
			String::from("value")
		});
	}

	cache.resolve::<String>().unwrap();
	assert!(cache.is_sweeping());

	thread::sleep(KEEP + CHECK * 10);
	assert!(cache.is_empty());
	assert!(!cache.is_sweeping());
	assert_eq!(evicted.load(Ordering::SeqCst), 1);
	assert_eq!(stopped.load(Ordering::SeqCst), 1);

	cache.resolve::<String>().unwrap();
	assert_eq!(calls.load(Ordering::SeqCst), 2);
	assert!(cache.is_sweeping());
}

#[test]
fn test_idle_cache_stays_quiet() {
	let (cache, evicted, stopped) = fast_cache();

	cache.resolve_with(|| 1u32);
	thread::sleep(KEEP + CHECK * 10);
	assert_eq!(evicted.load(Ordering::SeqCst), 1);
	assert_eq!(stopped.load(Ordering::SeqCst), 1);

	// No sweeper, no further events.
	thread::sleep(CHECK * 10);
	assert_eq!(evicted.load(Ordering::SeqCst), 1);
	assert_eq!(stopped.load(Ordering::SeqCst), 1);
	assert!(!cache.is_sweeping());
}

#[test]
fn test_accessed_entry_survives() {
	let (cache, evicted, _) = fast_cache();
	cache.resolve_keep_with(Duration::from_secs(60), || 1u32);

	thread::sleep(CHECK * 5);
	assert!(cache.contains::<u32>());
	assert!(cache.is_sweeping());
	assert_eq!(evicted.load(Ordering::SeqCst), 0);
}

#[test]
fn test_dropping_cache_with_running_sweeper() {
	let (cache, _, _) = fast_cache();
	cache.resolve_keep_with(Duration::from_secs(60), || 1u32);
	assert!(cache.is_sweeping());
	drop(cache);

	// The sweeper thread must not keep anything alive or panic once the cache is gone.
	thread::sleep(CHECK * 3);
}

#[test]
fn test_concurrent_resolves_and_sweeps() {
	let cache = Arc::new(
		Cache::builder()
			.keep_duration(Duration::from_millis(5))
			.check_interval(Duration::from_millis(2))
			.build(),
	);

	let handles: Vec<_> = (0..4)
		.map(|t| {
			let cache = cache.clone();
			thread::spawn(move || {
				for i in 0..200u32 {
					match (t + i) % 3 {
						0 => assert_eq!(*cache.resolve_with(|| 7u32), 7),
						1 => assert_eq!(*cache.resolve_with(|| 9u64), 9),
						_ => assert_eq!(cache.resolve_with(|| String::from("s")).as_str(), "s"),
					}
					if i % 50 == 0 {
						thread::sleep(Duration::from_millis(3));
					}
				}
			})
		})
		.collect();

	for handle in handles {
		handle.join().unwrap();
	}

	thread::sleep(Duration::from_millis(300));
	assert!(cache.is_empty());
	assert!(!cache.is_sweeping());
}

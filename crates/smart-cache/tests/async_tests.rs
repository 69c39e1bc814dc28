//! Async usage patterns.

use std::sync::Arc;
use std::time::Duration;

use smart_cache::Cache;

#[derive(Debug, PartialEq)]
struct Client {
	endpoint: String,
}

#[tokio::test]
async fn test_arc_held_across_await() {
	let cache = Arc::new(Cache::new());
	cache.register(|| Client {
		endpoint: "http://localhost".to_string(),
	});

	// Resolve returns an Arc, the lock is already released
	let client = cache.resolve::<Client>().unwrap();
	tokio::time::sleep(Duration::from_millis(1)).await;
	assert_eq!(client.endpoint, "http://localhost");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_async_tasks_share_instance() {
	let cache = Arc::new(Cache::new());
	cache.register(|| Client {
		endpoint: "http://shared".to_string(),
	});

	let tasks: Vec<_> = (0..16)
		.map(|_| {
			let cache = cache.clone();
			tokio::spawn(async move {
				let client = cache.resolve::<Client>().unwrap();
				tokio::time::sleep(Duration::from_micros(10)).await;
				client
			})
		})
		.collect();

	let mut clients = Vec::new();
	for task in tasks {
		clients.push(task.await.unwrap());
	}

	assert!(clients.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
	assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_expiry_observed_from_async_code() {
	let cache = Cache::builder()
		.keep_duration(Duration::from_millis(20))
		.check_interval(Duration::from_millis(10))
		.build();

	let first = cache.resolve_with(|| Client {
		endpoint: "a".to_string(),
	});
	tokio::time::sleep(Duration::from_millis(150)).await;

	assert!(!cache.is_sweeping());
	let second = cache.resolve_with(|| Client {
		endpoint: "b".to_string(),
	});
	assert!(!Arc::ptr_eq(&first, &second));
	assert_eq!(second.endpoint, "b");
}

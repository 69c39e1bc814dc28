use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use smart_cache::{Cache, ManualClock};

/// A handful of distinct types so generated operations can target them by index.
#[derive(Debug)]
struct T0;
#[derive(Debug)]
struct T1;
#[derive(Debug)]
struct T2;
#[derive(Debug)]
struct T3;

fn resolve_keep(cache: &Cache, which: u8, keep: Duration) {
	match which {
		0 => drop(cache.resolve_keep_with(keep, || T0)),
		1 => drop(cache.resolve_keep_with(keep, || T1)),
		2 => drop(cache.resolve_keep_with(keep, || T2)),
		_ => drop(cache.resolve_keep_with(keep, || T3)),
	}
}

fn contains(cache: &Cache, which: u8) -> bool {
	match which {
		0 => cache.contains::<T0>(),
		1 => cache.contains::<T1>(),
		2 => cache.contains::<T2>(),
		_ => cache.contains::<T3>(),
	}
}

#[derive(Debug, Clone)]
enum Op {
	Resolve { which: u8, keep_secs: u64 },
	Advance { secs: u64 },
	Sweep,
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![
		(0u8..4, 1u64..300).prop_map(|(which, keep_secs)| Op::Resolve {
			which,
			keep_secs
		}),
		(0u64..200).prop_map(|secs| Op::Advance {
			secs
		}),
		Just(Op::Sweep),
	]
}

proptest! {
	#[test]
	fn test_sweeper_running_iff_entries(ops in prop::collection::vec(op(), 1..60)) {
		let clock = Arc::new(ManualClock::new());
		let cache = Cache::builder().clock(clock.clone()).build();

		for op in ops {
			match op {
				Op::Resolve { which, keep_secs } => resolve_keep(&cache, which, Duration::from_secs(keep_secs)),
				Op::Advance { secs } => clock.advance(Duration::from_secs(secs)),
				Op::Sweep => {
					cache.sweep();
				}
			}
			prop_assert_eq!(cache.is_sweeping(), !cache.is_empty());
			prop_assert!(cache.len() <= 4);
		}
	}

	#[test]
	fn test_sweep_matches_model(ops in prop::collection::vec(op(), 1..60)) {
		let clock = Arc::new(ManualClock::new());
		let cache = Cache::builder().clock(clock.clone()).build();
		// Model: per type, (last access offset, keep duration)
		let mut model: [Option<(Duration, Duration)>; 4] = [None; 4];

		for op in ops {
			match op {
				Op::Resolve { which, keep_secs } => {
					let keep = Duration::from_secs(keep_secs);
					resolve_keep(&cache, which, keep);
					model[which as usize] = Some((clock.elapsed(), keep));
				}
				Op::Advance { secs } => clock.advance(Duration::from_secs(secs)),
				Op::Sweep => {
					let now = clock.elapsed();
					let mut expected = 0;
					for slot in model.iter_mut() {
						if let Some((last, keep)) = *slot && now > last + keep {
							*slot = None;
							expected += 1;
						}
					}
					prop_assert_eq!(cache.sweep(), expected);
				}
			}
			for which in 0..4u8 {
				prop_assert_eq!(contains(&cache, which), model[which as usize].is_some());
			}
		}
	}
}

//! Structured notifications emitted by the cache.

use std::sync::Arc;

/// Something that happened inside a [`Cache`](crate::Cache).
///
/// Delivered synchronously to the listener installed with
/// [`CacheBuilder::listener`](crate::CacheBuilder::listener). Listeners run
/// while the cache's state lock is held and must not call back into the cache.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
	/// A new instance was constructed and stored.
	Spawned { type_name: &'static str },
	/// An existing instance was handed out again.
	Reused { type_name: &'static str },
	/// The sweeper dropped an instance whose keep duration ran out.
	Evicted { type_name: &'static str },
	/// An instance was dropped through [`Cache::remove`](crate::Cache::remove).
	Removed { type_name: &'static str },
	/// The background sweeper was started.
	SweeperStarted,
	/// The background sweeper stopped because the cache became empty.
	SweeperStopped,
}

impl CacheEvent {
	/// Type name carried by the event, if any.
	pub fn type_name(&self) -> Option<&'static str> {
		match self {
			CacheEvent::Spawned {
				type_name,
			}
			| CacheEvent::Reused {
				type_name,
			}
			| CacheEvent::Evicted {
				type_name,
			}
			| CacheEvent::Removed {
				type_name,
			} => Some(type_name),
			CacheEvent::SweeperStarted | CacheEvent::SweeperStopped => None,
		}
	}
}

pub(crate) type Listener = Arc<dyn Fn(&CacheEvent) + Send + Sync>;

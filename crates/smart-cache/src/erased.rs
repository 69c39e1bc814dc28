use std::any::{Any, TypeId};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Type-erased cache entry with its expiry bookkeeping.
///
/// Stores the value as `Arc<dyn Any>` so every resolve can hand out a cheap
/// clone of the same instance, and the cache can hold many value types in a
/// single map keyed by `TypeId`.
pub(crate) struct Entry {
	/// Type-erased value wrapped in Arc for cheap sharing across threads.
	value: Arc<dyn Any + Send + Sync>,
	/// TypeId of the concrete value type
	type_id: TypeId,
	/// `std::any::type_name` of the stored value, for logs and events.
	type_name: &'static str,
	/// Last time this entry was handed out. Never moves backwards.
	last_access: Instant,
	/// How long the entry survives without being accessed.
	keep_duration: Duration,
}

impl Entry {
	/// Create a new entry from a concrete value.
	pub fn new<T: Send + Sync + 'static>(value: T, now: Instant, keep_duration: Duration) -> Self {
		Self {
			value: Arc::new(value),
			type_id: TypeId::of::<T>(),
			type_name: std::any::type_name::<T>(),
			last_access: now,
			keep_duration,
		}
	}

	/// Clone the Arc without cloning the underlying value.
	///
	/// Returns None if the type doesn't match.
	pub fn value_arc<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
		// Clone the Arc (cheap reference count bump)
		let arc_any = Arc::clone(&self.value);
		// Downcast to concrete type
		Arc::downcast::<T>(arc_any).ok()
	}

	/// TypeId of the stored value.
	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	pub fn last_access(&self) -> Instant {
		self.last_access
	}

	pub fn keep_duration(&self) -> Duration {
		self.keep_duration
	}

	pub fn set_keep_duration(&mut self, keep_duration: Duration) {
		self.keep_duration = keep_duration;
	}

	/// Record an access. A clock that reports an earlier instant is ignored.
	pub fn touch(&mut self, now: Instant) {
		if now > self.last_access {
			self.last_access = now;
		}
	}

	/// An entry expires once `now` is strictly past `last_access + keep_duration`.
	pub fn is_expired(&self, now: Instant) -> bool {
		match self.last_access.checked_add(self.keep_duration) {
			Some(deadline) => now > deadline,
			// Deadline beyond what Instant can represent: never expires.
			None => false,
		}
	}
}

impl std::fmt::Debug for Entry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Entry")
			.field("type_name", &self.type_name)
			.field("last_access", &self.last_access)
			.field("keep_duration", &self.keep_duration)
			.field("value", &"<Arc<dyn Any>>")
			.finish()
	}
}

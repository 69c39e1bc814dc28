use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

type Constructor = Arc<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

/// Registered construction strategies, one per type.
///
/// Registering a second strategy for the same type replaces the first.
#[derive(Default)]
pub(crate) struct Registry {
	strategies: RwLock<HashMap<TypeId, Constructor, ahash::RandomState>>,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Store `constructor` for `T`. Returns true if an earlier strategy was replaced.
	pub fn register<T, F>(&self, constructor: F) -> bool
	where
		T: Send + Sync + 'static,
		F: Fn() -> T + Send + Sync + 'static,
	{
		let erased: Constructor = Arc::new(move || Box::new(constructor()) as Box<dyn Any + Send + Sync>);
		self.strategies.write().insert(TypeId::of::<T>(), erased).is_some()
	}

	pub fn unregister<T: 'static>(&self) -> bool {
		self.strategies.write().remove(&TypeId::of::<T>()).is_some()
	}

	pub fn contains<T: 'static>(&self) -> bool {
		self.strategies.read().contains_key(&TypeId::of::<T>())
	}

	/// Build a `T` from its registered strategy, if there is one.
	///
	/// The registry lock is released before the constructor runs.
	pub fn construct<T: Send + Sync + 'static>(&self) -> Option<T> {
		let constructor = self.strategies.read().get(&TypeId::of::<T>()).cloned()?;
		let value = constructor();
		match value.downcast::<T>() {
			Ok(value) => Some(*value),
			Err(_) => unreachable!(
				"strategy registered for `{}` produced a different type",
				std::any::type_name::<T>()
			),
		}
	}

	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.strategies.read().len()
	}
}

//! Error types for resolve operations.

use thiserror::Error;

/// Errors returned by [`Cache::resolve`](crate::Cache::resolve) and
/// [`Cache::resolve_keep`](crate::Cache::resolve_keep).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
	/// Nothing knows how to build the requested type: no explicit factory,
	/// no registered strategy.
	#[error("no construction strategy for `{type_name}`; register one first")]
	MissingStrategy { type_name: &'static str },
}

impl ResolveError {
	pub(crate) fn missing<T>() -> Self {
		Self::MissingStrategy {
			type_name: std::any::type_name::<T>(),
		}
	}
}

/// Result alias for resolve operations.
pub type Result<T, E = ResolveError> = std::result::Result<T, E>;

/// Capability for types that can be built with no arguments.
///
/// Every `Default` type gets this for free. Used by
/// [`Cache::resolve_default`](crate::Cache::resolve_default) when no
/// strategy is registered for the type.
///
/// # Example
///
/// ```
/// use smart_cache::{Cache, SmartInit};
///
/// #[derive(Default)]
/// struct Settings {
///     retries: u32,
/// }
///
/// let cache = Cache::new();
/// let settings = cache.resolve_default::<Settings>(None);
/// assert_eq!(settings.retries, 0);
/// assert_eq!(Settings::init().retries, 0);
/// ```
pub trait SmartInit: Sized {
	/// Build a fresh instance.
	fn init() -> Self;
}

impl<T: Default> SmartInit for T {
	fn init() -> Self {
		T::default()
	}
}

/// Capability for types exposing a static, argument-free factory.
///
/// Used by [`Cache::resolve_instance`](crate::Cache::resolve_instance) when
/// no strategy is registered for the type.
///
/// # Example
///
/// ```
/// use smart_cache::{Cache, StaticInit};
///
/// struct Connection {
///     url: String,
/// }
///
/// impl StaticInit for Connection {
///     fn instance() -> Self {
///         Connection {
///             url: "memory://".to_string(),
///         }
///     }
/// }
///
/// let cache = Cache::new();
/// let conn = cache.resolve_instance::<Connection>(None);
/// assert_eq!(conn.url, "memory://");
/// ```
pub trait StaticInit: Sized {
	/// Produce a fresh instance.
	fn instance() -> Self;
}

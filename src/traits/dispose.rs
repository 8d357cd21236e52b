//! Disposal traits for resource cleanup.

/// Trait for synchronous resource disposal.
///
/// Implement this trait for services that need structured teardown (flushing
/// buffers, closing handles). A singleton produced through
/// [`Disposable`](crate::Disposable) is disposed when the container is
/// disposed, in reverse construction order.
///
/// # Examples
///
/// ```
/// use servant::{Dispose, Disposable, Servant};
/// use std::sync::Arc;
///
/// struct Cache {
///     name: String,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         println!("Flushing cache: {}", self.name);
///     }
/// }
///
/// let servant = Servant::new();
/// servant
///     .add_singleton(|| Disposable::new(Arc::new(Cache { name: "user_cache".to_string() })))
///     .unwrap();
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self);
}

/// Trait for asynchronous resource disposal.
///
/// Implement this trait for services that require async teardown, such as a
/// graceful connection shutdown. Async disposers share the same stack as
/// sync ones, so ordering is strictly reverse construction order regardless
/// of the kind of disposer.
///
/// # Examples
///
/// ```
/// use servant::{AsyncDispose, AsyncDisposable, Servant};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct DatabaseClient {
///     connection_id: String,
/// }
///
/// #[async_trait]
/// impl AsyncDispose for DatabaseClient {
///     async fn dispose(&self) {
///         println!("Closing database connection: {}", self.connection_id);
///     }
/// }
///
/// let servant = Servant::new();
/// servant
///     .add_singleton_async(|| async {
///         AsyncDisposable::new(Arc::new(DatabaseClient { connection_id: "conn_123".to_string() }))
///     })
///     .unwrap();
/// ```
#[async_trait::async_trait]
pub trait AsyncDispose: Send + Sync + 'static {
    /// Perform asynchronous cleanup of resources.
    async fn dispose(&self);
}

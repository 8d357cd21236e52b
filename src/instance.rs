//! Type-erased instances handed between providers and factories.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::key::TypeKey;
use crate::traits::{AsyncDispose, Dispose};

// Type-erased Arc for storage; the payload is always an `Arc<T>`.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Disposal capability attached to a produced instance.
#[derive(Clone)]
pub(crate) enum Disposer {
    Sync(Arc<dyn Dispose>),
    Async(Arc<dyn AsyncDispose>),
}

impl Disposer {
    pub(crate) async fn run(self) {
        match self {
            Disposer::Sync(d) => d.dispose(),
            Disposer::Async(d) => d.dispose().await,
        }
    }
}

/// A produced value with its type erased.
///
/// This is the currency of the generic factory signature accepted by
/// [`Servant::add`](crate::Servant::add): factories receive their resolved
/// dependencies as instances and return one. An instance of declared type `T`
/// always wraps an `Arc<T>`, which is what makes the is-instance-of check
/// exact.
///
/// Cloning is cheap and preserves identity.
///
/// # Examples
///
/// ```rust
/// use servant::{Instance, TypeKey};
/// use std::sync::Arc;
///
/// trait Shape: Send + Sync {}
/// struct Square;
/// impl Shape for Square {}
///
/// let shape = Instance::new::<dyn Shape>(Arc::new(Square));
/// assert!(shape.is_instance_of(&TypeKey::of::<dyn Shape>()));
/// assert!(!shape.is_instance_of(&TypeKey::of::<Square>()));
/// assert!(shape.downcast::<dyn Shape>().is_some());
/// ```
#[derive(Clone)]
pub struct Instance {
    value: AnyArc,
    type_name: &'static str,
    disposer: Option<Disposer>,
}

impl Instance {
    /// Wraps a value produced for declared type `T`.
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Instance {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
            disposer: None,
        }
    }

    /// Attaches a synchronous disposal capability.
    pub fn with_disposer<D: Dispose>(mut self, disposer: Arc<D>) -> Self {
        self.disposer = Some(Disposer::Sync(disposer));
        self
    }

    /// Attaches an asynchronous disposal capability.
    pub fn with_async_disposer<D: AsyncDispose>(mut self, disposer: Arc<D>) -> Self {
        self.disposer = Some(Disposer::Async(disposer));
        self
    }

    pub(crate) fn with_disposal(mut self, disposer: Disposer) -> Self {
        self.disposer = Some(disposer);
        self
    }

    /// Name of the type the value was wrapped as.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether this is an instance of the type identified by `key`.
    pub fn is_instance_of(&self, key: &TypeKey) -> bool {
        let value: &dyn Any = &*self.value;
        value.type_id() == key.carrier()
    }

    /// Recovers the typed value.
    pub fn downcast<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }

    /// Whether the instance exposes a disposal capability.
    pub fn is_disposable(&self) -> bool {
        self.disposer.is_some()
    }

    /// Whether both handles refer to the same produced value.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    pub(crate) fn disposer(&self) -> Option<Disposer> {
        self.disposer.clone()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .field("disposable", &self.is_disposable())
            .finish()
    }
}

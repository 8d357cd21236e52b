//! Typed factory support.
//!
//! These traits adapt strongly-typed user callbacks into the generic factory
//! signature accepted by [`Servant::add`](crate::Servant::add):
//!
//! - [`Dependencies`] turns a tuple `(Arc<A>, Arc<B>, ...)` into a parameter
//!   type list and extracts the typed arguments from erased instances.
//! - [`FactoryOutput`] turns what a callback returns into an erased instance.
//! - [`Factory`] and [`AsyncFactory`] are implemented for closures of up to
//!   sixteen `Arc<_>` parameters.
//! - [`Construct`] lets a type describe its single constructor, replacing
//!   runtime constructor discovery.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::{BoxError, ServantError, ServantResult};
use crate::instance::{Disposer, Instance};
use crate::key::TypeKey;
use crate::traits::{AsyncDispose, Dispose};

/// An ordered list of dependencies, written as a tuple of `Arc`s.
///
/// Implemented for `()` and for tuples `(Arc<D1>, ..., Arc<D16>)` where every
/// `Di` may be unsized (for example `dyn Logger`).
pub trait Dependencies: Sized + Send + 'static {
    /// Declared types of the dependencies, in parameter order.
    fn parameter_types() -> Vec<TypeKey>;

    /// Extracts the typed dependencies from resolved instances.
    fn extract(arguments: Vec<Instance>) -> ServantResult<Self>;
}

fn next_argument<T: ?Sized + 'static>(
    arguments: &mut std::vec::IntoIter<Instance>,
    index: usize,
) -> ServantResult<Arc<T>> {
    arguments
        .next()
        .and_then(|instance| instance.downcast::<T>())
        .ok_or(ServantError::ArgumentMismatch {
            index,
            expected: std::any::type_name::<T>(),
        })
}

/// What a typed factory may return for declared type `T`.
///
/// | Returned value | Meaning |
/// |---|---|
/// | `Arc<T>` | the instance |
/// | `Disposable<T>` | the instance, disposed with the container |
/// | `AsyncDisposable<T>` | the instance, disposed asynchronously |
/// | `Option<R>` | `None` is a null instance and fails resolution |
/// | `Result<R, E>` | `Err` is propagated as [`ServantError::Factory`] |
pub trait FactoryOutput<T: ?Sized>: Send + 'static {
    fn into_output(self) -> Result<Option<Instance>, BoxError>;
}

impl<T: ?Sized + Send + Sync + 'static> FactoryOutput<T> for Arc<T> {
    fn into_output(self) -> Result<Option<Instance>, BoxError> {
        Ok(Some(Instance::new(self)))
    }
}

impl<T, R> FactoryOutput<T> for Option<R>
where
    T: ?Sized,
    R: FactoryOutput<T>,
{
    fn into_output(self) -> Result<Option<Instance>, BoxError> {
        match self {
            Some(output) => output.into_output(),
            None => Ok(None),
        }
    }
}

impl<T, R, E> FactoryOutput<T> for Result<R, E>
where
    T: ?Sized,
    R: FactoryOutput<T>,
    E: Into<BoxError> + Send + 'static,
{
    fn into_output(self) -> Result<Option<Instance>, BoxError> {
        self.map_err(Into::into)?.into_output()
    }
}

/// A produced value whose [`Dispose`] implementation runs when the container
/// is disposed (singletons only).
///
/// The disposer is kept apart from the served handle, so a value declared as
/// a trait object can still be disposed through its concrete type.
///
/// ```
/// use servant::{Disposable, Dispose, Servant};
/// use std::sync::Arc;
///
/// trait Sink: Send + Sync {}
/// struct FileSink;
/// impl Sink for FileSink {}
/// impl Dispose for FileSink {
///     fn dispose(&self) {}
/// }
///
/// let servant = Servant::new();
/// servant
///     .add_singleton::<dyn Sink, _, _>(|| {
///         let sink = Arc::new(FileSink);
///         Disposable::declared(sink.clone() as Arc<dyn Sink>, sink)
///     })
///     .unwrap();
/// ```
pub struct Disposable<T: ?Sized> {
    value: Arc<T>,
    disposer: Disposer,
}

impl<T: Dispose> Disposable<T> {
    pub fn new(value: Arc<T>) -> Self {
        Self {
            disposer: Disposer::Sync(value.clone()),
            value,
        }
    }
}

impl<T: ?Sized> Disposable<T> {
    /// Serves `value` and disposes `concrete` with the container.
    pub fn declared<C: Dispose>(value: Arc<T>, concrete: Arc<C>) -> Self {
        Self {
            value,
            disposer: Disposer::Sync(concrete),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> FactoryOutput<T> for Disposable<T> {
    fn into_output(self) -> Result<Option<Instance>, BoxError> {
        Ok(Some(Instance::new(self.value).with_disposal(self.disposer)))
    }
}

/// A produced value whose [`AsyncDispose`] implementation runs when the
/// container is disposed (singletons only).
pub struct AsyncDisposable<T: ?Sized> {
    value: Arc<T>,
    disposer: Disposer,
}

impl<T: AsyncDispose> AsyncDisposable<T> {
    pub fn new(value: Arc<T>) -> Self {
        Self {
            disposer: Disposer::Async(value.clone()),
            value,
        }
    }
}

impl<T: ?Sized> AsyncDisposable<T> {
    /// Serves `value` and disposes `concrete` asynchronously with the container.
    pub fn declared<C: AsyncDispose>(value: Arc<T>, concrete: Arc<C>) -> Self {
        Self {
            value,
            disposer: Disposer::Async(concrete),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> FactoryOutput<T> for AsyncDisposable<T> {
    fn into_output(self) -> Result<Option<Instance>, BoxError> {
        Ok(Some(Instance::new(self.value).with_disposal(self.disposer)))
    }
}

/// Synchronous typed factory taking dependencies `D` and producing `T`.
pub trait Factory<D: Dependencies, T: ?Sized>: Send + Sync + 'static {
    fn call(&self, dependencies: D) -> Result<Option<Instance>, BoxError>;
}

/// Asynchronous typed factory taking dependencies `D` and producing `T`.
pub trait AsyncFactory<D: Dependencies, T: ?Sized>: Send + Sync + 'static {
    fn call(&self, dependencies: D) -> BoxFuture<'static, Result<Option<Instance>, BoxError>>;
}

/// A type with exactly one way of being constructed from its dependencies.
///
/// The implementation is the type's only constructor; its dependencies are
/// resolved from the container before `construct` is called.
///
/// # Examples
///
/// ```
/// use servant::{Construct, Servant};
/// use std::sync::Arc;
///
/// struct Clock;
/// struct Scheduler { clock: Arc<Clock> }
///
/// impl Construct for Scheduler {
///     type Dependencies = (Arc<Clock>,);
///
///     fn construct((clock,): Self::Dependencies) -> Self {
///         Scheduler { clock }
///     }
/// }
///
/// let servant = Servant::new();
/// servant.add_singleton_instance(Arc::new(Clock)).unwrap();
/// servant.add_singleton_constructed::<Scheduler>().unwrap();
/// ```
pub trait Construct: Sized + Send + Sync + 'static {
    type Dependencies: Dependencies;

    fn construct(dependencies: Self::Dependencies) -> Self;
}

macro_rules! impl_factories {
    ($($ty:ident $var:ident),*) => {
        impl<$($ty),*> Dependencies for ($(Arc<$ty>,)*)
        where
            $($ty: ?Sized + Send + Sync + 'static,)*
        {
            fn parameter_types() -> Vec<TypeKey> {
                vec![$(TypeKey::of::<$ty>()),*]
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn extract(arguments: Vec<Instance>) -> ServantResult<Self> {
                let mut arguments = arguments.into_iter();
                let mut index = 0;
                $(
                    let $var = next_argument::<$ty>(&mut arguments, index)?;
                    index += 1;
                )*
                Ok(($($var,)*))
            }
        }

        impl<Func, Out, Target, $($ty),*> Factory<($(Arc<$ty>,)*), Target> for Func
        where
            Func: Fn($(Arc<$ty>),*) -> Out + Send + Sync + 'static,
            Out: FactoryOutput<Target>,
            Target: ?Sized,
            $($ty: ?Sized + Send + Sync + 'static,)*
        {
            fn call(&self, ($($var,)*): ($(Arc<$ty>,)*)) -> Result<Option<Instance>, BoxError> {
                (self)($($var),*).into_output()
            }
        }

        impl<Func, Fut, Out, Target, $($ty),*> AsyncFactory<($(Arc<$ty>,)*), Target> for Func
        where
            Func: Fn($(Arc<$ty>),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Out> + Send + 'static,
            Out: FactoryOutput<Target>,
            Target: ?Sized,
            $($ty: ?Sized + Send + Sync + 'static,)*
        {
            fn call(&self, ($($var,)*): ($(Arc<$ty>,)*)) -> BoxFuture<'static, Result<Option<Instance>, BoxError>> {
                let pending = (self)($($var),*);
                Box::pin(async move { pending.await.into_output() })
            }
        }
    };
}

impl_factories!();
impl_factories!(D1 d1);
impl_factories!(D1 d1, D2 d2);
impl_factories!(D1 d1, D2 d2, D3 d3);
impl_factories!(D1 d1, D2 d2, D3 d3, D4 d4);
impl_factories!(D1 d1, D2 d2, D3 d3, D4 d4, D5 d5);
impl_factories!(D1 d1, D2 d2, D3 d3, D4 d4, D5 d5, D6 d6);
impl_factories!(D1 d1, D2 d2, D3 d3, D4 d4, D5 d5, D6 d6, D7 d7);
impl_factories!(D1 d1, D2 d2, D3 d3, D4 d4, D5 d5, D6 d6, D7 d7, D8 d8);
impl_factories!(D1 d1, D2 d2, D3 d3, D4 d4, D5 d5, D6 d6, D7 d7, D8 d8, D9 d9);
impl_factories!(D1 d1, D2 d2, D3 d3, D4 d4, D5 d5, D6 d6, D7 d7, D8 d8, D9 d9, D10 d10);
impl_factories!(D1 d1, D2 d2, D3 d3, D4 d4, D5 d5, D6 d6, D7 d7, D8 d8, D9 d9, D10 d10, D11 d11);
impl_factories!(D1 d1, D2 d2, D3 d3, D4 d4, D5 d5, D6 d6, D7 d7, D8 d8, D9 d9, D10 d10, D11 d11, D12 d12);
impl_factories!(D1 d1, D2 d2, D3 d3, D4 d4, D5 d5, D6 d6, D7 d7, D8 d8, D9 d9, D10 d10, D11 d11, D12 d12, D13 d13);
impl_factories!(D1 d1, D2 d2, D3 d3, D4 d4, D5 d5, D6 d6, D7 d7, D8 d8, D9 d9, D10 d10, D11 d11, D12 d12, D13 d13, D14 d14);
impl_factories!(D1 d1, D2 d2, D3 d3, D4 d4, D5 d5, D6 d6, D7 d7, D8 d8, D9 d9, D10 d10, D11 d11, D12 d12, D13 d13, D14 d14, D15 d15);
impl_factories!(D1 d1, D2 d2, D3 d3, D4 d4, D5 d5, D6 d6, D7 d7, D8 d8, D9 d9, D10 d10, D11 d11, D12 d12, D13 d13, D14 d14, D15 d15, D16 d16);

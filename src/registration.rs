//! Typed registration helpers.
//!
//! Every helper here builds an erased factory from a typed callback and hands
//! it to [`Servant::add`], so all of them get the same validation.

use std::sync::Arc;

use futures::future::{self, FutureExt};

use crate::container::Servant;
use crate::error::{BoxError, ServantResult};
use crate::factory::{AsyncFactory, Construct, Dependencies, Factory};
use crate::instance::Instance;
use crate::key::TypeKey;
use crate::lifestyle::Lifestyle;
use crate::provider::FactoryFuture;

impl Servant {
    /// Registers a pre-built value as a singleton with no dependencies.
    ///
    /// The value is not disposed by the container; its owner keeps that
    /// responsibility.
    pub fn add_singleton_instance<T>(&self, value: Arc<T>) -> ServantResult<()>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let instance = Instance::new(value);
        self.add(
            Lifestyle::Singleton,
            TypeKey::of::<T>(),
            move |_| future::ready(Ok(Some(instance.clone()))).boxed(),
            &[],
        )
    }

    /// Registers a synchronous singleton factory.
    ///
    /// The factory's `Arc` parameters are its dependencies, resolved before it
    /// is called.
    ///
    /// ```
    /// use servant::Servant;
    /// use std::sync::Arc;
    ///
    /// struct Settings { retries: u32 }
    /// struct Client { settings: Arc<Settings> }
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), servant::ServantError> {
    /// let servant = Servant::new();
    /// servant.add_singleton(|| Arc::new(Settings { retries: 3 }))?;
    /// servant.add_singleton(|settings: Arc<Settings>| Arc::new(Client { settings }))?;
    ///
    /// let client = servant.serve::<Client>().await?;
    /// assert_eq!(client.settings.retries, 3);
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_singleton<T, D, F>(&self, factory: F) -> ServantResult<()>
    where
        T: ?Sized + 'static,
        D: Dependencies,
        F: Factory<D, T>,
    {
        self.add_sync(Lifestyle::Singleton, factory)
    }

    /// Registers a synchronous transient factory.
    pub fn add_transient<T, D, F>(&self, factory: F) -> ServantResult<()>
    where
        T: ?Sized + 'static,
        D: Dependencies,
        F: Factory<D, T>,
    {
        self.add_sync(Lifestyle::Transient, factory)
    }

    /// Registers an asynchronous singleton factory.
    ///
    /// ```
    /// use servant::Servant;
    /// use std::sync::Arc;
    ///
    /// struct Pool { size: usize }
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), servant::ServantError> {
    /// let servant = Servant::new();
    /// servant.add_singleton_async(|| async {
    ///     Ok::<_, std::io::Error>(Arc::new(Pool { size: 8 }))
    /// })?;
    ///
    /// assert_eq!(servant.serve::<Pool>().await?.size, 8);
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_singleton_async<T, D, F>(&self, factory: F) -> ServantResult<()>
    where
        T: ?Sized + 'static,
        D: Dependencies,
        F: AsyncFactory<D, T>,
    {
        self.add_async(Lifestyle::Singleton, factory)
    }

    /// Registers an asynchronous transient factory.
    pub fn add_transient_async<T, D, F>(&self, factory: F) -> ServantResult<()>
    where
        T: ?Sized + 'static,
        D: Dependencies,
        F: AsyncFactory<D, T>,
    {
        self.add_async(Lifestyle::Transient, factory)
    }

    /// Registers `T` through its [`Construct`] implementation.
    pub fn add_constructed<T: Construct>(&self, lifestyle: Lifestyle) -> ServantResult<()> {
        let erased = |arguments: Vec<Instance>| -> FactoryFuture {
            let produced = T::Dependencies::extract(arguments)
                .map(|dependencies| Some(Instance::new(Arc::new(T::construct(dependencies)))))
                .map_err(BoxError::from);
            future::ready(produced).boxed()
        };
        self.add(
            lifestyle,
            TypeKey::of::<T>(),
            erased,
            &T::Dependencies::parameter_types(),
        )
    }

    pub fn add_singleton_constructed<T: Construct>(&self) -> ServantResult<()> {
        self.add_constructed::<T>(Lifestyle::Singleton)
    }

    pub fn add_transient_constructed<T: Construct>(&self) -> ServantResult<()> {
        self.add_constructed::<T>(Lifestyle::Transient)
    }

    fn add_sync<T, D, F>(&self, lifestyle: Lifestyle, factory: F) -> ServantResult<()>
    where
        T: ?Sized + 'static,
        D: Dependencies,
        F: Factory<D, T>,
    {
        let erased = move |arguments: Vec<Instance>| -> FactoryFuture {
            let produced = D::extract(arguments)
                .map_err(BoxError::from)
                .and_then(|dependencies| factory.call(dependencies));
            future::ready(produced).boxed()
        };
        self.add(lifestyle, TypeKey::of::<T>(), erased, &D::parameter_types())
    }

    fn add_async<T, D, F>(&self, lifestyle: Lifestyle, factory: F) -> ServantResult<()>
    where
        T: ?Sized + 'static,
        D: Dependencies,
        F: AsyncFactory<D, T>,
    {
        let erased = move |arguments: Vec<Instance>| -> FactoryFuture {
            match D::extract(arguments) {
                Ok(dependencies) => factory.call(dependencies),
                Err(error) => future::ready(Err(BoxError::from(error))).boxed(),
            }
        };
        self.add(lifestyle, TypeKey::of::<T>(), erased, &D::parameter_types())
    }
}

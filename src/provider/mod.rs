//! Construction providers: the resolution engine for one declared type.
//!
//! A provider owns the factory of a declared type, the ordered list of entries
//! it depends on, and (for singletons) the compute-once cell memoizing the
//! produced instance.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::future::{self, BoxFuture, FutureExt};

use crate::container::{Entry, ServantInner};
use crate::error::{BoxError, FactoryPanic, ServantError, ServantResult};
use crate::instance::Instance;
use crate::key::TypeKey;
use crate::lifestyle::Lifestyle;

pub(crate) mod singleton;

use singleton::{Claim, SingletonCell};

/// Future returned by an erased factory.
///
/// `Ok(None)` is a null instance and is rejected by the container.
pub type FactoryFuture = BoxFuture<'static, Result<Option<Instance>, BoxError>>;

pub(crate) type ErasedFactory = Box<dyn Fn(Vec<Instance>) -> FactoryFuture + Send + Sync>;

/// Construction unit bound to one declared type.
pub(crate) struct Provider {
    declared: TypeKey,
    lifestyle: Lifestyle,
    dependencies: Vec<Arc<Entry>>,
    factory: ErasedFactory,
    singleton: SingletonCell,
}

impl Provider {
    pub(crate) fn new(
        declared: TypeKey,
        lifestyle: Lifestyle,
        dependencies: Vec<Arc<Entry>>,
        factory: ErasedFactory,
    ) -> Self {
        Self {
            declared,
            lifestyle,
            dependencies,
            factory,
            singleton: SingletonCell::new(),
        }
    }

    pub(crate) fn declared(&self) -> &TypeKey {
        &self.declared
    }

    pub(crate) fn lifestyle(&self) -> Lifestyle {
        self.lifestyle
    }

    pub(crate) fn dependencies(&self) -> &[Arc<Entry>] {
        &self.dependencies
    }

    /// Whether a singleton instance has been created.
    pub(crate) fn is_realized(&self) -> bool {
        self.lifestyle == Lifestyle::Singleton && self.singleton.is_created()
    }

    /// Resolves an instance of the declared type.
    ///
    /// Transients construct on every call. Singletons return the memoized
    /// instance, or join the single in-flight creation.
    pub(crate) fn resolve(
        self: &Arc<Self>,
        servant: &Arc<ServantInner>,
    ) -> BoxFuture<'static, ServantResult<Instance>> {
        servant.observers().resolving(&self.declared);

        match self.lifestyle {
            Lifestyle::Transient => self.clone().construct(servant.clone()).boxed(),
            Lifestyle::Singleton => {
                let claim = self.singleton.claim(|| {
                    self.clone()
                        .construct_singleton(servant.clone())
                        .boxed()
                });
                match claim {
                    Claim::Ready(instance) => future::ready(Ok(instance)).boxed(),
                    Claim::Pending(creation) => creation.boxed(),
                }
            }
        }
    }

    async fn construct_singleton(self: Arc<Self>, servant: Arc<ServantInner>) -> ServantResult<Instance> {
        match self.clone().construct(servant.clone()).await {
            Ok(instance) => {
                if let Some(disposer) = instance.disposer() {
                    servant.track_disposable(self.declared, disposer).await;
                }
                self.singleton.complete(instance.clone());
                Ok(instance)
            }
            Err(error) => {
                self.singleton.reset();
                Err(error)
            }
        }
    }

    /// One construction attempt: dependencies, factory, validation.
    async fn construct(self: Arc<Self>, servant: Arc<ServantInner>) -> ServantResult<Instance> {
        let result = self.try_construct(&servant).await;
        if let Err(error) = &result {
            tracing::warn!(service = self.declared.name(), %error, "construction failed");
            servant.observers().resolution_failed(&self.declared, error);
        }
        result
    }

    async fn try_construct(&self, servant: &Arc<ServantInner>) -> ServantResult<Instance> {
        let mut providers = Vec::with_capacity(self.dependencies.len());
        for dependency in &self.dependencies {
            match dependency.provider() {
                Some(provider) => providers.push(provider.clone()),
                None => return Err(servant.unregistered_dependency(&self.declared, dependency.key())),
            }
        }

        let arguments = future::try_join_all(providers.iter().map(|p| p.resolve(servant))).await?;

        let started = servant.observers().has_observers().then(Instant::now);
        // A panic fails this attempt like any other factory error.
        let produced = AssertUnwindSafe(async move { (self.factory)(arguments).await })
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(FactoryPanic::from_payload(payload).into()))
            .map_err(ServantError::factory)?;

        let instance = produced.ok_or(ServantError::NullInstance(self.declared.name()))?;
        if !instance.is_instance_of(&self.declared) {
            return Err(ServantError::NotAssignable {
                declared: self.declared.name(),
                produced: instance.type_name(),
            });
        }

        if let Some(started) = started {
            servant.observers().constructed(&self.declared, started.elapsed());
        }
        tracing::trace!(
            service = self.declared.name(),
            lifestyle = %self.lifestyle,
            "constructed instance"
        );
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use crate::Servant;
    use std::sync::Arc;
    use tracing_test::traced_test;

    struct Gauge;

    #[tokio::test]
    #[traced_test]
    async fn test_failed_construction_is_logged() {
        let servant = Servant::new();
        servant
            .add_transient(|| Err::<Arc<Gauge>, _>("sensor offline"))
            .unwrap();

        assert!(servant.serve::<Gauge>().await.is_err());
        assert!(logs_contain("construction failed"));
        assert!(logs_contain("sensor offline"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_successful_construction_does_not_warn() {
        let servant = Servant::new();
        servant.add_transient(|| Arc::new(Gauge)).unwrap();

        servant.serve::<Gauge>().await.unwrap();
        assert!(!logs_contain("construction failed"));
    }
}

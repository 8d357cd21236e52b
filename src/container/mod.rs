//! The `Servant` container: registry, resolution entry points and disposal.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future;
use parking_lot::{Mutex, RwLock};

use crate::config::ServantOptions;
use crate::error::{ServantError, ServantResult};
use crate::hierarchy::TypeHierarchy;
use crate::instance::{Disposer, Instance};
use crate::internal::{reaches, DisposalRecord, DisposeBag};
use crate::key::TypeKey;
use crate::lifestyle::Lifestyle;
use crate::observer::{Observers, ServantObserver};
use crate::provider::{FactoryFuture, Provider};

mod entry;

pub(crate) use entry::Entry;

/// Async dependency injection container.
///
/// A `Servant` holds construction recipes keyed by declared type and serves
/// fully-resolved instances. Registration validates the dependency graph as it
/// grows (self-dependencies, duplicates, cycles, re-registration), so
/// resolution can assume an acyclic graph. Dependencies of one provider are
/// resolved concurrently; singletons are created exactly once even under
/// concurrent first requests.
///
/// `Servant` is cheap to clone; clones share the same registry.
///
/// # Examples
///
/// ```
/// use servant::Servant;
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), servant::ServantError> {
/// let servant = Servant::new();
/// servant.add_singleton_instance(Arc::new(Database { url: "postgres://localhost".to_string() }))?;
/// servant.add_transient(|db: Arc<Database>| Arc::new(UserService { db }))?;
///
/// let users = servant.serve::<UserService>().await?;
/// assert_eq!(users.db.url, "postgres://localhost");
///
/// servant.dispose().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Servant {
    inner: Arc<ServantInner>,
}

/// Type→Entry map preserving first-mention order.
#[derive(Default)]
struct EntryMap {
    by_key: HashMap<TypeKey, Arc<Entry>>,
    order: Vec<Arc<Entry>>,
}

impl EntryMap {
    fn get(&self, key: &TypeKey) -> Option<&Arc<Entry>> {
        self.by_key.get(key)
    }

    fn get_or_insert(&mut self, key: TypeKey) -> Arc<Entry> {
        if let Some(entry) = self.by_key.get(&key) {
            return entry.clone();
        }
        let entry = Arc::new(Entry::new(key));
        self.by_key.insert(key, entry.clone());
        self.order.push(entry.clone());
        entry
    }

    fn iter(&self) -> impl Iterator<Item = &Arc<Entry>> {
        self.order.iter()
    }

    fn providers(&self) -> impl Iterator<Item = &Arc<Provider>> {
        self.order.iter().filter_map(|e| e.provider())
    }
}

pub(crate) struct ServantInner {
    options: ServantOptions,
    entries: RwLock<EntryMap>,
    hierarchy: RwLock<TypeHierarchy>,
    /// Serializes `add` so validation and commit are atomic.
    registration: Mutex<()>,
    disposal: Mutex<DisposeBag>,
    disposed: AtomicBool,
    observers: Observers,
}

impl ServantInner {
    pub(crate) fn observers(&self) -> &Observers {
        &self.observers
    }

    fn ensure_live(&self) -> ServantResult<()> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(ServantError::Disposed {
                container: self.options.name.clone(),
            });
        }
        Ok(())
    }

    fn provider_for(&self, key: &TypeKey) -> ServantResult<Arc<Provider>> {
        self.ensure_live()?;
        self.entries
            .read()
            .get(key)
            .and_then(|e| e.provider().cloned())
            .ok_or(ServantError::NotRegistered(key.name()))
    }

    /// Builds the error for a dependency without provider, with a hint naming
    /// every registered super-type of the missing type.
    pub(crate) fn unregistered_dependency(&self, declared: &TypeKey, missing: &TypeKey) -> ServantError {
        let hierarchy = self.hierarchy.read();
        let suggestions = self
            .entries
            .read()
            .providers()
            .map(|p| *p.declared())
            .filter(|registered| hierarchy.is_assignable_from(registered, missing))
            .map(|registered| registered.name())
            .collect();

        ServantError::UnregisteredDependency {
            declared: declared.name(),
            dependency: missing.name(),
            suggestions,
        }
    }

    /// Records a freshly created singleton for disposal. If the container was
    /// disposed while the singleton was being created, it is disposed at once.
    pub(crate) async fn track_disposable(&self, key: TypeKey, disposer: Disposer) {
        let rejected = {
            let mut bag = self.disposal.lock();
            bag.push(DisposalRecord { key, disposer })
        };
        if let Err(record) = rejected {
            tracing::warn!(
                container = %self.options.name,
                service = key.name(),
                "singleton completed after disposal; disposing immediately"
            );
            record.disposer.run().await;
            self.observers.disposed(&record.key);
        }
    }
}

impl Drop for ServantInner {
    fn drop(&mut self) {
        if !self.options.warn_on_undisposed_drop || self.disposed.load(Ordering::Acquire) {
            return;
        }
        let bag = self.disposal.lock();
        if !bag.is_empty() {
            tracing::warn!(
                container = %self.options.name,
                pending = bag.len(),
                "container dropped with undisposed singletons; call dispose().await before dropping"
            );
        }
    }
}

impl Default for Servant {
    fn default() -> Self {
        Self::new()
    }
}

impl Servant {
    /// Creates an empty container with default options.
    pub fn new() -> Self {
        Self::with_options(ServantOptions::default())
    }

    /// Creates an empty container with the given options.
    pub fn with_options(options: ServantOptions) -> Self {
        Self {
            inner: Arc::new(ServantInner {
                options,
                entries: RwLock::new(EntryMap::default()),
                hierarchy: RwLock::new(TypeHierarchy::new()),
                registration: Mutex::new(()),
                disposal: Mutex::new(DisposeBag::default()),
                disposed: AtomicBool::new(false),
                observers: Observers::new(),
            }),
        }
    }

    /// The container name used in errors and logs.
    pub fn name(&self) -> &str {
        &self.inner.options.name
    }

    /// Registers a construction recipe for `declared`.
    ///
    /// This is the generic registration every typed helper funnels into. The
    /// factory receives one resolved instance per entry of `parameter_types`,
    /// in the same order, and must produce an instance of `declared`.
    ///
    /// Validation runs in this order, each failure distinct: container
    /// disposed, self-dependency, duplicate dependency, cycle, already
    /// registered. A failed registration leaves the container unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::FutureExt;
    /// use servant::{Instance, Lifestyle, Servant, TypeKey};
    /// use std::sync::Arc;
    ///
    /// struct Port(u16);
    ///
    /// let servant = Servant::new();
    /// servant.add(
    ///     Lifestyle::Singleton,
    ///     TypeKey::of::<Port>(),
    ///     |_args| async { Ok(Some(Instance::new(Arc::new(Port(8080))))) }.boxed(),
    ///     &[],
    /// ).unwrap();
    /// assert!(servant.is_registered::<Port>());
    /// ```
    pub fn add<F>(
        &self,
        lifestyle: Lifestyle,
        declared: TypeKey,
        factory: F,
        parameter_types: &[TypeKey],
    ) -> ServantResult<()>
    where
        F: Fn(Vec<Instance>) -> FactoryFuture + Send + Sync + 'static,
    {
        let _registration = self.inner.registration.lock();
        self.inner.ensure_live()?;

        if parameter_types.contains(&declared) {
            return Err(ServantError::SelfDependency(declared.name()));
        }

        for (i, parameter) in parameter_types.iter().enumerate() {
            if parameter_types[..i].contains(parameter) {
                return Err(ServantError::DuplicateDependency {
                    declared: declared.name(),
                    dependency: parameter.name(),
                });
            }
        }

        {
            let entries = self.inner.entries.read();
            for parameter in parameter_types {
                if let Some(existing) = entries.get(parameter) {
                    if existing.provider().is_some() && reaches(existing, &declared) {
                        return Err(ServantError::Cycle {
                            declared: declared.name(),
                            dependency: parameter.name(),
                        });
                    }
                }
            }

            if entries.get(&declared).and_then(|e| e.provider()).is_some() {
                return Err(ServantError::AlreadyRegistered(declared.name()));
            }
        }

        {
            let mut entries = self.inner.entries.write();
            let entry = entries.get_or_insert(declared);
            let dependencies = parameter_types
                .iter()
                .map(|parameter| entries.get_or_insert(*parameter))
                .collect();
            let provider = Provider::new(declared, lifestyle, dependencies, Box::new(factory));
            entry
                .set_provider(Arc::new(provider))
                .map_err(|_| ServantError::AlreadyRegistered(declared.name()))?;
        }

        tracing::debug!(
            container = %self.inner.options.name,
            service = declared.name(),
            %lifestyle,
            dependencies = parameter_types.len(),
            "registered service"
        );
        self.inner.observers.registered(&declared, lifestyle, parameter_types);
        Ok(())
    }

    /// Declares that `Sub` is assignable to `Super`.
    ///
    /// The table only feeds assignability queries, such as the hint attached
    /// to an unregistered-dependency error when a super-type was registered
    /// instead of the requested type.
    pub fn declare_assignable<Sub, Super>(&self) -> ServantResult<()>
    where
        Sub: ?Sized + 'static,
        Super: ?Sized + 'static,
    {
        self.inner.ensure_live()?;
        self.inner
            .hierarchy
            .write()
            .declare(TypeKey::of::<Sub>(), TypeKey::of::<Super>());
        Ok(())
    }

    /// Whether an instance of `sub` may be used where `super_type` is expected.
    pub fn is_super_type_of(&self, super_type: &TypeKey, sub: &TypeKey) -> bool {
        self.inner.hierarchy.read().is_assignable_from(super_type, sub)
    }

    /// Serves an instance of `T`, constructing it and its dependencies as needed.
    pub async fn serve<T>(&self) -> ServantResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        let instance = self.serve_key(&key).await?;
        instance.downcast::<T>().ok_or(ServantError::NotAssignable {
            declared: key.name(),
            produced: instance.type_name(),
        })
    }

    /// Serves an erased instance of the type identified by `key`.
    pub async fn serve_key(&self, key: &TypeKey) -> ServantResult<Instance> {
        let provider = self.inner.provider_for(key)?;
        provider.resolve(&self.inner).await
    }

    /// Eagerly creates every singleton.
    ///
    /// All singleton providers are resolved concurrently and all of them are
    /// driven to completion; the first failure, in registration order, is
    /// returned. Already created singletons are not constructed again.
    pub async fn create_singletons(&self) -> ServantResult<()> {
        self.inner.ensure_live()?;

        let singletons: Vec<Arc<Provider>> = self
            .inner
            .entries
            .read()
            .providers()
            .filter(|p| p.lifestyle() == Lifestyle::Singleton)
            .cloned()
            .collect();

        let results = future::join_all(singletons.iter().map(|p| p.resolve(&self.inner))).await;
        match results.into_iter().find_map(Result::err) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Whether `key` has a provider.
    pub fn is_type_registered(&self, key: &TypeKey) -> bool {
        self.inner
            .entries
            .read()
            .get(key)
            .map_or(false, |e| e.provider().is_some())
    }

    /// Whether `T` has a provider.
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.is_type_registered(&TypeKey::of::<T>())
    }

    /// Declared types that have a provider, in registration order of first mention.
    pub fn registered_types(&self) -> Vec<TypeKey> {
        self.inner
            .entries
            .read()
            .providers()
            .map(|p| *p.declared())
            .collect()
    }

    /// Attaches an observer for registration, resolution and disposal events.
    pub fn add_observer(&self, observer: Arc<dyn ServantObserver>) {
        self.inner.observers.add(observer);
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Disposes the container.
    ///
    /// Only the first call has an effect. Realized singletons with a disposal
    /// capability are disposed one at a time in reverse construction order,
    /// so every dependent is disposed before the dependencies it holds. Every
    /// other operation fails with [`ServantError::Disposed`] afterwards.
    pub async fn dispose(&self) {
        {
            let _registration = self.inner.registration.lock();
            if self.inner.disposed.swap(true, Ordering::AcqRel) {
                return;
            }
            self.inner.disposal.lock().close();
        }

        tracing::info!(container = %self.inner.options.name, "disposing container");

        loop {
            let record = {
                let mut bag = self.inner.disposal.lock();
                bag.pop()
            };
            let Some(record) = record else { break };
            record.disposer.run().await;
            self.inner.observers.disposed(&record.key);
        }
    }

    /// Visits every entry in first-mention order.
    pub(crate) fn for_each_entry(&self, mut visit: impl FnMut(&Entry)) {
        for entry in self.inner.entries.read().iter() {
            visit(entry);
        }
    }

    pub(crate) fn ensure_live(&self) -> ServantResult<()> {
        self.inner.ensure_live()
    }
}

impl fmt::Debug for Servant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .inner
            .entries
            .read()
            .iter()
            .map(|e| e.to_string())
            .collect();
        f.debug_struct("Servant")
            .field("name", &self.inner.options.name)
            .field("disposed", &self.is_disposed())
            .field("entries", &entries)
            .finish()
    }
}

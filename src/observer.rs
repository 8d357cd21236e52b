//! Diagnostic observers for registration, resolution and disposal events.
//!
//! Observers are the hook for structured tracing and monitoring of the
//! container. They are called synchronously on the resolving task, so
//! implementations should stay lightweight.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::error::ServantError;
use crate::key::TypeKey;
use crate::lifestyle::Lifestyle;

/// Observer trait for container events.
///
/// Every hook has an empty default so implementations only override what they
/// need.
///
/// # Examples
///
/// ```
/// use servant::{Servant, ServantObserver, TypeKey};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct ConstructionCounter(AtomicUsize);
///
/// impl ServantObserver for ConstructionCounter {
///     fn constructed(&self, _key: &TypeKey, _duration: Duration) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// let counter = Arc::new(ConstructionCounter::default());
/// let servant = Servant::new();
/// servant.add_observer(counter.clone());
/// ```
pub trait ServantObserver: Send + Sync {
    /// A provider was attached to `key`.
    fn registered(&self, key: &TypeKey, lifestyle: Lifestyle, dependencies: &[TypeKey]) {
        let _ = (key, lifestyle, dependencies);
    }

    /// Resolution of `key` was requested, whether or not it is memoized.
    fn resolving(&self, key: &TypeKey) {
        let _ = key;
    }

    /// A factory invocation for `key` produced a valid instance.
    fn constructed(&self, key: &TypeKey, duration: Duration) {
        let _ = (key, duration);
    }

    /// A construction attempt for `key` failed.
    fn resolution_failed(&self, key: &TypeKey, error: &ServantError) {
        let _ = (key, error);
    }

    /// The singleton registered under `key` was disposed.
    fn disposed(&self, key: &TypeKey) {
        let _ = key;
    }
}

/// Observer that forwards every event to `tracing`.
///
/// Registrations and constructions are emitted at `debug`, resolution requests
/// at `trace`, failures at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ServantObserver for TracingObserver {
    fn registered(&self, key: &TypeKey, lifestyle: Lifestyle, dependencies: &[TypeKey]) {
        tracing::debug!(
            service = key.name(),
            %lifestyle,
            dependencies = dependencies.len(),
            "registered"
        );
    }

    fn resolving(&self, key: &TypeKey) {
        tracing::trace!(service = key.name(), "resolving");
    }

    fn constructed(&self, key: &TypeKey, duration: Duration) {
        tracing::debug!(service = key.name(), elapsed_us = duration.as_micros() as u64, "constructed");
    }

    fn resolution_failed(&self, key: &TypeKey, error: &ServantError) {
        tracing::warn!(service = key.name(), %error, "construction failed");
    }

    fn disposed(&self, key: &TypeKey) {
        tracing::debug!(service = key.name(), "disposed");
    }
}

/// Registered observers, fanned out on every event.
#[derive(Default)]
pub(crate) struct Observers {
    observers: RwLock<Vec<Arc<dyn ServantObserver>>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self, observer: Arc<dyn ServantObserver>) {
        self.observers.write().push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.read().is_empty()
    }

    pub(crate) fn registered(&self, key: &TypeKey, lifestyle: Lifestyle, dependencies: &[TypeKey]) {
        for o in self.observers.read().iter() {
            o.registered(key, lifestyle, dependencies);
        }
    }

    pub(crate) fn resolving(&self, key: &TypeKey) {
        for o in self.observers.read().iter() {
            o.resolving(key);
        }
    }

    pub(crate) fn constructed(&self, key: &TypeKey, duration: Duration) {
        for o in self.observers.read().iter() {
            o.constructed(key, duration);
        }
    }

    pub(crate) fn resolution_failed(&self, key: &TypeKey, error: &ServantError) {
        for o in self.observers.read().iter() {
            o.resolution_failed(key, error);
        }
    }

    pub(crate) fn disposed(&self, key: &TypeKey) {
        for o in self.observers.read().iter() {
            o.disposed(key);
        }
    }
}

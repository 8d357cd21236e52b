//! Compute-once cell backing singleton providers.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::error::ServantResult;
use crate::instance::Instance;

/// A creation shared by every caller that arrives while it is in flight.
pub(crate) type SharedCreation = Shared<BoxFuture<'static, ServantResult<Instance>>>;

enum SingletonState {
    Uncreated,
    CreationInFlight(SharedCreation),
    Created(Instance),
}

/// Outcome of [`SingletonCell::claim`].
pub(crate) enum Claim {
    /// The singleton already exists.
    Ready(Instance),
    /// A creation is running (possibly just started by this caller).
    Pending(SharedCreation),
}

/// Singleton state machine: `Uncreated -> CreationInFlight -> Created`.
///
/// The mutex guards the `Uncreated -> CreationInFlight` transition, so exactly
/// one creation is installed no matter how many callers race. The cell keeps
/// its own handle on the in-flight future, which lets any later caller drive
/// it to completion even if the caller that started it goes away.
pub(crate) struct SingletonCell {
    state: Mutex<SingletonState>,
}

impl SingletonCell {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SingletonState::Uncreated),
        }
    }

    /// Returns the memoized instance, joins the running creation, or installs
    /// the creation built by `start`.
    ///
    /// `start` runs under the lock and must only build the future, not poll it.
    pub(crate) fn claim<F>(&self, start: F) -> Claim
    where
        F: FnOnce() -> BoxFuture<'static, ServantResult<Instance>>,
    {
        let mut state = self.state.lock();
        match &*state {
            SingletonState::Created(instance) => Claim::Ready(instance.clone()),
            SingletonState::CreationInFlight(creation) => Claim::Pending(creation.clone()),
            SingletonState::Uncreated => {
                let creation = start().shared();
                *state = SingletonState::CreationInFlight(creation.clone());
                Claim::Pending(creation)
            }
        }
    }

    /// Stores the result of the in-flight creation.
    pub(crate) fn complete(&self, instance: Instance) {
        *self.state.lock() = SingletonState::Created(instance);
    }

    /// Forgets a failed creation so the next caller starts afresh.
    pub(crate) fn reset(&self) {
        *self.state.lock() = SingletonState::Uncreated;
    }

    pub(crate) fn is_created(&self) -> bool {
        matches!(&*self.state.lock(), SingletonState::Created(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_claim_installs_creation_once() {
        let cell = SingletonCell::new();
        let starts = AtomicUsize::new(0);

        let start = || {
            starts.fetch_add(1, Ordering::SeqCst);
            async { Ok(Instance::new(Arc::new(7u32))) }.boxed()
        };

        let first = cell.claim(start);
        let second = cell.claim(|| unreachable!("creation already in flight"));
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        let (a, b) = match (first, second) {
            (Claim::Pending(a), Claim::Pending(b)) => (a.await.unwrap(), b.await.unwrap()),
            _ => panic!("expected two pending claims"),
        };
        assert!(a.ptr_eq(&b));
        assert!(!cell.is_created());

        cell.complete(a.clone());
        assert!(cell.is_created());
        match cell.claim(|| unreachable!("already created")) {
            Claim::Ready(instance) => assert!(instance.ptr_eq(&a)),
            Claim::Pending(_) => panic!("expected memoized instance"),
        }
    }

    #[tokio::test]
    async fn test_reset_allows_new_creation() {
        let cell = SingletonCell::new();
        let _ = cell.claim(|| async { Ok(Instance::new(Arc::new(1u8))) }.boxed());
        cell.reset();

        let mut restarted = false;
        let _ = cell.claim(|| {
            restarted = true;
            async { Ok(Instance::new(Arc::new(2u8))) }.boxed()
        });
        assert!(restarted);
        assert!(!cell.is_created());
    }
}

//! Graph nodes of the registry.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::key::TypeKey;
use crate::provider::Provider;

/// A type known to the container, registered or not.
///
/// Entries are created the first time a type is mentioned, either as a
/// registration target or as a dependency. An entry without a provider is a
/// placeholder for a type that something depends on but nobody registered.
pub(crate) struct Entry {
    key: TypeKey,
    provider: OnceCell<Arc<Provider>>,
}

impl Entry {
    pub(crate) fn new(key: TypeKey) -> Self {
        Self {
            key,
            provider: OnceCell::new(),
        }
    }

    pub(crate) fn key(&self) -> &TypeKey {
        &self.key
    }

    pub(crate) fn provider(&self) -> Option<&Arc<Provider>> {
        self.provider.get()
    }

    /// Attaches the provider; fails if one is already attached.
    pub(crate) fn set_provider(&self, provider: Arc<Provider>) -> Result<(), Arc<Provider>> {
        self.provider.set(provider)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.provider() {
            Some(provider) => {
                let count = provider.dependencies().len();
                write!(
                    f,
                    "{} ({} {})",
                    self.key,
                    count,
                    if count == 1 { "dependency" } else { "dependencies" }
                )
            }
            None => write!(f, "{} (no provider)", self.key),
        }
    }
}

//! Type identity used to key registrations.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Opaque identity of a declared type.
///
/// A `TypeKey` is what the container registers providers under and what it
/// looks them up by. Equality and hashing use the `TypeId` only; the name is
/// kept for diagnostics. Two distinct Rust types never produce equal keys,
/// even when they are structurally identical.
///
/// Any `'static` type can be keyed, including trait objects, so a provider
/// can be declared as `dyn Logger` while producing a concrete logger.
///
/// # Examples
///
/// ```rust
/// use servant::TypeKey;
///
/// struct Meters(f64);
/// struct Feet(f64);
/// trait Unit {}
///
/// assert_eq!(TypeKey::of::<Meters>(), TypeKey::of::<Meters>());
/// assert_ne!(TypeKey::of::<Meters>(), TypeKey::of::<Feet>());
/// assert!(TypeKey::of::<dyn Unit>().name().contains("Unit"));
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    /// `TypeId` of `Arc<T>`, the only shape an instance of `T` is stored in.
    carrier: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Creates the key for `T`.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeKey {
            id: TypeId::of::<T>(),
            carrier: TypeId::of::<Arc<T>>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The type name, as reported by `std::any::type_name`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The underlying `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    pub(crate) fn carrier(&self) -> TypeId {
        self.carrier
    }
}

impl PartialEq for TypeKey {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Shorthand for [`TypeKey::of`].
#[inline(always)]
pub fn key_of<T: ?Sized + 'static>() -> TypeKey {
    TypeKey::of::<T>()
}

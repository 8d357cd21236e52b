//! Declared super-type table backing assignability queries.

use std::collections::{HashMap, HashSet};

use crate::key::TypeKey;

/// Manually declared "is assignable to" relation between types.
///
/// Rust has no runtime subtype information, so the container keeps an explicit
/// table: `declare(sub, super)` records that an instance of `sub` may be used
/// where `super` is expected (typically a struct and a trait object it
/// implements). Queries follow declarations transitively.
#[derive(Debug, Default)]
pub(crate) struct TypeHierarchy {
    supers: HashMap<TypeKey, Vec<TypeKey>>,
}

impl TypeHierarchy {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records `super_type` as a direct super-type of `sub`.
    pub(crate) fn declare(&mut self, sub: TypeKey, super_type: TypeKey) {
        if sub == super_type {
            return;
        }
        let direct = self.supers.entry(sub).or_default();
        if !direct.contains(&super_type) {
            direct.push(super_type);
        }
    }

    /// Whether a value of `sub` is assignable to `super_type`.
    pub(crate) fn is_assignable_from(&self, super_type: &TypeKey, sub: &TypeKey) -> bool {
        if super_type == sub {
            return true;
        }

        let mut visited = HashSet::new();
        let mut pending = vec![*sub];
        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(direct) = self.supers.get(&current) {
                if direct.contains(super_type) {
                    return true;
                }
                pending.extend(direct.iter().copied());
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Base {}
    trait Middle: Base {}
    struct Impl;
    struct Other;

    #[test]
    fn test_identity_is_assignable() {
        let h = TypeHierarchy::new();
        let k = TypeKey::of::<Impl>();
        assert!(h.is_assignable_from(&k, &k));
    }

    #[test]
    fn test_transitive_declarations() {
        let mut h = TypeHierarchy::new();
        h.declare(TypeKey::of::<Impl>(), TypeKey::of::<dyn Middle>());
        h.declare(TypeKey::of::<dyn Middle>(), TypeKey::of::<dyn Base>());

        assert!(h.is_assignable_from(&TypeKey::of::<dyn Base>(), &TypeKey::of::<Impl>()));
        assert!(h.is_assignable_from(&TypeKey::of::<dyn Middle>(), &TypeKey::of::<Impl>()));
        assert!(!h.is_assignable_from(&TypeKey::of::<Impl>(), &TypeKey::of::<dyn Base>()));
        assert!(!h.is_assignable_from(&TypeKey::of::<dyn Base>(), &TypeKey::of::<Other>()));
    }

    #[test]
    fn test_declaration_cycles_terminate() {
        let mut h = TypeHierarchy::new();
        h.declare(TypeKey::of::<Impl>(), TypeKey::of::<Other>());
        h.declare(TypeKey::of::<Other>(), TypeKey::of::<Impl>());

        assert!(!h.is_assignable_from(&TypeKey::of::<dyn Base>(), &TypeKey::of::<Impl>()));
    }
}

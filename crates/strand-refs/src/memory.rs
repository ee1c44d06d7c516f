//! In-memory reference registry.
//!
//! [`InMemoryRegistry`] keeps the set of registered resource types in a
//! `BTreeSet` behind a `RwLock`. Registration normally happens once at
//! startup; afterwards the registry is shared read-only by all sessions.

use std::collections::BTreeSet;
use std::sync::RwLock;

use strand_types::ResourceType;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::names::validate_type_name;
use crate::traits::ReferenceRegistry;

/// An in-memory implementation of [`ReferenceRegistry`].
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    types: RwLock<BTreeSet<ResourceType>>,
}

impl InMemoryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the given resource types registered.
    pub fn with_types<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let registry = Self::new();
        for name in names {
            registry.register(name.as_ref())?;
        }
        Ok(registry)
    }

    /// Register a resource type. Returns `Ok(false)` if it was already known.
    pub fn register(&self, name: &str) -> Result<bool> {
        validate_type_name(name)?;
        let mut types = self
            .types
            .write()
            .map_err(|e| RefError::LockPoisoned(e.to_string()))?;
        let added = types.insert(ResourceType::new(name));
        if added {
            debug!(resource_type = name, "registered resource type");
        }
        Ok(added)
    }

    /// Remove a resource type. Returns `Ok(true)` if it was registered.
    pub fn unregister(&self, name: &str) -> Result<bool> {
        let mut types = self
            .types
            .write()
            .map_err(|e| RefError::LockPoisoned(e.to_string()))?;
        Ok(types.remove(&ResourceType::new(name)))
    }

    /// All registered types, sorted by name.
    pub fn registered_types(&self) -> Result<Vec<ResourceType>> {
        let types = self
            .types
            .read()
            .map_err(|e| RefError::LockPoisoned(e.to_string()))?;
        Ok(types.iter().cloned().collect())
    }
}

impl ReferenceRegistry for InMemoryRegistry {
    fn is_registered(&self, ty: &ResourceType) -> Result<bool> {
        let types = self
            .types
            .read()
            .map_err(|e| RefError::LockPoisoned(e.to_string()))?;
        Ok(types.contains(ty))
    }
}

#[cfg(test)]
mod tests {
    use strand_types::Reference;

    use super::*;

    fn registry() -> InMemoryRegistry {
        InMemoryRegistry::with_types(["Person", "Dog"]).unwrap()
    }

    #[test]
    fn register_and_query() {
        let reg = InMemoryRegistry::new();
        assert!(reg.register("Person").unwrap());
        assert!(!reg.register("Person").unwrap());
        assert!(reg.is_registered(&ResourceType::new("Person")).unwrap());
        assert!(!reg.is_registered(&ResourceType::new("Dog")).unwrap());
    }

    #[test]
    fn register_rejects_invalid_name() {
        let reg = InMemoryRegistry::new();
        let err = reg.register("not valid").unwrap_err();
        assert!(matches!(err, RefError::InvalidTypeName { .. }));
    }

    #[test]
    fn unregister_removes_type() {
        let reg = registry();
        assert!(reg.unregister("Dog").unwrap());
        assert!(!reg.unregister("Dog").unwrap());
        assert_eq!(reg.registered_types().unwrap(), vec![ResourceType::new("Person")]);
    }

    #[test]
    fn resolve_registered_reference() {
        let r = registry().resolve("ref:Person:42").unwrap();
        assert_eq!(r, Reference::new("Person", "42"));
    }

    #[test]
    fn resolve_unregistered_type_fails() {
        let err = registry().resolve("ref:Cat:7").unwrap_err();
        assert_eq!(err, RefError::UnknownType { name: "Cat".into() });
    }

    #[test]
    fn resolve_malformed_fails() {
        let err = registry().resolve("Person/42").unwrap_err();
        assert!(matches!(err, RefError::Malformed { .. }));
    }

    #[test]
    fn canonicalize_roundtrip() {
        let reg = registry();
        let r = Reference::new("Dog", "rex-1");
        assert_eq!(reg.resolve(&reg.canonicalize(&r).unwrap()).unwrap(), r);
    }

    #[test]
    fn canonicalize_rejects_what_resolve_would() {
        let reg = registry();
        let err = reg.canonicalize(&Reference::new("Cat", "7")).unwrap_err();
        assert_eq!(err, RefError::UnknownType { name: "Cat".into() });
        let err = reg.canonicalize(&Reference::new("Dog:Person", "1")).unwrap_err();
        assert!(matches!(err, RefError::InvalidTypeName { .. }));
        let err = reg.canonicalize(&Reference::new("Dog", "a b")).unwrap_err();
        assert!(matches!(err, RefError::InvalidIdentity { .. }));
    }

    #[test]
    fn registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InMemoryRegistry>();
    }
}

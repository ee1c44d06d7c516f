use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a schema-typed resource, e.g. `Person` or `Dog`.
///
/// The name itself is not validated here; the reference registry decides
/// which names are acceptable when a type is registered.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(String);

impl ResourceType {
    /// Create a resource type from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceType({})", self.0)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// An unresolved pointer to another resource.
///
/// A `Reference` carries the target's resource type and its opaque identity.
/// It never holds the target's content: resolution happens in the
/// persistence layer, which hands resolved records back through a refs-map.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reference {
    target: ResourceType,
    id: String,
}

impl Reference {
    /// Create a reference to `id` of resource type `target`.
    pub fn new(target: impl Into<ResourceType>, id: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            id: id.into(),
        }
    }

    /// The resource type this reference points at.
    pub fn target(&self) -> &ResourceType {
        &self.target
    }

    /// The opaque identity of the target record.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({}:{})", self.target, self.id)
    }
}

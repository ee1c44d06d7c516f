use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Default name of the discriminator member.
pub const DEFAULT_DISCRIMINATOR: &str = "type";

/// Describes how a polymorphic resource encodes its concrete variant.
///
/// On the wire, a polymorphic object carries the discriminator as its very
/// first member: `{"type": "Dog", ...}`. The tag knows the member name and
/// the closed set of variant names that may appear there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTag {
    field: String,
    variants: Vec<String>,
}

impl TypeTag {
    /// Create a tag with the given discriminator member name and variants.
    pub fn new<I, S>(field: impl Into<String>, variants: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let field = field.into();
        let mut names: Vec<String> = Vec::new();
        for v in variants {
            let v = v.into();
            if names.contains(&v) {
                return Err(TypeError::DuplicateVariant { field, variant: v });
            }
            names.push(v);
        }
        if names.is_empty() {
            return Err(TypeError::EmptyTypeTag { field });
        }
        Ok(Self {
            field,
            variants: names,
        })
    }

    /// A tag using the default `"type"` discriminator member.
    pub fn with_default_field<I, S>(variants: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(DEFAULT_DISCRIMINATOR, variants)
    }

    /// Name of the discriminator member.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns `true` if `variant` is one of this tag's variants.
    pub fn contains(&self, variant: &str) -> bool {
        self.variants.iter().any(|v| v == variant)
    }
}

//! The [`ReferenceRegistry`] trait defining the reference boundary.

use strand_types::{Reference, ResourceType};

use crate::error::{RefError, Result};
use crate::format::{decode_reference, encode_reference, validate_reference};

/// Registry of resource types that references may point at.
///
/// The registry owns the canonical reference format. Implementations must be
/// thread-safe (`Send + Sync`): one registry is typically shared by every
/// session in a process, while each session is used by a single thread.
pub trait ReferenceRegistry: Send + Sync {
    /// Returns `Ok(true)` if `ty` is a registered resource type.
    fn is_registered(&self, ty: &ResourceType) -> Result<bool>;

    /// Decode a canonical reference string into an unresolved reference.
    ///
    /// Fails if the string is malformed or names an unregistered type.
    fn resolve(&self, value: &str) -> Result<Reference> {
        let reference = decode_reference(value)?;
        if !self.is_registered(reference.target())? {
            return Err(RefError::UnknownType {
                name: reference.target().to_string(),
            });
        }
        Ok(reference)
    }

    /// Encode a reference in canonical form.
    ///
    /// Fails if the reference would not decode back to itself or names an
    /// unregistered type, so every string this returns is accepted by
    /// [`resolve`](Self::resolve).
    fn canonicalize(&self, reference: &Reference) -> Result<String> {
        validate_reference(reference)?;
        if !self.is_registered(reference.target())? {
            return Err(RefError::UnknownType {
                name: reference.target().to_string(),
            });
        }
        Ok(encode_reference(reference))
    }
}

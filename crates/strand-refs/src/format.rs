//! Canonical reference strings.
//!
//! A reference is written as `ref:<ResourceType>:<identity>`. The identity is
//! everything after the second separator and may itself contain `:`.

use strand_types::Reference;

use crate::error::{RefError, Result};
use crate::names::{validate_identity, validate_type_name};

/// Scheme prefix of every canonical reference.
pub const REF_PREFIX: &str = "ref";

/// Separator between the prefix, the type name, and the identity.
pub const REF_SEPARATOR: char = ':';

/// Encode a reference in canonical form.
pub fn encode_reference(reference: &Reference) -> String {
    format!(
        "{REF_PREFIX}{REF_SEPARATOR}{}{REF_SEPARATOR}{}",
        reference.target(),
        reference.id()
    )
}

/// Check that `reference` survives encoding: a valid type name (so it holds
/// no separator) and a valid identity.
pub fn validate_reference(reference: &Reference) -> Result<()> {
    validate_type_name(reference.target().as_str())?;
    validate_identity(reference.id())
}

/// Decode a canonical reference string.
///
/// This only checks syntax; whether the named type exists is the registry's
/// concern.
pub fn decode_reference(value: &str) -> Result<Reference> {
    let malformed = |reason: &str| RefError::Malformed {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let mut parts = value.splitn(3, REF_SEPARATOR);
    if parts.next() != Some(REF_PREFIX) {
        return Err(malformed("missing 'ref:' prefix"));
    }
    let type_name = parts.next().ok_or_else(|| malformed("missing resource type"))?;
    let id = parts.next().ok_or_else(|| malformed("missing identity"))?;

    validate_type_name(type_name).map_err(|e| malformed(&e.to_string()))?;
    validate_identity(id).map_err(|e| malformed(&e.to_string()))?;

    Ok(Reference::new(type_name, id))
}

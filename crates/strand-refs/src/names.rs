//! Resource type name and identity validation.
//!
//! Valid resource type names:
//! - Must be non-empty
//! - Must start with an ASCII letter
//! - May only contain ASCII letters, digits, and `_`
//!
//! Valid identities:
//! - Must be non-empty
//! - Must not contain whitespace or control characters

use crate::error::{RefError, Result};

/// Validate a resource type name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use strand_refs::names::validate_type_name;
///
/// assert!(validate_type_name("Person").is_ok());
/// assert!(validate_type_name("order_line2").is_ok());
/// assert!(validate_type_name("").is_err());
/// assert!(validate_type_name("2fast").is_err());
/// assert!(validate_type_name("a:b").is_err());
/// ```
pub fn validate_type_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    match chars.next() {
        None => {
            return Err(RefError::InvalidTypeName {
                name: name.to_string(),
                reason: "type name must not be empty".into(),
            });
        }
        Some(first) if !first.is_ascii_alphabetic() => {
            return Err(RefError::InvalidTypeName {
                name: name.to_string(),
                reason: "must start with an ASCII letter".into(),
            });
        }
        Some(_) => {}
    }

    if let Some(ch) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(RefError::InvalidTypeName {
            name: name.to_string(),
            reason: format!("contains forbidden character: {ch:?}"),
        });
    }

    Ok(())
}

/// Validate the identity part of a reference.
///
/// Identities are opaque to the protocol; they only need to survive the trip
/// through a canonical string unchanged.
pub fn validate_identity(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(RefError::InvalidIdentity {
            id: id.to_string(),
            reason: "identity must not be empty".into(),
        });
    }
    if let Some(ch) = id.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(RefError::InvalidIdentity {
            id: id.to_string(),
            reason: format!("contains forbidden character: {ch:?}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_type_names() {
        assert!(validate_type_name("Person").is_ok());
        assert!(validate_type_name("p").is_ok());
        assert!(validate_type_name("Order_Line_2").is_ok());
    }

    #[test]
    fn reject_empty_type_name() {
        assert!(validate_type_name("").is_err());
    }

    #[test]
    fn reject_leading_non_letter() {
        assert!(validate_type_name("_Person").is_err());
        assert!(validate_type_name("9lives").is_err());
    }

    #[test]
    fn reject_separator_and_punctuation() {
        assert!(validate_type_name("a:b").is_err());
        assert!(validate_type_name("a-b").is_err());
        assert!(validate_type_name("a b").is_err());
        assert!(validate_type_name("Persön").is_err());
    }

    #[test]
    fn valid_identities() {
        assert!(validate_identity("42").is_ok());
        assert!(validate_identity("a:b:c").is_ok());
        assert!(validate_identity("0189f7e2-5b6d-7c4a").is_ok());
    }

    #[test]
    fn reject_bad_identities() {
        assert!(validate_identity("").is_err());
        assert!(validate_identity("has space").is_err());
        assert!(validate_identity("tab\there").is_err());
        assert!(validate_identity("nul\u{0}").is_err());
    }
}

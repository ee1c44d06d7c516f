//! Error types for reference operations.

use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefError {
    /// The string is not a canonical reference.
    #[error("malformed reference {value:?}: {reason}")]
    Malformed { value: String, reason: String },

    /// The reference names a resource type the registry does not know.
    #[error("unknown resource type in reference: {name}")]
    UnknownType { name: String },

    /// The resource type name is invalid.
    #[error("invalid resource type name {name:?}: {reason}")]
    InvalidTypeName { name: String, reason: String },

    /// The identity part of a reference is invalid.
    #[error("invalid reference identity {id:?}: {reason}")]
    InvalidIdentity { id: String, reason: String },

    /// The registry's lock was poisoned by a panicking writer.
    #[error("registry lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Convenience type alias for reference operations.
pub type Result<T> = std::result::Result<T, RefError>;

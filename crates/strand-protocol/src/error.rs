use std::path::PathBuf;

use strand_refs::RefError;
use strand_types::{TypeError, ValueKind};
use strand_wire::WireError;
use thiserror::Error;

/// How a [`SessionError`] should be handled by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input was rejected. Recoverable at the request boundary, never
    /// retried automatically.
    Data,
    /// The schema walker drove the session in an impossible order. Fatal for
    /// the current call.
    State,
    /// The underlying stream failed.
    Io,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("malformed input: {0}")]
    Malformed(WireError),

    #[error("input contains no document")]
    EmptyDocument,

    #[error("invalid value type: expected {expected}, found {found}")]
    InvalidValueType { expected: String, found: String },

    #[error("{value} is out of range for {kind}")]
    OutOfRange { kind: ValueKind, value: String },

    #[error("unknown enum constant {value:?}")]
    UnknownEnumConstant { value: String },

    #[error("unknown variant {variant:?} for discriminator {field:?}")]
    UnknownVariant { field: String, variant: String },

    #[error("discriminator {field:?} must be the first member, found {found}")]
    DiscriminatorNotFirst { field: String, found: String },

    #[error("invalid reference: {0}")]
    InvalidReference(RefError),

    #[error("invalid date: {0}")]
    InvalidDate(TypeError),

    #[error("number is not finite: {0}")]
    NonFinite(f64),

    #[error("member name {name:?} set while {pending:?} is still pending")]
    PendingNameCollision { pending: String, name: String },

    #[error("member name {0:?} was never followed by a value")]
    DanglingName(String),

    #[error("structural error: {0}")]
    Structure(String),

    #[error("stream out of sync: expected {expected}, found {found}")]
    Desync { expected: String, found: String },

    #[error("variant {variant:?} is not declared for discriminator {field:?}")]
    UndeclaredVariant { field: String, variant: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Malformed(_)
            | Self::EmptyDocument
            | Self::InvalidValueType { .. }
            | Self::OutOfRange { .. }
            | Self::UnknownEnumConstant { .. }
            | Self::UnknownVariant { .. }
            | Self::DiscriminatorNotFirst { .. }
            | Self::InvalidDate(_)
            | Self::NonFinite(_) => ErrorKind::Data,
            Self::InvalidReference(RefError::LockPoisoned(_)) => ErrorKind::State,
            Self::InvalidReference(_) => ErrorKind::Data,
            Self::PendingNameCollision { .. }
            | Self::DanglingName(_)
            | Self::Structure(_)
            | Self::Desync { .. }
            | Self::UndeclaredVariant { .. } => ErrorKind::State,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub fn is_data_error(&self) -> bool {
        self.kind() == ErrorKind::Data
    }

    pub fn is_state_error(&self) -> bool {
        self.kind() == ErrorKind::State
    }

    pub fn is_io_error(&self) -> bool {
        self.kind() == ErrorKind::Io
    }
}

impl From<WireError> for SessionError {
    fn from(e: WireError) -> Self {
        match e {
            WireError::Io(io) => Self::Io(io),
            WireError::Structure(msg) => Self::Structure(msg),
            WireError::InvalidNumber(text) => {
                Self::Structure(format!("invalid number literal {text:?}"))
            }
            WireError::NonFinite(v) => Self::NonFinite(v),
            other => Self::Malformed(other),
        }
    }
}

impl From<RefError> for SessionError {
    fn from(e: RefError) -> Self {
        Self::InvalidReference(e)
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Errors produced while loading a [`SessionConfig`](crate::SessionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn wire_input_errors_are_data_errors() {
        let e = SessionError::from(WireError::UnexpectedEof { offset: 3 });
        assert_eq!(e.kind(), ErrorKind::Data);
        let e = SessionError::from(WireError::Syntax { offset: 0, reason: "x".into() });
        assert!(e.is_data_error());
    }

    #[test]
    fn wire_structure_errors_are_state_errors() {
        let e = SessionError::from(WireError::Structure("unbalanced".into()));
        assert!(e.is_state_error());
    }

    #[test]
    fn io_errors_stay_io_errors() {
        let e = SessionError::from(WireError::Io(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "gone",
        )));
        assert!(e.is_io_error());
        match e {
            SessionError::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reference_errors_are_data_unless_poisoned() {
        let e = SessionError::from(RefError::UnknownType { name: "Cat".into() });
        assert!(e.is_data_error());
        let e = SessionError::from(RefError::LockPoisoned("boom".into()));
        assert!(e.is_state_error());
    }
}

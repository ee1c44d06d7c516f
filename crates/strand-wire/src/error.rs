use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("syntax error at byte {offset}: {reason}")]
    Syntax { offset: u64, reason: String },

    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof { offset: u64 },

    #[error("nesting deeper than {limit} levels at byte {offset}")]
    DepthLimit { limit: usize, offset: u64 },

    #[error("invalid token sequence: {0}")]
    Structure(String),

    #[error("invalid number literal: {0:?}")]
    InvalidNumber(String),

    #[error("number is not finite: {0}")]
    NonFinite(f64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WireResult<T> = Result<T, WireError>;

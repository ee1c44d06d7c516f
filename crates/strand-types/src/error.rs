use thiserror::Error;

/// Errors produced by value model operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid decimal literal: {0:?}")]
    InvalidDecimal(String),

    #[error("invalid date {value:?}: expected yyyy-MM-ddTHH:mm:ssZ")]
    InvalidDate { value: String },

    #[error("type tag must name at least one variant (field {field:?})")]
    EmptyTypeTag { field: String },

    #[error("duplicate variant {variant:?} in type tag {field:?}")]
    DuplicateVariant { field: String, variant: String },
}

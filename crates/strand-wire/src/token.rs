use std::fmt;

/// One lexical unit of the JSON token stream.
///
/// Numbers keep their exact source text; converting to a concrete width is
/// the caller's job so that range checks can report the original value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    /// An object member name.
    Name(String),
    String(String),
    Number(String),
    Bool(bool),
    Null,
}

impl Token {
    /// Short human-readable description for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::StartObject => "object start",
            Self::EndObject => "object end",
            Self::StartArray => "array start",
            Self::EndArray => "array end",
            Self::Name(_) => "member name",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
            Self::Null => "null",
        }
    }

    /// Returns `true` for complete single-token values.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::String(_) | Self::Number(_) | Self::Bool(_) | Self::Null)
    }

    /// Returns `true` for tokens that open a structure.
    pub fn is_start(&self) -> bool {
        matches!(self, Self::StartObject | Self::StartArray)
    }

    /// Returns `true` for tokens that close a structure.
    pub fn is_end(&self) -> bool {
        matches!(self, Self::EndObject | Self::EndArray)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(n) => write!(f, "member name {n:?}"),
            Self::String(s) => write!(f, "string {s:?}"),
            Self::Number(n) => write!(f, "number {n}"),
            Self::Bool(b) => write!(f, "boolean {b}"),
            other => f.write_str(other.describe()),
        }
    }
}

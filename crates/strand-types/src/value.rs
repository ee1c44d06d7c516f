use std::fmt;

use chrono::{DateTime, Utc};

use crate::decimal::Decimal;
use crate::reference::Reference;

/// The closed set of primitive value kinds a resource property may have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Byte,
    Short,
    Int,
    Long,
    Boolean,
    Float,
    Double,
    Decimal,
    Enum,
    Date,
    Reference,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Enum => "enum",
            Self::Date => "date",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded primitive value. Absence is modelled by `Option<Value>`.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Boolean(bool),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    /// Wire constant of an enum value.
    Enum(String),
    Date(DateTime<Utc>),
    Reference(Reference),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Byte(_) => ValueKind::Byte,
            Self::Short(_) => ValueKind::Short,
            Self::Int(_) => ValueKind::Int,
            Self::Long(_) => ValueKind::Long,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::Enum(_) => ValueKind::Enum,
            Self::Date(_) => ValueKind::Date,
            Self::Reference(_) => ValueKind::Reference,
        }
    }

    /// Wrap an enum value by its wire constant.
    pub fn from_enum<E: WireEnum>(value: &E) -> Self {
        Self::Enum(value.to_wire().to_string())
    }
}

/// A Rust enum whose values travel as string constants.
///
/// ```
/// use strand_types::WireEnum;
///
/// #[derive(Debug, PartialEq)]
/// enum Size { Small, Large }
///
/// impl WireEnum for Size {
///     fn from_wire(s: &str) -> Option<Self> {
///         match s {
///             "SMALL" => Some(Size::Small),
///             "LARGE" => Some(Size::Large),
///             _ => None,
///         }
///     }
///     fn to_wire(&self) -> &'static str {
///         match self {
///             Size::Small => "SMALL",
///             Size::Large => "LARGE",
///         }
///     }
/// }
///
/// assert_eq!(Size::from_wire("LARGE"), Some(Size::Large));
/// ```
pub trait WireEnum: Sized {
    /// Look up a value by its wire constant; `None` if unknown.
    fn from_wire(s: &str) -> Option<Self>;

    /// The wire constant for this value.
    fn to_wire(&self) -> &'static str;
}

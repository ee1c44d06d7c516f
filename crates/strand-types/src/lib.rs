//! Value model for the Strand resource protocol.
//!
//! This crate provides the primitive and structural vocabulary shared by the
//! reference registry, the token layer, and the read/write sessions. Every
//! other Strand crate depends on `strand-types`.
//!
//! # Key Types
//!
//! - [`ResourceType`]: Name of a schema-typed resource (e.g. `Person`)
//! - [`Reference`]: Unresolved pointer to another resource
//! - [`Decimal`]: Arbitrary-precision number kept as its exact lexeme
//! - [`TypeTag`]: Discriminator descriptor for polymorphic objects
//! - [`ValueKind`] / [`Value`]: Closed tagged union of primitive kinds
//! - [`WireEnum`]: Mapping between Rust enums and their wire constants
//! - [`DateCodec`]: Fixed-format UTC date text codec

pub mod date;
pub mod decimal;
pub mod error;
pub mod reference;
pub mod tag;
pub mod value;

pub use date::{DateCodec, DATE_FORMAT};
pub use decimal::{is_number_literal, Decimal};
pub use error::TypeError;
pub use reference::{Reference, ResourceType};
pub use tag::{TypeTag, DEFAULT_DISCRIMINATOR};
pub use value::{Value, ValueKind, WireEnum};

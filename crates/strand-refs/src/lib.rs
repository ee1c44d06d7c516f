//! Reference management for the Strand resource protocol.
//!
//! References are lazy pointers from one resource to another. On the wire a
//! reference travels as a single canonical string that names the target's
//! resource type and identity, e.g. `ref:Person:42`. This crate owns that
//! format and the bookkeeping around it.
//!
//! # Architecture
//!
//! - The **registry** knows which resource types exist. Decoding a reference
//!   whose type is not registered fails; the registry never looks up the
//!   target record itself.
//! - A **refs-map** carries records the persistence layer resolved for a
//!   response, keyed by canonical string, so each referenced record is
//!   emitted once no matter how often (or how cyclically) it is referenced.
//! - A **collector** accumulates the references seen while reading, for a
//!   later batch fetch.
//!
//! # Modules
//!
//! - [`error`]: Error types for reference operations
//! - [`format`]: Canonical string encoding and syntax-level decoding
//! - [`names`]: Resource type name and identity validation
//! - [`traits`]: The [`ReferenceRegistry`] trait
//! - [`memory`]: In-memory [`InMemoryRegistry`]
//! - [`refs_map`]: [`RefsMap`] of resolved records
//! - [`collector`]: [`ReferenceCollector`]

pub mod collector;
pub mod error;
pub mod format;
pub mod memory;
pub mod names;
pub mod refs_map;
pub mod traits;

pub use collector::ReferenceCollector;
pub use error::{RefError, Result};
pub use format::{decode_reference, encode_reference, validate_reference, REF_PREFIX, REF_SEPARATOR};
pub use memory::InMemoryRegistry;
pub use names::{validate_identity, validate_type_name};
pub use refs_map::RefsMap;
pub use traits::ReferenceRegistry;

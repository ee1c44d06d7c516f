//! Streaming (de)serialization sessions for the Strand resource protocol.
//!
//! A schema walker, generated or hand-written per resource type, drives a
//! session with typed calls. The session owns no schema knowledge of its
//! own; it turns the walker's calls into JSON tokens and back.
//!
//! # Reading
//!
//! [`ReadSession`] consumes one token per call and never looks ahead. Reads
//! return `Option<T>`: `None` means either a `null` value or the end of the
//! enclosing collection, told apart by
//! [`ReadSession::was_collection_end`]. Polymorphic objects carry their
//! variant in a discriminator member that must come first, read with
//! [`ReadSession::read_object_type`]. Members the walker does not know are
//! skipped whole with [`ReadSession::swallow_value`].
//!
//! # Writing
//!
//! [`WriteSession`] buffers one pending member name, set by
//! [`WriteSession::add_property`] or [`WriteSession::write_key`] and emitted
//! by the next write or start call.
//!
//! # Documents
//!
//! [`write_document`] and [`read_document`] wrap the primary record(s) and
//! the side-loaded referenced records in one envelope; walkers plug in via
//! [`WriteResource`] and [`ReadResource`].
//!
//! # Errors
//!
//! Every failure is a [`SessionError`], classified by [`ErrorKind`] as bad
//! input, walker misuse, or I/O.

pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod read;
pub mod write;

#[cfg(test)]
mod fixtures;

pub use config::SessionConfig;
pub use document::{
    read_document, read_resource, write_document, Document, Primary, ReadResource, WriteResource,
    DATA_SECTION, REFS_SECTION,
};
pub use error::{ConfigError, ErrorKind, SessionError, SessionResult};
pub use read::ReadSession;
pub use write::WriteSession;

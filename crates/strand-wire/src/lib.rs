//! JSON token stream for the Strand resource protocol.
//!
//! The sessions in `strand-protocol` never see JSON text. They pull
//! [`Token`]s from a [`JsonTokenReader`] and push them into a
//! [`JsonTokenWriter`]:
//!
//! - The reader is strictly forward-only. It exposes no peek; every call
//!   consumes exactly one token.
//! - The writer tracks the open structures and refuses token sequences that
//!   would produce malformed JSON (unbalanced ends, values without member
//!   names, a second top-level value).
//!
//! Syntax problems in the input are reported as [`WireError::Syntax`] or
//! [`WireError::UnexpectedEof`]; misuse of the writer as
//! [`WireError::Structure`]; I/O failures are passed through untouched as
//! [`WireError::Io`].

pub mod error;
pub mod reader;
pub mod token;
pub mod writer;

pub use error::{WireError, WireResult};
pub use reader::{JsonTokenReader, DEFAULT_MAX_DEPTH};
pub use token::Token;
pub use writer::JsonTokenWriter;

//! The response envelope: a primary section plus the side-loaded records
//! its references point at.
//!
//! ```json
//! {"data": {...} | [...], "refs": {"ref:Person:42": {...}}}
//! ```

use std::io::{BufRead, Write};

use strand_refs::{ReferenceRegistry, RefsMap};
use tracing::{debug, trace};

use crate::error::{SessionError, SessionResult};
use crate::read::{Opened, ReadSession};
use crate::write::WriteSession;

pub const DATA_SECTION: &str = "data";
pub const REFS_SECTION: &str = "refs";

/// Serialization half of a schema walker.
pub trait WriteResource {
    /// Write `self` as one complete object, discriminator first if the type
    /// is polymorphic.
    fn write_resource<W: Write>(&self, session: &mut WriteSession<'_, W>) -> SessionResult<()>;
}

/// Deserialization half of a schema walker.
pub trait ReadResource: Sized {
    /// Read the members of an object the session has just entered, up to and
    /// including its end.
    fn read_fields<R: BufRead>(session: &mut ReadSession<'_, R>) -> SessionResult<Self>;
}

/// The primary section of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Primary<T> {
    Single(Option<T>),
    Collection(Vec<T>),
}

impl<T> Primary<T> {
    pub fn len(&self) -> usize {
        match self {
            Primary::Single(record) => usize::from(record.is_some()),
            Primary::Collection(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (single, many) = match self {
            Primary::Single(record) => (record.as_ref(), &[][..]),
            Primary::Collection(records) => (None, records.as_slice()),
        };
        single.into_iter().chain(many)
    }
}

impl<T> Default for Primary<T> {
    fn default() -> Self {
        Primary::Single(None)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document<T> {
    pub data: Primary<T>,
    pub refs: RefsMap<T>,
}

impl<T> Document<T> {
    pub fn new(data: Primary<T>) -> Self {
        Self {
            data,
            refs: RefsMap::new(),
        }
    }

    pub fn with_refs(data: Primary<T>, refs: RefsMap<T>) -> Self {
        Self { data, refs }
    }
}

/// Enter an object and read it with `T`'s walker. `None` if the value was
/// `null` or the enclosing collection ended.
pub fn read_resource<T: ReadResource, R: BufRead>(
    session: &mut ReadSession<'_, R>,
) -> SessionResult<Option<T>> {
    if session.enter_object()? {
        T::read_fields(session).map(Some)
    } else {
        Ok(None)
    }
}

/// Write a complete document. The refs section is left out when `refs` is
/// empty.
pub fn write_document<T: WriteResource, W: Write>(
    session: &mut WriteSession<'_, W>,
    data: &Primary<T>,
    refs: &RefsMap<T>,
) -> SessionResult<()> {
    session.start_object()?;
    session.add_property(DATA_SECTION)?;
    match data {
        Primary::Single(Some(record)) => record.write_resource(session)?,
        Primary::Single(None) => session.write_null()?,
        Primary::Collection(records) => {
            session.start_collection()?;
            for record in records {
                record.write_resource(session)?;
            }
            session.end_collection()?;
        }
    }
    if !refs.is_empty() {
        session.add_property(REFS_SECTION)?;
        session.start_map()?;
        for (key, record) in refs {
            session.write_key(key.as_str())?;
            record.write_resource(session)?;
        }
        session.end_map()?;
    }
    session.end_object()?;
    debug!(records = data.len(), refs = refs.len(), "wrote document");
    Ok(())
}

/// Read a complete document. Whether the primary section is one record or a
/// collection is taken from the input. Unknown top-level members are skipped.
pub fn read_document<T: ReadResource, R: BufRead>(
    session: &mut ReadSession<'_, R>,
) -> SessionResult<Document<T>> {
    if !session.enter_object()? {
        return Err(SessionError::InvalidValueType {
            expected: "document object".into(),
            found: "null".into(),
        });
    }
    let mut document = Document::new(Primary::default());
    while let Some(name) = session.next_property()? {
        match name.as_str() {
            DATA_SECTION => document.data = read_primary(session)?,
            REFS_SECTION => document.refs = read_refs(session)?,
            other => {
                trace!(member = other, "skipping unknown document member");
                session.swallow_value()?;
            }
        }
    }
    debug!(
        records = document.data.len(),
        refs = document.refs.len(),
        "read document"
    );
    Ok(document)
}

fn read_primary<T: ReadResource, R: BufRead>(
    session: &mut ReadSession<'_, R>,
) -> SessionResult<Primary<T>> {
    match session.enter_either()? {
        None => Ok(Primary::Single(None)),
        Some(Opened::Object) => Ok(Primary::Single(Some(T::read_fields(session)?))),
        Some(Opened::Array) => {
            let mut records = Vec::new();
            loop {
                match read_resource(session)? {
                    Some(record) => records.push(record),
                    None if session.was_collection_end() => break,
                    None => trace!("skipping null primary record"),
                }
            }
            Ok(Primary::Collection(records))
        }
    }
}

fn read_refs<T: ReadResource, R: BufRead>(
    session: &mut ReadSession<'_, R>,
) -> SessionResult<RefsMap<T>> {
    let mut refs = RefsMap::new();
    if !session.enter_map()? {
        return Ok(refs);
    }
    while let Some(key) = session.next_key()? {
        let reference = session.registry().resolve(&key)?;
        match read_resource(session)? {
            Some(record) => {
                refs.insert_reference(&reference, record);
            }
            None => trace!(key = key.as_str(), "skipping null refs entry"),
        }
    }
    Ok(refs)
}

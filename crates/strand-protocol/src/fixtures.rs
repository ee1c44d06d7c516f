//! Hand-written schema walkers for a small pet-shop model, shared by the
//! session tests.

use std::io::{BufRead, Write};

use strand_types::{Reference, TypeTag};

use crate::document::{ReadResource, WriteResource};
use crate::error::SessionResult;
use crate::read::ReadSession;
use crate::write::WriteSession;

pub fn pet_tag() -> TypeTag {
    TypeTag::with_default_field(["Dog", "Cat"]).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pet {
    Dog {
        name: String,
        tags: Vec<String>,
        owner: Option<Reference>,
    },
    Cat {
        name: String,
        lives: Option<i32>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub friend: Option<Reference>,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>, friend: Option<Reference>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            friend,
        }
    }
}

fn write_optional<W: Write, T>(
    session: &mut WriteSession<'_, W>,
    name: &str,
    value: Option<&T>,
    write: impl FnOnce(&mut WriteSession<'_, W>, &T) -> SessionResult<()>,
) -> SessionResult<()> {
    match value {
        Some(value) => {
            session.add_property(name)?;
            write(session, value)
        }
        None if session.drop_nulls() => Ok(()),
        None => {
            session.add_property(name)?;
            session.write_null()
        }
    }
}

impl WriteResource for Pet {
    fn write_resource<W: Write>(&self, session: &mut WriteSession<'_, W>) -> SessionResult<()> {
        match self {
            Pet::Dog { name, tags, owner } => {
                session.start_variant(&pet_tag(), "Dog")?;
                session.add_property("name")?;
                session.write_string_value(name)?;
                session.add_property("tags")?;
                session.start_collection()?;
                for tag in tags {
                    session.write_string_value(tag)?;
                }
                session.end_collection()?;
                write_optional(session, "owner", owner.as_ref(), |s, r| s.write_ref_value(r))?;
            }
            Pet::Cat { name, lives } => {
                session.start_variant(&pet_tag(), "Cat")?;
                session.add_property("name")?;
                session.write_string_value(name)?;
                write_optional(session, "lives", lives.as_ref(), |s, n| s.write_int_value(*n))?;
            }
        }
        session.end_object()
    }
}

impl ReadResource for Pet {
    fn read_fields<R: BufRead>(session: &mut ReadSession<'_, R>) -> SessionResult<Self> {
        let variant = session.read_object_type(&pet_tag())?;
        let mut name = String::new();
        let mut tags = Vec::new();
        let mut owner = None;
        let mut lives = None;
        while let Some(property) = session.next_property()? {
            match property.as_str() {
                "name" => name = session.read_string_value()?.unwrap_or_default(),
                "tags" => {
                    if session.enter_collection()? {
                        loop {
                            match session.read_string_value()? {
                                Some(tag) => tags.push(tag),
                                None if session.was_collection_end() => break,
                                None => {}
                            }
                        }
                    }
                }
                "owner" => owner = session.read_ref_value()?,
                "lives" => lives = session.read_int_value()?,
                _ => session.swallow_value()?,
            }
        }
        Ok(match variant.as_str() {
            "Dog" => Pet::Dog { name, tags, owner },
            _ => Pet::Cat { name, lives },
        })
    }
}

impl WriteResource for Person {
    fn write_resource<W: Write>(&self, session: &mut WriteSession<'_, W>) -> SessionResult<()> {
        session.start_object()?;
        session.add_property("id")?;
        session.write_string_value(&self.id)?;
        session.add_property("name")?;
        session.write_string_value(&self.name)?;
        write_optional(session, "friend", self.friend.as_ref(), |s, r| s.write_ref_value(r))?;
        session.end_object()
    }
}

impl ReadResource for Person {
    fn read_fields<R: BufRead>(session: &mut ReadSession<'_, R>) -> SessionResult<Self> {
        let mut person = Person::new("", "", None);
        while let Some(property) = session.next_property()? {
            match property.as_str() {
                "id" => person.id = session.read_string_value()?.unwrap_or_default(),
                "name" => person.name = session.read_string_value()?.unwrap_or_default(),
                "friend" => person.friend = session.read_ref_value()?,
                _ => session.swallow_value()?,
            }
        }
        Ok(person)
    }
}

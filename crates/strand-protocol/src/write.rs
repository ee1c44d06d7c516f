use std::io::Write;

use chrono::{DateTime, Utc};
use strand_refs::ReferenceRegistry;
use strand_types::{DateCodec, Decimal, Reference, TypeTag, Value, WireEnum};
use strand_wire::JsonTokenWriter;
use tracing::debug;

use crate::codec;
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};

/// Serialization session driven by a schema walker.
///
/// A member name registered with [`add_property`](Self::add_property) or
/// [`write_key`](Self::write_key) is held until the next write or start
/// call, which emits it in front of the value. Without a pending name the
/// value is written as the next element of the enclosing collection.
///
/// Nesting is checked by the underlying token writer; an unbalanced end or a
/// value with no open context surfaces as a state error.
pub struct WriteSession<'a, W: Write> {
    writer: JsonTokenWriter<W>,
    registry: &'a dyn ReferenceRegistry,
    dates: DateCodec,
    pending: Option<String>,
    drop_nulls: bool,
}

impl<'a, W: Write> WriteSession<'a, W> {
    pub fn new(
        writer: JsonTokenWriter<W>,
        registry: &'a dyn ReferenceRegistry,
        config: &SessionConfig,
    ) -> Self {
        debug!(drop_nulls = config.drop_nulls, "write session opened");
        Self {
            writer,
            registry,
            dates: DateCodec::new(),
            pending: None,
            drop_nulls: config.drop_nulls,
        }
    }

    /// Compact JSON output to `out`.
    pub fn to_writer(out: W, registry: &'a dyn ReferenceRegistry, config: &SessionConfig) -> Self {
        Self::new(JsonTokenWriter::new(out), registry, config)
    }

    /// Whether walkers should omit null-valued members. Advisory only: the
    /// session writes whatever it is asked to write.
    pub fn drop_nulls(&self) -> bool {
        self.drop_nulls
    }

    /// Register the name of the next object member.
    pub fn add_property(&mut self, name: impl Into<String>) -> SessionResult<()> {
        let name = name.into();
        if let Some(pending) = &self.pending {
            return Err(SessionError::PendingNameCollision {
                pending: pending.clone(),
                name,
            });
        }
        self.pending = Some(name);
        Ok(())
    }

    /// Register the key of the next map entry.
    pub fn write_key(&mut self, key: impl Into<String>) -> SessionResult<()> {
        self.add_property(key)
    }

    pub fn start_object(&mut self) -> SessionResult<()> {
        self.emit_pending()?;
        self.writer.write_start_object()?;
        Ok(())
    }

    /// Open a polymorphic object and write its discriminator as the first
    /// member.
    pub fn start_variant(&mut self, tag: &TypeTag, variant: &str) -> SessionResult<()> {
        if !tag.contains(variant) {
            return Err(SessionError::UndeclaredVariant {
                field: tag.field().to_string(),
                variant: variant.to_string(),
            });
        }
        self.start_object()?;
        self.writer.write_name(tag.field())?;
        self.writer.write_string(variant)?;
        Ok(())
    }

    pub fn end_object(&mut self) -> SessionResult<()> {
        self.check_no_pending()?;
        self.writer.write_end_object()?;
        Ok(())
    }

    pub fn start_collection(&mut self) -> SessionResult<()> {
        self.emit_pending()?;
        self.writer.write_start_array()?;
        Ok(())
    }

    pub fn end_collection(&mut self) -> SessionResult<()> {
        self.check_no_pending()?;
        self.writer.write_end_array()?;
        Ok(())
    }

    pub fn start_map(&mut self) -> SessionResult<()> {
        self.start_object()
    }

    pub fn end_map(&mut self) -> SessionResult<()> {
        self.end_object()
    }

    pub fn write_null(&mut self) -> SessionResult<()> {
        self.emit(|w| w.write_null())
    }

    pub fn write_string_value(&mut self, value: &str) -> SessionResult<()> {
        self.emit(|w| w.write_string(value))
    }

    pub fn write_byte_value(&mut self, value: i8) -> SessionResult<()> {
        self.emit(|w| w.write_i64(i64::from(value)))
    }

    pub fn write_short_value(&mut self, value: i16) -> SessionResult<()> {
        self.emit(|w| w.write_i64(i64::from(value)))
    }

    pub fn write_int_value(&mut self, value: i32) -> SessionResult<()> {
        self.emit(|w| w.write_i64(i64::from(value)))
    }

    pub fn write_long_value(&mut self, value: i64) -> SessionResult<()> {
        self.emit(|w| w.write_i64(value))
    }

    pub fn write_boolean_value(&mut self, value: bool) -> SessionResult<()> {
        self.emit(|w| w.write_bool(value))
    }

    pub fn write_float_value(&mut self, value: f32) -> SessionResult<()> {
        self.emit(|w| w.write_f32(value))
    }

    pub fn write_double_value(&mut self, value: f64) -> SessionResult<()> {
        self.emit(|w| w.write_f64(value))
    }

    pub fn write_decimal_value(&mut self, value: &Decimal) -> SessionResult<()> {
        self.emit(|w| w.write_number_literal(value.as_str()))
    }

    pub fn write_enum_value<E: WireEnum>(&mut self, value: &E) -> SessionResult<()> {
        self.emit(|w| w.write_string(value.to_wire()))
    }

    pub fn write_date_value(&mut self, value: &DateTime<Utc>) -> SessionResult<()> {
        let text = self.dates.format(value);
        self.emit(|w| w.write_string(&text))
    }

    /// Write a reference. Fails if it could not be read back as the same
    /// reference.
    pub fn write_ref_value(&mut self, value: &Reference) -> SessionResult<()> {
        let text = self.registry.canonicalize(value)?;
        self.emit(|w| w.write_string(&text))
    }

    /// Write a value of a kind chosen at run time.
    pub fn write_value(&mut self, value: &Value) -> SessionResult<()> {
        if let Value::Reference(reference) = value {
            return self.write_ref_value(reference);
        }
        self.emit_pending()?;
        codec::encode_value(&mut self.writer, value, self.registry, &self.dates)
    }

    /// Check that one complete document was written and return the sink.
    pub fn finish(self) -> SessionResult<W> {
        if let Some(name) = self.pending {
            return Err(SessionError::DanglingName(name));
        }
        let out = self.writer.finish()?;
        debug!("write session finished");
        Ok(out)
    }

    fn emit(
        &mut self,
        write: impl FnOnce(&mut JsonTokenWriter<W>) -> strand_wire::WireResult<()>,
    ) -> SessionResult<()> {
        self.emit_pending()?;
        write(&mut self.writer)?;
        Ok(())
    }

    fn emit_pending(&mut self) -> SessionResult<()> {
        if let Some(name) = self.pending.take() {
            self.writer.write_name(&name)?;
        }
        Ok(())
    }

    fn check_no_pending(&self) -> SessionResult<()> {
        match &self.pending {
            Some(name) => Err(SessionError::DanglingName(name.clone())),
            None => Ok(()),
        }
    }
}

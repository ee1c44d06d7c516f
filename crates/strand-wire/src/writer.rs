use std::io::{self, Write};

use strand_types::is_number_literal;

use crate::error::{WireError, WireResult};
use crate::token::Token;

#[derive(Debug)]
struct Frame {
    is_object: bool,
    /// Members or elements written so far.
    count: usize,
    /// A member name was written and its value is still owed.
    awaiting_value: bool,
}

/// Generator that writes a JSON token stream to a byte sink.
///
/// The writer keeps the stack of open structures and rejects any call that
/// would produce malformed output with [`WireError::Structure`].
#[derive(Debug)]
pub struct JsonTokenWriter<W> {
    out: W,
    stack: Vec<Frame>,
    root_written: bool,
    indent: Option<usize>,
}

impl<W: Write> JsonTokenWriter<W> {
    /// Compact output with no insignificant whitespace.
    pub fn new(out: W) -> Self {
        Self {
            out,
            stack: Vec::new(),
            root_written: false,
            indent: None,
        }
    }

    /// Indented output, `width` spaces per level.
    pub fn pretty(out: W, width: usize) -> Self {
        Self {
            indent: Some(width),
            ..Self::new(out)
        }
    }

    /// Number of structures currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns `true` once a complete top-level value has been written.
    pub fn is_complete(&self) -> bool {
        self.root_written && self.stack.is_empty()
    }

    pub fn write_start_object(&mut self) -> WireResult<()> {
        self.before_value()?;
        self.out.write_all(b"{")?;
        self.stack.push(Frame {
            is_object: true,
            count: 0,
            awaiting_value: false,
        });
        Ok(())
    }

    pub fn write_end_object(&mut self) -> WireResult<()> {
        match self.stack.last() {
            Some(frame) if frame.is_object && !frame.awaiting_value => {}
            Some(frame) if frame.is_object => {
                return Err(WireError::Structure(
                    "object closed while a member value is pending".into(),
                ))
            }
            Some(_) => return Err(WireError::Structure("object end inside an array".into())),
            None => return Err(WireError::Structure("object end with no open object".into())),
        }
        self.close(b"}")
    }

    pub fn write_start_array(&mut self) -> WireResult<()> {
        self.before_value()?;
        self.out.write_all(b"[")?;
        self.stack.push(Frame {
            is_object: false,
            count: 0,
            awaiting_value: false,
        });
        Ok(())
    }

    pub fn write_end_array(&mut self) -> WireResult<()> {
        match self.stack.last() {
            Some(frame) if !frame.is_object => {}
            Some(_) => return Err(WireError::Structure("array end inside an object".into())),
            None => return Err(WireError::Structure("array end with no open array".into())),
        }
        self.close(b"]")
    }

    /// Write an object member name. The next call must write its value.
    pub fn write_name(&mut self, name: &str) -> WireResult<()> {
        let frame = match self.stack.last_mut() {
            Some(frame) if frame.is_object && !frame.awaiting_value => frame,
            Some(frame) if frame.is_object => {
                return Err(WireError::Structure(format!(
                    "member name {name:?} written while another member value is pending"
                )))
            }
            _ => {
                return Err(WireError::Structure(format!(
                    "member name {name:?} written outside an object"
                )))
            }
        };
        let first = frame.count == 0;
        frame.count += 1;
        frame.awaiting_value = true;
        if !first {
            self.out.write_all(b",")?;
        }
        self.newline()?;
        write_escaped(&mut self.out, name)?;
        self.out.write_all(if self.indent.is_some() { b": " } else { b":" })?;
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> WireResult<()> {
        self.before_value()?;
        write_escaped(&mut self.out, value)?;
        self.value_done();
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> WireResult<()> {
        self.write_raw(if value { "true" } else { "false" })
    }

    pub fn write_null(&mut self) -> WireResult<()> {
        self.write_raw("null")
    }

    pub fn write_i64(&mut self, value: i64) -> WireResult<()> {
        self.write_raw(&value.to_string())
    }

    /// Write a double in shortest round-trip form. Non-finite values have no
    /// JSON representation.
    pub fn write_f64(&mut self, value: f64) -> WireResult<()> {
        if !value.is_finite() {
            return Err(WireError::NonFinite(value));
        }
        let text = serde_json::to_string(&value).map_err(io::Error::from)?;
        self.write_raw(&text)
    }

    /// Write a float in shortest form that reads back as the same `f32`.
    pub fn write_f32(&mut self, value: f32) -> WireResult<()> {
        if !value.is_finite() {
            return Err(WireError::NonFinite(f64::from(value)));
        }
        let text = serde_json::to_string(&value).map_err(io::Error::from)?;
        self.write_raw(&text)
    }

    /// Write a number from its exact text, e.g. a decimal.
    pub fn write_number_literal(&mut self, text: &str) -> WireResult<()> {
        if !is_number_literal(text) {
            return Err(WireError::InvalidNumber(text.to_string()));
        }
        self.write_raw(text)
    }

    /// Write any token, e.g. when re-emitting a token stream.
    pub fn write_token(&mut self, token: &Token) -> WireResult<()> {
        match token {
            Token::StartObject => self.write_start_object(),
            Token::EndObject => self.write_end_object(),
            Token::StartArray => self.write_start_array(),
            Token::EndArray => self.write_end_array(),
            Token::Name(name) => self.write_name(name),
            Token::String(s) => self.write_string(s),
            Token::Number(n) => self.write_number_literal(n),
            Token::Bool(b) => self.write_bool(*b),
            Token::Null => self.write_null(),
        }
    }

    pub fn flush(&mut self) -> WireResult<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Check that exactly one complete value was written, flush, and return
    /// the sink.
    pub fn finish(mut self) -> WireResult<W> {
        if !self.stack.is_empty() {
            return Err(WireError::Structure(format!(
                "{} structure(s) still open at end of output",
                self.stack.len()
            )));
        }
        if !self.root_written {
            return Err(WireError::Structure("no value was written".into()));
        }
        if self.indent.is_some() {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_raw(&mut self, text: &str) -> WireResult<()> {
        self.before_value()?;
        self.out.write_all(text.as_bytes())?;
        self.value_done();
        Ok(())
    }

    fn before_value(&mut self) -> WireResult<()> {
        let Some(frame) = self.stack.last_mut() else {
            if self.root_written {
                return Err(WireError::Structure("second top-level value".into()));
            }
            return Ok(());
        };
        if frame.is_object {
            if !frame.awaiting_value {
                return Err(WireError::Structure(
                    "value written inside an object without a member name".into(),
                ));
            }
            frame.awaiting_value = false;
            return Ok(());
        }
        let first = frame.count == 0;
        frame.count += 1;
        if !first {
            self.out.write_all(b",")?;
        }
        self.newline()
    }

    fn close(&mut self, bracket: &[u8]) -> WireResult<()> {
        if let Some(frame) = self.stack.pop() {
            if frame.count > 0 {
                self.newline()?;
            }
        }
        self.out.write_all(bracket)?;
        self.value_done();
        Ok(())
    }

    fn value_done(&mut self) {
        if self.stack.is_empty() {
            self.root_written = true;
        }
    }

    fn newline(&mut self) -> WireResult<()> {
        if let Some(width) = self.indent {
            self.out.write_all(b"\n")?;
            for _ in 0..width * self.stack.len() {
                self.out.write_all(b" ")?;
            }
        }
        Ok(())
    }
}

fn write_escaped<W: Write>(out: &mut W, value: &str) -> WireResult<()> {
    serde_json::to_writer(out, value).map_err(io::Error::from)?;
    Ok(())
}

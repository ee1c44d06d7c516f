use std::io::{BufRead, BufReader, ErrorKind, Read};

use strand_types::is_number_literal;

use crate::error::{WireError, WireResult};
use crate::token::Token;

/// Default bound on structure nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// A value is required next.
    Value,
    /// Just after `{`: a member name or `}`.
    ObjectFirst,
    /// Just after `[`: a value or `]`.
    ArrayFirst,
    /// Just after `,` inside an object.
    Name,
    /// A value just completed inside a container.
    AfterValue,
    /// The top-level value is complete.
    Done,
}

/// Forward-only pull tokenizer over a byte stream.
///
/// Each call to [`next_token`](Self::next_token) consumes and returns exactly
/// one token; there is no way to look at a token without consuming it.
#[derive(Debug)]
pub struct JsonTokenReader<R> {
    input: R,
    stack: Vec<Container>,
    state: State,
    started: bool,
    offset: u64,
    max_depth: usize,
}

impl<R: Read> JsonTokenReader<BufReader<R>> {
    /// Tokenize an unbuffered byte source.
    pub fn from_reader(input: R) -> Self {
        Self::new(BufReader::new(input))
    }
}

impl<'a> JsonTokenReader<&'a [u8]> {
    /// Tokenize an in-memory document.
    pub fn from_slice(input: &'a [u8]) -> Self {
        Self::new(input)
    }
}

impl<R: BufRead> JsonTokenReader<R> {
    /// Tokenize a buffered byte source.
    pub fn new(input: R) -> Self {
        Self {
            input,
            stack: Vec::new(),
            state: State::Value,
            started: false,
            offset: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Bound structure nesting; deeper input fails with [`WireError::DepthLimit`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Number of structures currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns `true` once the top-level value has been fully read.
    pub fn is_complete(&self) -> bool {
        self.state == State::Done
    }

    /// Consume and return the next token.
    ///
    /// Returns `Ok(None)` at end of input when no document was started or
    /// the document is complete. End of input anywhere else is
    /// [`WireError::UnexpectedEof`].
    pub fn next_token(&mut self) -> WireResult<Option<Token>> {
        loop {
            self.skip_whitespace()?;
            let Some(b) = self.peek_byte()? else {
                return self.at_eof();
            };
            match self.state {
                State::Done => return Err(self.syntax("trailing characters after document")),
                State::AfterValue => match (self.stack.last().copied(), b) {
                    (Some(Container::Object), b',') => {
                        self.bump();
                        self.state = State::Name;
                    }
                    (Some(Container::Array), b',') => {
                        self.bump();
                        self.state = State::Value;
                    }
                    (Some(Container::Object), b'}') => {
                        self.bump();
                        return Ok(Some(self.close(Token::EndObject)));
                    }
                    (Some(Container::Array), b']') => {
                        self.bump();
                        return Ok(Some(self.close(Token::EndArray)));
                    }
                    (Some(Container::Object), _) => {
                        return Err(self.syntax("expected ',' or '}' after member value"))
                    }
                    (Some(Container::Array), _) => {
                        return Err(self.syntax("expected ',' or ']' after array element"))
                    }
                    (None, _) => self.state = State::Done,
                },
                State::ObjectFirst if b == b'}' => {
                    self.bump();
                    return Ok(Some(self.close(Token::EndObject)));
                }
                State::ObjectFirst => self.state = State::Name,
                State::ArrayFirst if b == b']' => {
                    self.bump();
                    return Ok(Some(self.close(Token::EndArray)));
                }
                State::ArrayFirst => self.state = State::Value,
                State::Name => return self.lex_name().map(Some),
                State::Value => return self.lex_value(b).map(Some),
            }
        }
    }

    fn at_eof(&self) -> WireResult<Option<Token>> {
        if self.state == State::Done || !self.started {
            Ok(None)
        } else {
            Err(WireError::UnexpectedEof {
                offset: self.offset,
            })
        }
    }

    fn close(&mut self, token: Token) -> Token {
        self.stack.pop();
        self.value_done();
        token
    }

    fn value_done(&mut self) {
        self.state = if self.stack.is_empty() {
            State::Done
        } else {
            State::AfterValue
        };
    }

    fn open(&mut self, container: Container) -> WireResult<()> {
        if self.stack.len() >= self.max_depth {
            return Err(WireError::DepthLimit {
                limit: self.max_depth,
                offset: self.offset,
            });
        }
        self.stack.push(container);
        self.state = match container {
            Container::Object => State::ObjectFirst,
            Container::Array => State::ArrayFirst,
        };
        Ok(())
    }

    fn lex_name(&mut self) -> WireResult<Token> {
        if self.peek_byte()? != Some(b'"') {
            return Err(self.syntax("expected member name"));
        }
        let name = self.lex_string()?;
        self.skip_whitespace()?;
        match self.peek_byte()? {
            Some(b':') => self.bump(),
            Some(_) => return Err(self.syntax("expected ':' after member name")),
            None => return Err(WireError::UnexpectedEof { offset: self.offset }),
        }
        self.state = State::Value;
        Ok(Token::Name(name))
    }

    fn lex_value(&mut self, first: u8) -> WireResult<Token> {
        self.started = true;
        let token = match first {
            b'{' => {
                self.bump();
                self.open(Container::Object)?;
                return Ok(Token::StartObject);
            }
            b'[' => {
                self.bump();
                self.open(Container::Array)?;
                return Ok(Token::StartArray);
            }
            b'"' => Token::String(self.lex_string()?),
            b'-' | b'0'..=b'9' => Token::Number(self.lex_number()?),
            b't' => {
                self.expect_literal(b"true")?;
                Token::Bool(true)
            }
            b'f' => {
                self.expect_literal(b"false")?;
                Token::Bool(false)
            }
            b'n' => {
                self.expect_literal(b"null")?;
                Token::Null
            }
            b'}' | b']' => return Err(self.syntax("expected a value, found closing bracket")),
            other => {
                return Err(self.syntax(&format!(
                    "unexpected character {:?}",
                    char::from(other)
                )))
            }
        };
        self.value_done();
        Ok(token)
    }

    /// Lex a string literal; the cursor is on the opening quote.
    fn lex_string(&mut self) -> WireResult<String> {
        let start = self.offset;
        self.bump();
        let mut raw = Vec::new();
        let mut escaped = false;
        loop {
            let Some(b) = self.peek_byte()? else {
                return Err(WireError::UnexpectedEof { offset: self.offset });
            };
            self.bump();
            match b {
                b'"' => break,
                b'\\' => {
                    escaped = true;
                    raw.push(b);
                    let Some(next) = self.peek_byte()? else {
                        return Err(WireError::UnexpectedEof { offset: self.offset });
                    };
                    self.bump();
                    raw.push(next);
                }
                0x00..=0x1f => return Err(self.syntax("unescaped control character in string")),
                _ => raw.push(b),
            }
        }

        if !escaped {
            return String::from_utf8(raw).map_err(|_| WireError::Syntax {
                offset: start,
                reason: "string is not valid UTF-8".into(),
            });
        }

        // Escapes are rare on this path; let serde_json handle them.
        let mut quoted = Vec::with_capacity(raw.len() + 2);
        quoted.push(b'"');
        quoted.extend_from_slice(&raw);
        quoted.push(b'"');
        serde_json::from_slice::<String>(&quoted).map_err(|e| WireError::Syntax {
            offset: start,
            reason: format!("invalid string literal: {e}"),
        })
    }

    fn lex_number(&mut self) -> WireResult<String> {
        let start = self.offset;
        let mut text = String::new();
        while let Some(b) = self.peek_byte()? {
            if !matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') {
                break;
            }
            self.bump();
            text.push(char::from(b));
        }
        if !is_number_literal(&text) {
            return Err(WireError::Syntax {
                offset: start,
                reason: format!("invalid number {text:?}"),
            });
        }
        Ok(text)
    }

    fn expect_literal(&mut self, literal: &[u8]) -> WireResult<()> {
        for &expected in literal {
            match self.peek_byte()? {
                Some(b) if b == expected => self.bump(),
                Some(_) => {
                    return Err(self.syntax(&format!(
                        "invalid literal, expected {:?}",
                        String::from_utf8_lossy(literal)
                    )))
                }
                None => return Err(WireError::UnexpectedEof { offset: self.offset }),
            }
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) -> WireResult<()> {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek_byte()? {
            self.bump();
        }
        Ok(())
    }

    fn peek_byte(&mut self) -> WireResult<Option<u8>> {
        loop {
            match self.input.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(WireError::Io(e)),
            }
        }
    }

    /// Consume the byte last returned by `peek_byte`.
    fn bump(&mut self) {
        self.input.consume(1);
        self.offset += 1;
    }

    fn syntax(&self, reason: &str) -> WireError {
        WireError::Syntax {
            offset: self.offset,
            reason: reason.to_string(),
        }
    }
}

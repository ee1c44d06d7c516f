use std::io::BufRead;

use chrono::{DateTime, Utc};
use strand_refs::{ReferenceCollector, ReferenceRegistry};
use strand_types::{DateCodec, Decimal, Reference, TypeTag, Value, ValueKind, WireEnum};
use strand_wire::{JsonTokenReader, Token};
use tracing::{debug, trace};

use crate::codec;
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};

/// Forward-only deserialization session driven by a schema walker.
///
/// The walker knows the schema; the session only knows tokens. Every typed
/// read has three outcomes:
///
/// - `Ok(Some(value))`: a well-typed value was present;
/// - `Ok(None)` with [`was_collection_end`](Self::was_collection_end) `false`:
///   the value was `null`;
/// - `Ok(None)` with [`was_collection_end`](Self::was_collection_end) `true`:
///   the enclosing array has no more elements.
///
/// The flag only describes the most recent ambiguous call and is overwritten
/// by the next one.
///
/// A session lives for exactly one deserialize call.
pub struct ReadSession<'a, R> {
    reader: JsonTokenReader<R>,
    registry: &'a dyn ReferenceRegistry,
    dates: DateCodec,
    was_collection_end: bool,
    collector: Option<ReferenceCollector>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Opened {
    Object,
    Array,
}

impl<'a> ReadSession<'a, &'a [u8]> {
    /// Read an in-memory document.
    pub fn from_slice(
        input: &'a [u8],
        registry: &'a dyn ReferenceRegistry,
        config: &SessionConfig,
    ) -> Self {
        Self::new(JsonTokenReader::from_slice(input), registry, config)
    }
}

impl<'a, R: BufRead> ReadSession<'a, R> {
    pub fn new(
        reader: JsonTokenReader<R>,
        registry: &'a dyn ReferenceRegistry,
        config: &SessionConfig,
    ) -> Self {
        debug!(
            max_depth = config.max_depth,
            collect_references = config.collect_references,
            "read session opened"
        );
        Self {
            reader: reader.with_max_depth(config.max_depth),
            registry,
            dates: DateCodec::new(),
            was_collection_end: false,
            collector: config.collect_references.then(ReferenceCollector::new),
        }
    }

    /// Whether the most recent ambiguous read hit the end of the enclosing
    /// collection rather than a `null` value.
    pub fn was_collection_end(&self) -> bool {
        self.was_collection_end
    }

    /// Enter a nested object. Returns `false` if the value was `null` or the
    /// enclosing collection ended; check
    /// [`was_collection_end`](Self::was_collection_end) to tell them apart.
    pub fn enter_object(&mut self) -> SessionResult<bool> {
        self.enter(Token::StartObject, "object")
    }

    /// Enter a key-value map. Same outcomes as [`enter_object`](Self::enter_object).
    pub fn enter_map(&mut self) -> SessionResult<bool> {
        self.enter(Token::StartObject, "map")
    }

    /// Enter a collection held by a property. Returns `false` if the value was
    /// `null`. An array end here means the walker is out of step.
    pub fn enter_collection(&mut self) -> SessionResult<bool> {
        match self.next()? {
            Token::StartArray => {
                self.was_collection_end = false;
                Ok(true)
            }
            Token::Null => {
                self.was_collection_end = false;
                Ok(false)
            }
            token @ (Token::EndArray | Token::EndObject | Token::Name(_)) => {
                Err(SessionError::Desync {
                    expected: "collection".into(),
                    found: token.to_string(),
                })
            }
            other => Err(SessionError::InvalidValueType {
                expected: "collection".into(),
                found: other.describe().into(),
            }),
        }
    }

    /// Enter a collection that is itself an element of a collection. Unlike
    /// [`enter_collection`](Self::enter_collection) this reports the end of
    /// the outer collection.
    pub fn enter_collection_element(&mut self) -> SessionResult<bool> {
        self.enter(Token::StartArray, "collection")
    }

    fn enter(&mut self, start: Token, expected: &str) -> SessionResult<bool> {
        match self.next()? {
            token if token == start => {
                self.was_collection_end = false;
                Ok(true)
            }
            Token::Null => {
                self.was_collection_end = false;
                Ok(false)
            }
            Token::EndArray => {
                self.was_collection_end = true;
                Ok(false)
            }
            token @ (Token::EndObject | Token::Name(_)) => Err(SessionError::Desync {
                expected: expected.into(),
                found: token.to_string(),
            }),
            other => Err(SessionError::InvalidValueType {
                expected: expected.into(),
                found: other.describe().into(),
            }),
        }
    }

    /// The next member name of the current object, or `None` at its end.
    pub fn next_property(&mut self) -> SessionResult<Option<String>> {
        match self.next()? {
            Token::Name(name) => Ok(Some(name)),
            Token::EndObject => Ok(None),
            other => Err(SessionError::Desync {
                expected: "member name or object end".into(),
                found: other.to_string(),
            }),
        }
    }

    /// The next key of the current map, or `None` at its end.
    pub fn next_key(&mut self) -> SessionResult<Option<String>> {
        self.next_property()
    }

    /// Read the discriminator of a polymorphic object just entered.
    ///
    /// The discriminator must be the object's first member and name one of
    /// the tag's variants.
    pub fn read_object_type(&mut self, tag: &TypeTag) -> SessionResult<String> {
        match self.next()? {
            Token::Name(name) if name == tag.field() => {}
            other => {
                return Err(SessionError::DiscriminatorNotFirst {
                    field: tag.field().to_string(),
                    found: other.to_string(),
                })
            }
        }
        match self.next()? {
            Token::String(variant) if tag.contains(&variant) => Ok(variant),
            Token::String(variant) => Err(SessionError::UnknownVariant {
                field: tag.field().to_string(),
                variant,
            }),
            other => Err(SessionError::InvalidValueType {
                expected: format!("discriminator string for {:?}", tag.field()),
                found: other.describe().into(),
            }),
        }
    }

    /// Skip one complete value of any shape, leaving the cursor on the next
    /// sibling.
    pub fn swallow_value(&mut self) -> SessionResult<()> {
        let first = self.next()?;
        if first.is_end() || matches!(first, Token::Name(_)) {
            return Err(SessionError::Desync {
                expected: "a value to skip".into(),
                found: first.to_string(),
            });
        }
        let mut skipped = 1usize;
        if first.is_start() {
            let mut depth = 1usize;
            while depth > 0 {
                let token = self.next()?;
                skipped += 1;
                if token.is_start() {
                    depth += 1;
                } else if token.is_end() {
                    depth -= 1;
                }
            }
        }
        trace!(tokens = skipped, "swallowed value");
        Ok(())
    }

    pub fn read_string_value(&mut self) -> SessionResult<Option<String>> {
        self.read_scalar(|_, token| codec::decode_string(token))
    }

    pub fn read_byte_value(&mut self) -> SessionResult<Option<i8>> {
        self.read_scalar(|_, token| codec::decode_integer(token, ValueKind::Byte))
    }

    pub fn read_short_value(&mut self) -> SessionResult<Option<i16>> {
        self.read_scalar(|_, token| codec::decode_integer(token, ValueKind::Short))
    }

    pub fn read_int_value(&mut self) -> SessionResult<Option<i32>> {
        self.read_scalar(|_, token| codec::decode_integer(token, ValueKind::Int))
    }

    pub fn read_long_value(&mut self) -> SessionResult<Option<i64>> {
        self.read_scalar(|_, token| codec::decode_integer(token, ValueKind::Long))
    }

    pub fn read_boolean_value(&mut self) -> SessionResult<Option<bool>> {
        self.read_scalar(|_, token| codec::decode_boolean(token))
    }

    pub fn read_float_value(&mut self) -> SessionResult<Option<f32>> {
        self.read_scalar(|_, token| codec::decode_float(token))
    }

    pub fn read_double_value(&mut self) -> SessionResult<Option<f64>> {
        self.read_scalar(|_, token| codec::decode_double(token))
    }

    pub fn read_decimal_value(&mut self) -> SessionResult<Option<Decimal>> {
        self.read_scalar(|_, token| codec::decode_decimal(token))
    }

    pub fn read_enum_value<E: WireEnum>(&mut self) -> SessionResult<Option<E>> {
        self.read_scalar(|_, token| codec::decode_enum(token))
    }

    pub fn read_date_value(&mut self) -> SessionResult<Option<DateTime<Utc>>> {
        self.read_scalar(|s, token| codec::decode_date(token, &s.dates))
    }

    /// Read a reference. The target type must be registered; the target
    /// itself is not looked up.
    pub fn read_ref_value(&mut self) -> SessionResult<Option<Reference>> {
        self.read_scalar(|s, token| {
            let reference = codec::decode_reference(token, s.registry)?;
            s.collect(&reference);
            Ok(reference)
        })
    }

    /// Read a value of a kind chosen at run time.
    pub fn read_value(&mut self, kind: ValueKind) -> SessionResult<Option<Value>> {
        self.read_scalar(|s, token| {
            let value = codec::decode_value(kind, token, s.registry, &s.dates)?;
            if let Value::Reference(r) = &value {
                s.collect(r);
            }
            Ok(value)
        })
    }

    /// Drain the references decoded so far. Empty unless the session was
    /// configured with `collect_references`.
    pub fn take_collected_references(&mut self) -> Vec<Reference> {
        self.collector
            .as_mut()
            .map(|c| std::mem::take(c).into_references())
            .unwrap_or_default()
    }

    /// Check that the walker consumed the whole document and nothing but
    /// whitespace follows it.
    pub fn finish(mut self) -> SessionResult<()> {
        if !self.reader.is_complete() {
            return Err(SessionError::Desync {
                expected: "end of document".into(),
                found: format!("{} open structure(s)", self.reader.depth()),
            });
        }
        self.reader.next_token()?;
        debug!(bytes = self.reader.offset(), "read session finished");
        Ok(())
    }

    fn read_scalar<T>(
        &mut self,
        decode: impl FnOnce(&mut Self, Token) -> SessionResult<T>,
    ) -> SessionResult<Option<T>> {
        match self.next()? {
            Token::Null => {
                self.was_collection_end = false;
                Ok(None)
            }
            Token::EndArray => {
                self.was_collection_end = true;
                Ok(None)
            }
            token @ (Token::EndObject | Token::Name(_)) => Err(SessionError::Desync {
                expected: "a value".into(),
                found: token.to_string(),
            }),
            token => {
                self.was_collection_end = false;
                decode(self, token).map(Some)
            }
        }
    }

    pub(crate) fn registry(&self) -> &'a dyn ReferenceRegistry {
        self.registry
    }

    /// Enter an object or array whose shape only the input decides. `None`
    /// for `null`.
    pub(crate) fn enter_either(&mut self) -> SessionResult<Option<Opened>> {
        let opened = match self.next()? {
            Token::StartObject => Some(Opened::Object),
            Token::StartArray => Some(Opened::Array),
            Token::Null => None,
            token @ (Token::EndObject | Token::EndArray | Token::Name(_)) => {
                return Err(SessionError::Desync {
                    expected: "object or collection".into(),
                    found: token.to_string(),
                })
            }
            other => {
                return Err(SessionError::InvalidValueType {
                    expected: "object or collection".into(),
                    found: other.describe().into(),
                })
            }
        };
        self.was_collection_end = false;
        Ok(opened)
    }

    fn next(&mut self) -> SessionResult<Token> {
        match self.reader.next_token()? {
            Some(token) => Ok(token),
            None if self.reader.is_complete() => Err(SessionError::Desync {
                expected: "a token".into(),
                found: "end of document".into(),
            }),
            None => Err(SessionError::EmptyDocument),
        }
    }

    fn collect(&mut self, reference: &Reference) {
        if let Some(collector) = self.collector.as_mut() {
            collector.record(reference);
        }
    }
}

#[cfg(test)]
mod tests {
    use strand_refs::InMemoryRegistry;

    use super::*;

    fn registry() -> InMemoryRegistry {
        InMemoryRegistry::with_types(["Person", "Dog"]).unwrap()
    }

    fn with_session<T>(input: &str, f: impl FnOnce(&mut ReadSession<'_, &[u8]>) -> T) -> T {
        let reg = registry();
        let config = SessionConfig::default();
        let mut session = ReadSession::from_slice(input.as_bytes(), &reg, &config);
        f(&mut session)
    }

    #[test]
    fn collection_end_vs_null_element() {
        with_session(r#"["a",null]"#, |s| {
            assert!(s.enter_collection().unwrap());
            assert_eq!(s.read_string_value().unwrap().as_deref(), Some("a"));
            assert!(!s.was_collection_end());
            assert_eq!(s.read_string_value().unwrap(), None);
            assert!(!s.was_collection_end());
            assert_eq!(s.read_string_value().unwrap(), None);
            assert!(s.was_collection_end());
        });
    }

    #[test]
    fn empty_collection_ends_immediately() {
        with_session("[]", |s| {
            assert!(s.enter_collection().unwrap());
            assert_eq!(s.read_int_value().unwrap(), None);
            assert!(s.was_collection_end());
        });
    }

    #[test]
    fn null_collection() {
        with_session(r#"{"tags":null}"#, |s| {
            assert!(s.enter_object().unwrap());
            assert_eq!(s.next_property().unwrap().as_deref(), Some("tags"));
            assert!(!s.enter_collection().unwrap());
            assert!(!s.was_collection_end());
            assert_eq!(s.next_property().unwrap(), None);
        });
    }

    #[test]
    fn enter_collection_at_array_end_is_state_error() {
        with_session("[]", |s| {
            assert!(s.enter_collection().unwrap());
            let err = s.enter_collection().unwrap_err();
            assert!(err.is_state_error());
        });
    }

    #[test]
    fn nested_collections() {
        with_session("[[1],[]]", |s| {
            assert!(s.enter_collection().unwrap());
            assert!(s.enter_collection_element().unwrap());
            assert_eq!(s.read_int_value().unwrap(), Some(1));
            assert_eq!(s.read_int_value().unwrap(), None);
            assert!(s.was_collection_end());
            assert!(s.enter_collection_element().unwrap());
            assert_eq!(s.read_int_value().unwrap(), None);
            assert!(s.enter_collection_element().is_ok_and(|entered| !entered));
            assert!(s.was_collection_end());
        });
    }

    #[test]
    fn objects_in_collection() {
        with_session(r#"[{"n":1},null]"#, |s| {
            assert!(s.enter_collection().unwrap());
            assert!(s.enter_object().unwrap());
            assert_eq!(s.next_property().unwrap().as_deref(), Some("n"));
            assert_eq!(s.read_long_value().unwrap(), Some(1));
            assert_eq!(s.next_property().unwrap(), None);
            assert!(!s.enter_object().unwrap());
            assert!(!s.was_collection_end());
            assert!(!s.enter_object().unwrap());
            assert!(s.was_collection_end());
        });
    }

    #[test]
    fn map_entries() {
        with_session(r#"{"a":1,"b":2}"#, |s| {
            assert!(s.enter_map().unwrap());
            let mut entries = Vec::new();
            while let Some(key) = s.next_key().unwrap() {
                entries.push((key, s.read_short_value().unwrap().unwrap()));
            }
            assert_eq!(entries, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
        });
    }

    #[test]
    fn wrong_value_shape_is_data_error() {
        with_session(r#"{"n":"one"}"#, |s| {
            s.enter_object().unwrap();
            s.next_property().unwrap();
            let err = s.read_int_value().unwrap_err();
            assert!(matches!(err, SessionError::InvalidValueType { .. }));
            assert!(err.is_data_error());
        });
    }

    #[test]
    fn object_where_scalar_expected_is_data_error() {
        with_session(r#"[{}]"#, |s| {
            s.enter_collection().unwrap();
            assert!(s.read_string_value().unwrap_err().is_data_error());
        });
    }

    #[test]
    fn reading_value_at_object_end_is_state_error() {
        with_session("{}", |s| {
            s.enter_object().unwrap();
            let err = s.read_string_value().unwrap_err();
            assert!(matches!(err, SessionError::Desync { .. }));
        });
    }

    #[test]
    fn reading_value_instead_of_name_is_state_error() {
        with_session(r#"{"a":1}"#, |s| {
            s.enter_object().unwrap();
            assert!(s.read_int_value().unwrap_err().is_state_error());
        });
    }

    #[test]
    fn narrowing_is_range_checked() {
        with_session("[300, -129, 70000]", |s| {
            s.enter_collection().unwrap();
            assert!(matches!(s.read_byte_value(), Err(SessionError::OutOfRange { .. })));
            assert!(matches!(s.read_byte_value(), Err(SessionError::OutOfRange { .. })));
            assert!(matches!(s.read_short_value(), Err(SessionError::OutOfRange { .. })));
        });
    }

    #[test]
    fn integer_reads_never_round() {
        with_session("[1.0000000000000001, 9007199254740993.0, 2.5e0]", |s| {
            s.enter_collection().unwrap();
            let err = s.read_int_value().unwrap_err();
            assert!(matches!(err, SessionError::InvalidValueType { .. }));
            assert!(err.is_data_error());
            assert_eq!(s.read_long_value().unwrap(), Some(9_007_199_254_740_993));
            assert!(s.read_long_value().unwrap_err().is_data_error());
            assert_eq!(s.read_long_value().unwrap(), None);
            assert!(s.was_collection_end());
        });
    }

    #[test]
    fn enter_either_sets_flag_only_after_a_value() {
        with_session(r#"{"a":[],"b":{}}"#, |s| {
            assert!(s.enter_object().unwrap());
            s.next_property().unwrap();
            assert!(s.enter_collection().unwrap());
            assert_eq!(s.read_int_value().unwrap(), None);
            assert!(s.was_collection_end());
            s.next_property().unwrap();
            assert_eq!(s.enter_either().unwrap(), Some(Opened::Object));
            assert!(!s.was_collection_end());
        });
        with_session("[[]]", |s| {
            assert!(s.enter_collection().unwrap());
            assert!(s.enter_collection_element().unwrap());
            assert_eq!(s.read_int_value().unwrap(), None);
            assert!(s.enter_either().unwrap_err().is_state_error());
            assert!(s.was_collection_end());
        });
    }

    #[test]
    fn discriminator_first() {
        let tag = TypeTag::with_default_field(["Dog", "Cat"]).unwrap();
        with_session(r#"{"type":"Dog","name":"Rex"}"#, |s| {
            assert!(s.enter_object().unwrap());
            assert_eq!(s.read_object_type(&tag).unwrap(), "Dog");
            assert_eq!(s.next_property().unwrap().as_deref(), Some("name"));
        });
    }

    #[test]
    fn discriminator_elsewhere_is_data_error() {
        let tag = TypeTag::with_default_field(["Dog"]).unwrap();
        with_session(r#"{"name":"Rex","type":"Dog"}"#, |s| {
            s.enter_object().unwrap();
            let err = s.read_object_type(&tag).unwrap_err();
            assert!(matches!(err, SessionError::DiscriminatorNotFirst { .. }));
            assert!(err.is_data_error());
        });
    }

    #[test]
    fn discriminator_must_be_known_string() {
        let tag = TypeTag::with_default_field(["Dog"]).unwrap();
        with_session(r#"{"type":"Bird"}"#, |s| {
            s.enter_object().unwrap();
            assert!(matches!(s.read_object_type(&tag), Err(SessionError::UnknownVariant { .. })));
        });
        with_session(r#"{"type":7}"#, |s| {
            s.enter_object().unwrap();
            assert!(matches!(s.read_object_type(&tag), Err(SessionError::InvalidValueType { .. })));
        });
        with_session(r#"{}"#, |s| {
            s.enter_object().unwrap();
            assert!(s.read_object_type(&tag).unwrap_err().is_data_error());
        });
    }

    #[test]
    fn empty_polymorphic_array_never_yields_a_variant() {
        let tag = TypeTag::with_default_field(["Dog"]).unwrap();
        with_session("[]", |s| {
            s.enter_collection().unwrap();
            assert!(s.read_object_type(&tag).unwrap_err().is_data_error());
        });
    }

    #[test]
    fn swallow_skips_nested_value() {
        with_session(r#"{"skip":{"a":[1,{"b":[[],{}]}],"c":null},"keep":true}"#, |s| {
            s.enter_object().unwrap();
            assert_eq!(s.next_property().unwrap().as_deref(), Some("skip"));
            s.swallow_value().unwrap();
            assert_eq!(s.next_property().unwrap().as_deref(), Some("keep"));
            assert_eq!(s.read_boolean_value().unwrap(), Some(true));
            assert_eq!(s.next_property().unwrap(), None);
        });
    }

    #[test]
    fn swallow_scalar_and_element() {
        with_session(r#"[1,[2,3],"x"]"#, |s| {
            s.enter_collection().unwrap();
            s.swallow_value().unwrap();
            s.swallow_value().unwrap();
            assert_eq!(s.read_string_value().unwrap().as_deref(), Some("x"));
        });
    }

    #[test]
    fn swallow_at_end_is_state_error() {
        with_session("[]", |s| {
            s.enter_collection().unwrap();
            let err = s.swallow_value().unwrap_err();
            assert!(matches!(err, SessionError::Desync { .. }));
        });
    }

    #[test]
    fn references_resolve_and_collect() {
        let reg = registry();
        let config = SessionConfig {
            collect_references: true,
            ..Default::default()
        };
        let input = br#"["ref:Person:1","ref:Dog:2","ref:Person:1"]"#;
        let mut s = ReadSession::from_slice(input, &reg, &config);
        s.enter_collection().unwrap();
        while s.read_ref_value().unwrap().is_some() {}
        assert!(s.was_collection_end());
        let refs = s.take_collected_references();
        assert_eq!(refs, vec![Reference::new("Dog", "2"), Reference::new("Person", "1")]);
        assert!(s.take_collected_references().is_empty());
        s.finish().unwrap();
    }

    #[test]
    fn unregistered_reference_is_data_error() {
        with_session(r#"["ref:Cat:1"]"#, |s| {
            s.enter_collection().unwrap();
            let err = s.read_ref_value().unwrap_err();
            assert!(matches!(err, SessionError::InvalidReference(_)));
            assert!(err.is_data_error());
        });
    }

    #[test]
    fn dates_use_fixed_format() {
        with_session(r#"["2024-01-02T03:04:05Z","2024-01-02"]"#, |s| {
            s.enter_collection().unwrap();
            let d = s.read_date_value().unwrap().unwrap();
            assert_eq!(d.to_rfc3339(), "2024-01-02T03:04:05+00:00");
            assert!(matches!(s.read_date_value(), Err(SessionError::InvalidDate(_))));
        });
    }

    #[test]
    fn read_value_by_kind() {
        with_session(r#"[12, "ref:Dog:9"]"#, |s| {
            s.enter_collection().unwrap();
            assert_eq!(s.read_value(ValueKind::Short).unwrap(), Some(Value::Short(12)));
            assert_eq!(
                s.read_value(ValueKind::Reference).unwrap(),
                Some(Value::Reference(Reference::new("Dog", "9")))
            );
        });
    }

    #[test]
    fn empty_input_is_data_error() {
        with_session("   ", |s| {
            let err = s.read_string_value().unwrap_err();
            assert!(matches!(err, SessionError::EmptyDocument));
            assert!(err.is_data_error());
        });
    }

    #[test]
    fn truncated_input_is_data_error() {
        with_session(r#"{"name":"#, |s| {
            s.enter_object().unwrap();
            s.next_property().unwrap();
            let err = s.read_string_value().unwrap_err();
            assert!(matches!(err, SessionError::Malformed(_)));
        });
    }

    #[test]
    fn reading_past_document_is_state_error() {
        with_session("1", |s| {
            assert_eq!(s.read_int_value().unwrap(), Some(1));
            assert!(s.read_int_value().unwrap_err().is_state_error());
        });
    }

    #[test]
    fn finish_requires_complete_document() {
        let reg = registry();
        let config = SessionConfig::default();
        let mut s = ReadSession::from_slice(br#"{"a":1}"#, &reg, &config);
        s.enter_object().unwrap();
        assert!(s.finish().unwrap_err().is_state_error());

        let mut s = ReadSession::from_slice(b"[] ", &reg, &config);
        s.enter_collection().unwrap();
        s.read_int_value().unwrap();
        s.finish().unwrap();
    }

    #[test]
    fn depth_limit_from_config() {
        let reg = registry();
        let config = SessionConfig {
            max_depth: 2,
            ..Default::default()
        };
        let mut s = ReadSession::from_slice(b"[[[]]]", &reg, &config);
        let err = s.swallow_value().unwrap_err();
        assert!(err.is_data_error());
    }
}

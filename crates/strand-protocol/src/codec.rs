//! Per-kind mapping between primitive values and scalar tokens.
//!
//! Every [`ValueKind`] has one decode function taking the token the read
//! session consumed, and [`encode_value`] writes any [`Value`] through the
//! token writer. The sessions' typed calls are thin wrappers over these.

use std::io::Write;

use chrono::{DateTime, Utc};
use strand_refs::ReferenceRegistry;
use strand_types::{DateCodec, Decimal, Reference, Value, ValueKind, WireEnum};
use strand_wire::{JsonTokenWriter, Token};

use crate::error::{SessionError, SessionResult};

fn mismatch(expected: ValueKind, token: &Token) -> SessionError {
    SessionError::InvalidValueType {
        expected: expected.to_string(),
        found: token.describe().to_string(),
    }
}

fn out_of_range(kind: ValueKind, text: &str) -> SessionError {
    SessionError::OutOfRange {
        kind,
        value: text.to_string(),
    }
}

pub fn decode_string(token: Token) -> SessionResult<String> {
    match token {
        Token::String(s) => Ok(s),
        other => Err(mismatch(ValueKind::String, &other)),
    }
}

/// Decode an integer of any width up to 64 bits.
///
/// Integral values spelled with a fraction or exponent (`4.0`, `1e2`) are
/// accepted; a non-zero fraction is a type error and a value outside `T` is
/// [`SessionError::OutOfRange`].
pub fn decode_integer<T: TryFrom<i64>>(token: Token, kind: ValueKind) -> SessionResult<T> {
    let text = match token {
        Token::Number(text) => text,
        other => return Err(mismatch(kind, &other)),
    };
    let wide = parse_integral(&text, kind)?;
    T::try_from(wide).map_err(|_| out_of_range(kind, &text))
}

/// Most decimal digits an `i64` magnitude can have.
const I64_DIGITS: usize = 19;

/// Decide integrality from the lexeme itself so no digit is lost to a
/// binary float on the way.
fn parse_integral(text: &str, kind: ValueKind) -> SessionResult<i64> {
    let malformed = || SessionError::InvalidValueType {
        expected: kind.to_string(),
        found: format!("number {text}"),
    };
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, parse_exponent(exponent).ok_or_else(malformed)?),
        None => (unsigned, 0),
    };
    let (int_digits, frac_digits) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if int_digits.is_empty() || !is_digits(int_digits) || !is_digits(frac_digits) {
        return Err(malformed());
    }

    // All significant digits, with the decimal point `point` places in.
    let joined = format!("{int_digits}{frac_digits}");
    let digits = joined.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }
    let skipped = (joined.len() - digits.len()) as i64;
    let point = (int_digits.len() as i64)
        .saturating_add(exponent)
        .saturating_sub(skipped);
    if point <= 0 {
        return Err(non_integral(kind, text));
    }
    if point > I64_DIGITS as i64 {
        return Err(out_of_range(kind, text));
    }
    let point = point as usize;
    let (whole, fraction) = digits.split_at(point.min(digits.len()));
    if fraction.bytes().any(|b| b != b'0') {
        return Err(non_integral(kind, text));
    }

    let mut magnitude: u64 = 0;
    for b in whole.bytes() {
        magnitude = magnitude
            .checked_mul(10)
            .and_then(|m| m.checked_add(u64::from(b - b'0')))
            .ok_or_else(|| out_of_range(kind, text))?;
    }
    for _ in whole.len()..point {
        magnitude = magnitude
            .checked_mul(10)
            .ok_or_else(|| out_of_range(kind, text))?;
    }

    let value = if negative {
        -i128::from(magnitude)
    } else {
        i128::from(magnitude)
    };
    i64::try_from(value).map_err(|_| out_of_range(kind, text))
}

/// Exponent digits with an optional sign, saturating at the `i64` bounds.
fn parse_exponent(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude = digits.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

fn non_integral(kind: ValueKind, text: &str) -> SessionError {
    SessionError::InvalidValueType {
        expected: kind.to_string(),
        found: format!("non-integral number {text}"),
    }
}

pub fn decode_boolean(token: Token) -> SessionResult<bool> {
    match token {
        Token::Bool(b) => Ok(b),
        other => Err(mismatch(ValueKind::Boolean, &other)),
    }
}

pub fn decode_float(token: Token) -> SessionResult<f32> {
    let text = match token {
        Token::Number(text) => text,
        other => return Err(mismatch(ValueKind::Float, &other)),
    };
    let v: f32 = text.parse().map_err(|_| out_of_range(ValueKind::Float, &text))?;
    if v.is_infinite() {
        return Err(out_of_range(ValueKind::Float, &text));
    }
    Ok(v)
}

pub fn decode_double(token: Token) -> SessionResult<f64> {
    let text = match token {
        Token::Number(text) => text,
        other => return Err(mismatch(ValueKind::Double, &other)),
    };
    let v: f64 = text.parse().map_err(|_| out_of_range(ValueKind::Double, &text))?;
    if v.is_infinite() {
        return Err(out_of_range(ValueKind::Double, &text));
    }
    Ok(v)
}

pub fn decode_decimal(token: Token) -> SessionResult<Decimal> {
    match token {
        Token::Number(text) => Decimal::try_from(text).map_err(|e| SessionError::InvalidValueType {
            expected: ValueKind::Decimal.to_string(),
            found: e.to_string(),
        }),
        other => Err(mismatch(ValueKind::Decimal, &other)),
    }
}

pub fn decode_enum<E: WireEnum>(token: Token) -> SessionResult<E> {
    let constant = decode_enum_constant(token)?;
    E::from_wire(&constant).ok_or(SessionError::UnknownEnumConstant { value: constant })
}

/// Decode an enum constant without checking it against a Rust enum.
pub fn decode_enum_constant(token: Token) -> SessionResult<String> {
    match token {
        Token::String(s) => Ok(s),
        other => Err(mismatch(ValueKind::Enum, &other)),
    }
}

pub fn decode_date(token: Token, dates: &DateCodec) -> SessionResult<DateTime<Utc>> {
    match token {
        Token::String(s) => dates.parse(&s).map_err(SessionError::InvalidDate),
        other => Err(mismatch(ValueKind::Date, &other)),
    }
}

pub fn decode_reference(
    token: Token,
    registry: &dyn ReferenceRegistry,
) -> SessionResult<Reference> {
    match token {
        Token::String(s) => Ok(registry.resolve(&s)?),
        other => Err(mismatch(ValueKind::Reference, &other)),
    }
}

/// Decode a token as `kind`.
pub fn decode_value(
    kind: ValueKind,
    token: Token,
    registry: &dyn ReferenceRegistry,
    dates: &DateCodec,
) -> SessionResult<Value> {
    Ok(match kind {
        ValueKind::String => Value::String(decode_string(token)?),
        ValueKind::Byte => Value::Byte(decode_integer(token, kind)?),
        ValueKind::Short => Value::Short(decode_integer(token, kind)?),
        ValueKind::Int => Value::Int(decode_integer(token, kind)?),
        ValueKind::Long => Value::Long(decode_integer(token, kind)?),
        ValueKind::Boolean => Value::Boolean(decode_boolean(token)?),
        ValueKind::Float => Value::Float(decode_float(token)?),
        ValueKind::Double => Value::Double(decode_double(token)?),
        ValueKind::Decimal => Value::Decimal(decode_decimal(token)?),
        ValueKind::Enum => Value::Enum(decode_enum_constant(token)?),
        ValueKind::Date => Value::Date(decode_date(token, dates)?),
        ValueKind::Reference => Value::Reference(decode_reference(token, registry)?),
    })
}

/// Write `value` as one scalar token.
pub fn encode_value<W: Write>(
    writer: &mut JsonTokenWriter<W>,
    value: &Value,
    registry: &dyn ReferenceRegistry,
    dates: &DateCodec,
) -> SessionResult<()> {
    match value {
        Value::String(s) => writer.write_string(s)?,
        Value::Byte(v) => writer.write_i64(i64::from(*v))?,
        Value::Short(v) => writer.write_i64(i64::from(*v))?,
        Value::Int(v) => writer.write_i64(i64::from(*v))?,
        Value::Long(v) => writer.write_i64(*v)?,
        Value::Boolean(b) => writer.write_bool(*b)?,
        Value::Float(v) => writer.write_f32(*v)?,
        Value::Double(v) => writer.write_f64(*v)?,
        Value::Decimal(d) => writer.write_number_literal(d.as_str())?,
        Value::Enum(constant) => writer.write_string(constant)?,
        Value::Date(date) => writer.write_string(&dates.format(date))?,
        Value::Reference(r) => writer.write_string(&registry.canonicalize(r)?)?,
    }
    Ok(())
}

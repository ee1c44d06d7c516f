use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::TypeError;

/// Wire format of date values: whole seconds, UTC, literal `T` and `Z`.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Fixed-format date text codec.
///
/// Formatting drops sub-second precision; parsing only accepts the exact
/// [`DATE_FORMAT`] shape.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateCodec;

impl DateCodec {
    pub fn new() -> Self {
        Self
    }

    /// Render a date in wire format.
    pub fn format(&self, date: &DateTime<Utc>) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Parse a date from wire format.
    pub fn parse(&self, text: &str) -> Result<DateTime<Utc>, TypeError> {
        NaiveDateTime::parse_from_str(text, DATE_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|_| TypeError::InvalidDate {
                value: text.to_string(),
            })
    }
}

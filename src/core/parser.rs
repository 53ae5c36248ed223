// jctlfmt - core/parser.rs
//
// Decodes one line of systemd journal JSON export into an `Entry`.
// Core layer: pure function of its input, never touches I/O.
//
// For the field catalogue see
// https://www.freedesktop.org/software/systemd/man/systemd.journal-fields.html

use crate::core::model::Entry;
use crate::util::constants;
use crate::util::error::ParseError;
use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::{Map, Value};

// =============================================================================
// Field rules
// =============================================================================

/// Entry field a rule populates. The target also fixes how the raw JSON
/// value is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Datetime,
    Hostname,
    Unit,
    Ident,
    Pid,
    Prio,
    Msg,
}

/// What to do when none of a rule's source fields is present.
#[derive(Debug, Clone, Copy)]
enum Fallback {
    Required,
    EmptyText,
    Priority(i64),
}

#[derive(Debug)]
struct FieldRule {
    target: Target,
    /// Source field names, most preferred first.
    sources: &'static [&'static str],
    fallback: Fallback,
}

/// Ordered defaulting table, applied once per record.
static FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        target: Target::Datetime,
        sources: &[
            constants::FIELD_SOURCE_REALTIME_TIMESTAMP,
            constants::FIELD_REALTIME_TIMESTAMP,
        ],
        fallback: Fallback::Required,
    },
    FieldRule {
        target: Target::Hostname,
        sources: &[constants::FIELD_HOSTNAME],
        fallback: Fallback::Required,
    },
    FieldRule {
        target: Target::Unit,
        sources: &[constants::FIELD_SYSTEMD_UNIT],
        fallback: Fallback::EmptyText,
    },
    FieldRule {
        target: Target::Ident,
        sources: &[constants::FIELD_SYSLOG_IDENTIFIER],
        fallback: Fallback::EmptyText,
    },
    FieldRule {
        target: Target::Pid,
        sources: &[constants::FIELD_PID],
        fallback: Fallback::EmptyText,
    },
    FieldRule {
        target: Target::Prio,
        sources: &[constants::FIELD_PRIORITY],
        fallback: Fallback::Priority(constants::UNKNOWN_PRIORITY),
    },
    FieldRule {
        target: Target::Msg,
        sources: &[constants::FIELD_MESSAGE],
        fallback: Fallback::Required,
    },
];

/// MESSAGE arrives as a plain string, or as an array of byte values when
/// journald considers the payload binary.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMessage {
    Text(String),
    Bytes(Vec<u8>),
}

/// Accumulates decoded values until every rule has been applied.
#[derive(Default)]
struct Fields {
    datetime: Option<DateTime<Local>>,
    hostname: Option<String>,
    unit: Option<String>,
    ident: Option<String>,
    pid: Option<String>,
    prio: Option<i64>,
    msg: Option<String>,
}

impl Fields {
    fn into_entry(self) -> Result<Entry, ParseError> {
        Ok(Entry {
            datetime: self.datetime.ok_or(ParseError::MissingField {
                field: constants::FIELD_REALTIME_TIMESTAMP,
            })?,
            hostname: self.hostname.ok_or(ParseError::MissingField {
                field: constants::FIELD_HOSTNAME,
            })?,
            unit: self.unit.unwrap_or_default(),
            ident: self.ident.unwrap_or_default(),
            pid: self.pid.unwrap_or_default(),
            prio: self.prio.unwrap_or(constants::UNKNOWN_PRIORITY),
            msg: self.msg.ok_or(ParseError::MissingField {
                field: constants::FIELD_MESSAGE,
            })?,
        })
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse one line of journal JSON export into an `Entry`.
///
/// Fails on malformed JSON, on a non-object record, when MESSAGE, _HOSTNAME
/// or both realtime timestamps are absent, and when a present field holds an
/// unusable value. No partial entry is ever produced.
pub fn parse_entry(line: &str) -> Result<Entry, ParseError> {
    let value: Value =
        serde_json::from_str(line).map_err(|source| ParseError::Decode { source })?;
    let Value::Object(mut raw) = value else {
        return Err(ParseError::NotAnObject);
    };

    let mut fields = Fields::default();
    for rule in FIELD_RULES {
        match take_first(&mut raw, rule.sources) {
            Some((name, value)) => decode_into(&mut fields, rule.target, name, value)?,
            None => match rule.fallback {
                Fallback::Required => {
                    // Reported under the last source: the one journald always writes.
                    let field = rule.sources[rule.sources.len() - 1];
                    return Err(ParseError::MissingField { field });
                }
                // `into_entry` fills absent optional text with "".
                Fallback::EmptyText => {}
                Fallback::Priority(p) => fields.prio = Some(p),
            },
        }
    }

    let entry = fields.into_entry()?;
    tracing::trace!(
        host = %entry.hostname,
        unit = %entry.unit,
        prio = entry.prio,
        "Parsed journal record"
    );
    Ok(entry)
}

/// Remove and return the first present source field, in preference order.
fn take_first(
    raw: &mut Map<String, Value>,
    sources: &'static [&'static str],
) -> Option<(&'static str, Value)> {
    sources
        .iter()
        .find_map(|name| raw.remove(*name).map(|value| (*name, value)))
}

/// Decode `value` according to `target` and store it in the matching slot.
fn decode_into(
    fields: &mut Fields,
    target: Target,
    field: &'static str,
    value: Value,
) -> Result<(), ParseError> {
    match target {
        Target::Datetime => fields.datetime = Some(decode_timestamp(field, &value)?),
        Target::Prio => fields.prio = Some(decode_priority(field, &value)?),
        Target::Msg => fields.msg = Some(decode_message(field, value)?),
        Target::Hostname => fields.hostname = Some(decode_text(field, value)?),
        Target::Unit => fields.unit = Some(decode_text(field, value)?),
        Target::Ident => fields.ident = Some(decode_text(field, value)?),
        Target::Pid => fields.pid = Some(decode_text(field, value)?),
    }
    Ok(())
}

fn decode_text(field: &'static str, value: Value) -> Result<String, ParseError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(invalid(field, format!("expected a string, got {other}"))),
    }
}

/// Convert a microsecond timestamp into local time.
///
/// The sub-second digits are dropped textually (truncation, never rounding)
/// before the remaining whole seconds are converted.
fn decode_timestamp(field: &'static str, value: &Value) -> Result<DateTime<Local>, ParseError> {
    let digits = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_u64() => n.to_string(),
        other => {
            return Err(invalid(
                field,
                format!("expected a decimal string, got {other}"),
            ))
        }
    };

    let secs = whole_seconds(&digits).ok_or_else(|| {
        invalid(
            field,
            format!("'{digits}' is not a microsecond timestamp"),
        )
    })?;

    DateTime::from_timestamp(secs, 0)
        .map(|utc| utc.with_timezone(&Local))
        .ok_or_else(|| invalid(field, format!("{secs} seconds is out of range")))
}

/// Whole seconds of a microsecond timestamp string.
///
/// Returns `None` unless the input is all ASCII digits with more than the
/// six sub-second digits.
pub fn whole_seconds(micros: &str) -> Option<i64> {
    let keep = micros
        .len()
        .checked_sub(constants::TIMESTAMP_SUBSECOND_DIGITS)
        .filter(|n| *n > 0)?;
    if !micros.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    micros[..keep].parse().ok()
}

fn decode_priority(field: &'static str, value: &Value) -> Result<i64, ParseError> {
    match value {
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|e| invalid(field, format!("'{s}' is not an integer: {e}"))),
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| invalid(field, format!("{n} is not an integer"))),
        other => Err(invalid(field, format!("expected an integer, got {other}"))),
    }
}

fn decode_message(field: &'static str, value: Value) -> Result<String, ParseError> {
    let raw: RawMessage = serde_json::from_value(value).map_err(|_| {
        invalid(field, "expected a string or an array of byte values".to_string())
    })?;
    let text = match raw {
        RawMessage::Text(s) => s,
        RawMessage::Bytes(bytes) => String::from_utf8(bytes)
            .map_err(|e| invalid(field, format!("bytes are not valid UTF-8: {e}")))?,
    };
    Ok(text.trim_matches(is_strippable).to_string())
}

/// Unicode whitespace plus the ASCII file, group, record and unit
/// separators (U+001C..=U+001F).
fn is_strippable(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

fn invalid(field: &'static str, reason: String) -> ParseError {
    ParseError::InvalidField { field, reason }
}

// =============================================================================
// Tests
// =============================================================================

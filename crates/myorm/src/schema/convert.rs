//! Per-kind value conversions between native values, canonical SQL text,
//! bound parameters, and raw driver values.
//!
//! Every conversion is total on non-null input of its expected native type
//! and round-trip safe: `from_raw(to_canonical(v)) == v` for all supported
//! kinds. NULL passes through as [`ScalarValue::Null`]; the typed layer
//! decides between `None` and a sentinel default.

use crate::error::{OrmError, OrmResult};
use crate::command::ParamValue;
use crate::value::{RawValue, ScalarValue};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Ticks (100 ns units) between 0001-01-01 and the Unix epoch.
const EPOCH_TICKS: i64 = 621_355_968_000_000_000;
const TICKS_PER_SECOND: i64 = 10_000_000;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Converts one column kind between its native and SQL representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueConverter {
    Text,
    Uuid,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    Double,
    Decimal,
    Enum,
    Bool,
    DateTime,
    Date,
    Time,
    Span,
    Binary,
}

impl ValueConverter {
    /// Whether canonical text must be wrapped in single quotes when
    /// embedded as a literal.
    pub fn requires_quoting(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Uuid | Self::Date | Self::Time | Self::Span
        )
    }

    /// Render a native value as canonical text. NULL renders as `None`.
    pub fn to_canonical(&self, column: &str, value: &ScalarValue) -> OrmResult<Option<String>> {
        if value.is_null() {
            return Ok(None);
        }

        let text = match (self, value) {
            (Self::Text, ScalarValue::Text(v)) => v.clone(),
            (Self::Uuid, ScalarValue::Uuid(v)) => v.simple().to_string(),
            (Self::Int, ScalarValue::Int(v)) => v.to_string(),
            (Self::UnsignedInt, ScalarValue::UnsignedInt(v)) => v.to_string(),
            (Self::Long, ScalarValue::Long(v)) => v.to_string(),
            (Self::UnsignedLong, ScalarValue::UnsignedLong(v)) => v.to_string(),
            (Self::Double, ScalarValue::Double(v)) => v.to_string(),
            (Self::Decimal, ScalarValue::Decimal(v)) => v.to_string(),
            (Self::Enum, ScalarValue::Enum(v)) | (Self::Enum, ScalarValue::Int(v)) => {
                v.to_string()
            }
            (Self::Bool, ScalarValue::Bool(v)) => if *v { "1" } else { "0" }.to_string(),
            (Self::DateTime, ScalarValue::DateTime(v)) => datetime_to_ticks(v).to_string(),
            (Self::Date, ScalarValue::Date(v)) => v.format(DATE_FORMAT).to_string(),
            (Self::Time, ScalarValue::Time(v)) => v.format(TIME_FORMAT).to_string(),
            (Self::Span, ScalarValue::Span(v)) => span_to_text(column, v)?,
            (Self::Binary, ScalarValue::Bytes(v)) => format!("x'{}'", hex_encode(v)),
            (_, other) => {
                return Err(OrmError::conversion(
                    column,
                    format!("cannot render {} value as {:?} column", other.kind_name(), self),
                ));
            }
        };

        Ok(Some(text))
    }

    /// Render a native value as a bound parameter value.
    ///
    /// Binary payloads bind as raw bytes; everything else binds as its
    /// canonical text.
    pub fn to_param(&self, column: &str, value: &ScalarValue) -> OrmResult<ParamValue> {
        if let (Self::Binary, ScalarValue::Bytes(bytes)) = (self, value) {
            return Ok(ParamValue::Bytes(bytes.clone()));
        }
        match self.to_canonical(column, value)? {
            Some(text) => Ok(ParamValue::Text(text)),
            None => Ok(ParamValue::Null),
        }
    }

    /// Interpret a raw driver value as this column's native value.
    pub fn from_raw(&self, column: &str, raw: RawValue) -> OrmResult<ScalarValue> {
        if matches!(raw, RawValue::Null) {
            return Ok(ScalarValue::Null);
        }

        match self {
            Self::Text => match raw {
                RawValue::Text(v) => Ok(ScalarValue::Text(v)),
                RawValue::Bytes(v) => Ok(ScalarValue::Text(text_from_bytes(column, v)?)),
                other => Err(decode_mismatch(column, "text", &other)),
            },
            Self::Uuid => {
                let text = raw_to_text(column, raw)?;
                Uuid::parse_str(&text)
                    .map(ScalarValue::Uuid)
                    .map_err(|e| OrmError::decode(column, e.to_string()))
            }
            Self::Int => raw_to_i64(column, raw).and_then(|v| {
                i32::try_from(v)
                    .map(ScalarValue::Int)
                    .map_err(|_| OrmError::decode(column, format!("{v} out of range for int")))
            }),
            Self::UnsignedInt => raw_to_u64(column, raw).and_then(|v| {
                u32::try_from(v)
                    .map(ScalarValue::UnsignedInt)
                    .map_err(|_| {
                        OrmError::decode(column, format!("{v} out of range for unsigned int"))
                    })
            }),
            Self::Long => raw_to_i64(column, raw).map(ScalarValue::Long),
            Self::UnsignedLong => raw_to_u64(column, raw).map(ScalarValue::UnsignedLong),
            Self::Double => match raw {
                RawValue::Double(v) => Ok(ScalarValue::Double(v)),
                RawValue::Int(v) => Ok(ScalarValue::Double(v as f64)),
                RawValue::UInt(v) => Ok(ScalarValue::Double(v as f64)),
                other => {
                    let text = raw_to_text(column, other)?;
                    text.parse::<f64>()
                        .map(ScalarValue::Double)
                        .map_err(|e| OrmError::decode(column, e.to_string()))
                }
            },
            Self::Decimal => match raw {
                RawValue::Int(v) => Ok(ScalarValue::Decimal(Decimal::from(v))),
                RawValue::UInt(v) => Ok(ScalarValue::Decimal(Decimal::from(v))),
                other => {
                    let text = raw_to_text(column, other)?;
                    text.parse::<Decimal>()
                        .map(ScalarValue::Decimal)
                        .map_err(|e| OrmError::decode(column, e.to_string()))
                }
            },
            Self::Enum => raw_to_i64(column, raw).and_then(|v| {
                i32::try_from(v)
                    .map(ScalarValue::Enum)
                    .map_err(|_| OrmError::decode(column, format!("{v} out of range for enum")))
            }),
            Self::Bool => match raw {
                RawValue::Int(v) => Ok(ScalarValue::Bool(v == 1)),
                RawValue::UInt(v) => Ok(ScalarValue::Bool(v == 1)),
                other => {
                    let text = raw_to_text(column, other)?;
                    let truthy = text.eq_ignore_ascii_case("1") || text.eq_ignore_ascii_case("true");
                    Ok(ScalarValue::Bool(truthy))
                }
            },
            Self::DateTime => {
                let ticks = raw_to_i64(column, raw)?;
                datetime_from_ticks(column, ticks).map(ScalarValue::DateTime)
            }
            Self::Date => {
                let text = raw_to_text(column, raw)?;
                NaiveDate::parse_from_str(&text, DATE_FORMAT)
                    .map(ScalarValue::Date)
                    .map_err(|e| OrmError::decode(column, e.to_string()))
            }
            Self::Time => {
                let text = raw_to_text(column, raw)?;
                NaiveTime::parse_from_str(&text, "%H:%M:%S%.f")
                    .or_else(|_| NaiveTime::parse_from_str(&text, TIME_FORMAT))
                    .map(ScalarValue::Time)
                    .map_err(|e| OrmError::decode(column, e.to_string()))
            }
            Self::Span => {
                let text = raw_to_text(column, raw)?;
                span_from_text(column, &text).map(ScalarValue::Span)
            }
            Self::Binary => match raw {
                RawValue::Bytes(v) => Ok(ScalarValue::Bytes(v)),
                RawValue::Text(v) => hex_literal_to_bytes(column, &v).map(ScalarValue::Bytes),
                other => Err(decode_mismatch(column, "bytes", &other)),
            },
        }
    }
}

fn decode_mismatch(column: &str, expected: &str, raw: &RawValue) -> OrmError {
    OrmError::decode(column, format!("expected {expected}, got {raw:?}"))
}

fn text_from_bytes(column: &str, bytes: Vec<u8>) -> OrmResult<String> {
    String::from_utf8(bytes).map_err(|e| OrmError::decode(column, e.to_string()))
}

fn raw_to_text(column: &str, raw: RawValue) -> OrmResult<String> {
    match raw {
        RawValue::Text(v) => Ok(v),
        RawValue::Bytes(v) => text_from_bytes(column, v),
        RawValue::Int(v) => Ok(v.to_string()),
        RawValue::UInt(v) => Ok(v.to_string()),
        RawValue::Double(v) => Ok(v.to_string()),
        RawValue::Null => Ok(String::new()),
    }
}

fn raw_to_i64(column: &str, raw: RawValue) -> OrmResult<i64> {
    match raw {
        RawValue::Int(v) => Ok(v),
        RawValue::UInt(v) => i64::try_from(v)
            .map_err(|_| OrmError::decode(column, format!("{v} out of range for long"))),
        other => {
            let text = raw_to_text(column, other)?;
            text.parse::<i64>()
                .map_err(|e| OrmError::decode(column, e.to_string()))
        }
    }
}

fn raw_to_u64(column: &str, raw: RawValue) -> OrmResult<u64> {
    match raw {
        RawValue::UInt(v) => Ok(v),
        RawValue::Int(v) => u64::try_from(v)
            .map_err(|_| OrmError::decode(column, format!("{v} out of range for unsigned long"))),
        other => {
            let text = raw_to_text(column, other)?;
            text.parse::<u64>()
                .map_err(|e| OrmError::decode(column, e.to_string()))
        }
    }
}

/// Ticks since 0001-01-01, coercing to UTC.
fn datetime_to_ticks(value: &DateTime<Utc>) -> i64 {
    let seconds = value.timestamp();
    let sub_ticks = i64::from(value.timestamp_subsec_nanos() / 100);
    EPOCH_TICKS + seconds * TICKS_PER_SECOND + sub_ticks
}

fn datetime_from_ticks(column: &str, ticks: i64) -> OrmResult<DateTime<Utc>> {
    let relative = ticks - EPOCH_TICKS;
    let seconds = relative.div_euclid(TICKS_PER_SECOND);
    let nanos = (relative.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
    DateTime::from_timestamp(seconds, nanos)
        .ok_or_else(|| OrmError::decode(column, format!("tick value {ticks} out of range")))
}

/// `d hh:mm:ss.ffffff` text, sign-prefixed for negative spans.
fn span_to_text(column: &str, span: &TimeDelta) -> OrmResult<String> {
    let micros = span
        .num_microseconds()
        .ok_or_else(|| OrmError::conversion(column, "span exceeds representable range"))?;

    let magnitude = micros.unsigned_abs();
    let sign = if micros < 0 { "-" } else { "" };
    let days = magnitude / 86_400_000_000;
    let hours = magnitude / 3_600_000_000 % 24;
    let minutes = magnitude / 60_000_000 % 60;
    let seconds = magnitude / 1_000_000 % 60;
    let fraction = magnitude % 1_000_000;

    Ok(format!(
        "{sign}{days} {hours:02}:{minutes:02}:{seconds:02}.{fraction:06}"
    ))
}

fn span_from_text(column: &str, text: &str) -> OrmResult<TimeDelta> {
    let bad = || OrmError::decode(column, format!("'{text}' is not a valid span"));

    let trimmed = text.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (days, clock) = match rest.split_once(' ') {
        Some((days, clock)) => (days.parse::<u64>().map_err(|_| bad())?, clock),
        None => (0, rest),
    };

    let mut parts = clock.split(':');
    let hours = parts.next().ok_or_else(bad)?.parse::<u64>().map_err(|_| bad())?;
    let minutes = parts.next().ok_or_else(bad)?.parse::<u64>().map_err(|_| bad())?;
    let seconds_part = parts.next().ok_or_else(bad)?;
    if parts.next().is_some() {
        return Err(bad());
    }

    let (seconds, fraction) = match seconds_part.split_once('.') {
        Some((seconds, fraction)) => {
            if fraction.is_empty() || fraction.len() > 6 {
                return Err(bad());
            }
            let padded = format!("{fraction:0<6}");
            (
                seconds.parse::<u64>().map_err(|_| bad())?,
                padded.parse::<u64>().map_err(|_| bad())?,
            )
        }
        None => (seconds_part.parse::<u64>().map_err(|_| bad())?, 0),
    };

    let magnitude = days * 86_400_000_000
        + hours * 3_600_000_000
        + minutes * 60_000_000
        + seconds * 1_000_000
        + fraction;
    let micros = i64::try_from(magnitude).map_err(|_| bad())?;

    Ok(TimeDelta::microseconds(if negative { -micros } else { micros }))
}

fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

fn hex_literal_to_bytes(column: &str, text: &str) -> OrmResult<Vec<u8>> {
    let trimmed = text.trim();
    let digits = if let Some(rest) = trimmed
        .strip_prefix("x'")
        .or_else(|| trimmed.strip_prefix("X'"))
    {
        rest.strip_suffix('\'')
            .ok_or_else(|| OrmError::decode(column, "unterminated hex literal"))?
    } else if let Some(rest) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        rest
    } else {
        trimmed
    };

    if digits.len() % 2 != 0 {
        return Err(OrmError::decode(column, "odd-length hex literal"));
    }

    let mut out = Vec::with_capacity(digits.len() / 2);
    let bytes = digits.as_bytes();
    for pair in bytes.chunks_exact(2) {
        let high = hex_nibble(column, pair[0])?;
        let low = hex_nibble(column, pair[1])?;
        out.push((high << 4) | low);
    }
    Ok(out)
}

fn hex_nibble(column: &str, digit: u8) -> OrmResult<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        other => Err(OrmError::decode(
            column,
            format!("invalid hex digit '{}'", other as char),
        )),
    }
}

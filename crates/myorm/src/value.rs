//! Value model crossing the typed/dynamic boundary.
//!
//! [`ScalarValue`] is the dynamic form of a native field value: model
//! implementations hand values over as `ScalarValue` and receive them back
//! through [`FromScalarValue`] during row materialization. [`RawValue`] is
//! the untyped shape a driver returns for one field.

use crate::error::{OrmError, OrmResult};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A dynamically typed native value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// SQL NULL
    Null,
    Text(String),
    Uuid(Uuid),
    Int(i32),
    UnsignedInt(u32),
    Long(i64),
    UnsignedLong(u64),
    Double(f64),
    Decimal(Decimal),
    Bool(bool),
    /// Coerced to UTC before storage
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Time(NaiveTime),
    /// A duration, possibly exceeding 24 hours
    Span(TimeDelta),
    Bytes(Vec<u8>),
    /// Enum ordinal
    Enum(i32),
}

impl ScalarValue {
    /// Whether this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Uuid(_) => "uuid",
            Self::Int(_) => "int",
            Self::UnsignedInt(_) => "unsigned int",
            Self::Long(_) => "long",
            Self::UnsignedLong(_) => "unsigned long",
            Self::Double(_) => "double",
            Self::Decimal(_) => "decimal",
            Self::Bool(_) => "bool",
            Self::DateTime(_) => "datetime",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::Span(_) => "span",
            Self::Bytes(_) => "bytes",
            Self::Enum(_) => "enum",
        }
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Uuid> for ScalarValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ScalarValue {
    fn from(value: u32) -> Self {
        Self::UnsignedInt(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<u64> for ScalarValue {
    fn from(value: u64) -> Self {
        Self::UnsignedLong(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<Decimal> for ScalarValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for ScalarValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<NaiveDate> for ScalarValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveTime> for ScalarValue {
    fn from(value: NaiveTime) -> Self {
        Self::Time(value)
    }
}

impl From<TimeDelta> for ScalarValue {
    fn from(value: TimeDelta) -> Self {
        Self::Span(value)
    }
}

impl From<Vec<u8>> for ScalarValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

/// A raw field value as returned by a driver.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Int(i64),
    UInt(u64),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
}

/// Conversion from a [`ScalarValue`] into a concrete native type.
///
/// `Option<T>` maps NULL to `None`; the non-optional implementations map
/// NULL to a sentinel default (zero, empty, nil UUID, Unix epoch) so that
/// nullable driver values never crash materialization of a non-optional
/// field. Integer implementations accept any integer variant whose value
/// fits the requested width.
pub trait FromScalarValue: Sized {
    fn from_scalar(value: ScalarValue, column: &str) -> OrmResult<Self>;
}

fn mismatch<T>(column: &str, expected: &str, got: &ScalarValue) -> OrmResult<T> {
    Err(OrmError::decode(
        column,
        format!("expected {expected}, got {}", got.kind_name()),
    ))
}

macro_rules! integer_from_scalar {
    ($ty:ty, $name:literal) => {
        impl FromScalarValue for $ty {
            fn from_scalar(value: ScalarValue, column: &str) -> OrmResult<Self> {
                let out_of_range =
                    |v: &dyn std::fmt::Display| OrmError::decode(column, format!("{v} out of range for {}", $name));
                match value {
                    ScalarValue::Null => Ok(0),
                    ScalarValue::Int(v) | ScalarValue::Enum(v) => {
                        <$ty>::try_from(v).map_err(|_| out_of_range(&v))
                    }
                    ScalarValue::UnsignedInt(v) => <$ty>::try_from(v).map_err(|_| out_of_range(&v)),
                    ScalarValue::Long(v) => <$ty>::try_from(v).map_err(|_| out_of_range(&v)),
                    ScalarValue::UnsignedLong(v) => <$ty>::try_from(v).map_err(|_| out_of_range(&v)),
                    other => mismatch(column, $name, &other),
                }
            }
        }
    };
}

integer_from_scalar!(i32, "int");
integer_from_scalar!(u32, "unsigned int");
integer_from_scalar!(i64, "long");
integer_from_scalar!(u64, "unsigned long");

impl FromScalarValue for String {
    fn from_scalar(value: ScalarValue, column: &str) -> OrmResult<Self> {
        match value {
            ScalarValue::Null => Ok(String::new()),
            ScalarValue::Text(v) => Ok(v),
            other => mismatch(column, "text", &other),
        }
    }
}

impl FromScalarValue for Uuid {
    fn from_scalar(value: ScalarValue, column: &str) -> OrmResult<Self> {
        match value {
            ScalarValue::Null => Ok(Uuid::nil()),
            ScalarValue::Uuid(v) => Ok(v),
            other => mismatch(column, "uuid", &other),
        }
    }
}

impl FromScalarValue for f64 {
    fn from_scalar(value: ScalarValue, column: &str) -> OrmResult<Self> {
        match value {
            ScalarValue::Null => Ok(0.0),
            ScalarValue::Double(v) => Ok(v),
            ScalarValue::Int(v) => Ok(f64::from(v)),
            ScalarValue::Long(v) => Ok(v as f64),
            other => mismatch(column, "double", &other),
        }
    }
}

impl FromScalarValue for Decimal {
    fn from_scalar(value: ScalarValue, column: &str) -> OrmResult<Self> {
        match value {
            ScalarValue::Null => Ok(Decimal::ZERO),
            ScalarValue::Decimal(v) => Ok(v),
            ScalarValue::Int(v) => Ok(Decimal::from(v)),
            ScalarValue::Long(v) => Ok(Decimal::from(v)),
            other => mismatch(column, "decimal", &other),
        }
    }
}

impl FromScalarValue for bool {
    fn from_scalar(value: ScalarValue, column: &str) -> OrmResult<Self> {
        match value {
            ScalarValue::Null => Ok(false),
            ScalarValue::Bool(v) => Ok(v),
            ScalarValue::Int(v) => Ok(v == 1),
            other => mismatch(column, "bool", &other),
        }
    }
}

impl FromScalarValue for DateTime<Utc> {
    fn from_scalar(value: ScalarValue, column: &str) -> OrmResult<Self> {
        match value {
            ScalarValue::Null => Ok(DateTime::UNIX_EPOCH),
            ScalarValue::DateTime(v) => Ok(v),
            other => mismatch(column, "datetime", &other),
        }
    }
}

impl FromScalarValue for NaiveDate {
    fn from_scalar(value: ScalarValue, column: &str) -> OrmResult<Self> {
        match value {
            ScalarValue::Null => Ok(NaiveDate::default()),
            ScalarValue::Date(v) => Ok(v),
            other => mismatch(column, "date", &other),
        }
    }
}

impl FromScalarValue for NaiveTime {
    fn from_scalar(value: ScalarValue, column: &str) -> OrmResult<Self> {
        match value {
            ScalarValue::Null => Ok(NaiveTime::default()),
            ScalarValue::Time(v) => Ok(v),
            other => mismatch(column, "time", &other),
        }
    }
}

impl FromScalarValue for TimeDelta {
    fn from_scalar(value: ScalarValue, column: &str) -> OrmResult<Self> {
        match value {
            ScalarValue::Null => Ok(TimeDelta::zero()),
            ScalarValue::Span(v) => Ok(v),
            other => mismatch(column, "span", &other),
        }
    }
}

impl FromScalarValue for Vec<u8> {
    fn from_scalar(value: ScalarValue, column: &str) -> OrmResult<Self> {
        match value {
            ScalarValue::Null => Ok(Vec::new()),
            ScalarValue::Bytes(v) => Ok(v),
            other => mismatch(column, "bytes", &other),
        }
    }
}

impl<T: FromScalarValue> FromScalarValue for Option<T> {
    fn from_scalar(value: ScalarValue, column: &str) -> OrmResult<Self> {
        match value {
            ScalarValue::Null => Ok(None),
            other => T::from_scalar(other, column).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_maps_null_to_none() {
        let value: Option<i32> = FromScalarValue::from_scalar(ScalarValue::Null, "Age").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn integer_width_conversion_checks_range() {
        let ok: u64 = FromScalarValue::from_scalar(ScalarValue::Long(7), "Id").unwrap();
        assert_eq!(ok, 7);

        let err = <u32 as FromScalarValue>::from_scalar(ScalarValue::Long(-1), "Id");
        assert!(err.is_err());
    }

    #[test]
    fn null_falls_back_to_sentinel_defaults() {
        assert_eq!(String::from_scalar(ScalarValue::Null, "Name").unwrap(), "");
        assert_eq!(Uuid::from_scalar(ScalarValue::Null, "Id").unwrap(), Uuid::nil());
        assert!(!bool::from_scalar(ScalarValue::Null, "Flag").unwrap());
    }

    #[test]
    fn option_of_value_converts_inner() {
        let value: Option<ScalarValue> = None;
        assert_eq!(ScalarValue::from(value.map(|_| 1i32)), ScalarValue::Null);
        assert_eq!(ScalarValue::from(Some(5i32)), ScalarValue::Int(5));
    }
}

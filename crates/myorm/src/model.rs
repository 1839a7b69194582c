//! Model declaration: the trait a mapped record type implements, either by
//! hand or through `#[derive(Model)]`.

use crate::codec::BlobCodec;
use crate::error::{OrmError, OrmResult};
use crate::schema::FieldSpec;
use crate::value::{FromScalarValue, ScalarValue};

/// A record type mapped to one table.
///
/// `fields()` order is the declaration order and determines SELECT column
/// order and INSERT value order; `values()` and `from_values()` must walk
/// the same order.
pub trait Model: Sized + 'static {
    /// SQL table name.
    const TABLE: &'static str;

    /// Declaration-order field descriptions.
    fn fields() -> &'static [FieldSpec];

    /// The record's field values, in declaration order.
    fn values(&self) -> OrmResult<Vec<ScalarValue>>;

    /// Materialize a record from declaration-order native values.
    fn from_values(values: Vec<ScalarValue>) -> OrmResult<Self>;
}

/// An enum stored as its integer ordinal.
pub trait SqlEnum: Sized {
    fn to_index(&self) -> i32;
    fn from_index(value: i32) -> OrmResult<Self>;
}

/// Encode an enum field value.
pub fn encode_enum<E: SqlEnum>(value: &E) -> ScalarValue {
    ScalarValue::Enum(value.to_index())
}

/// Encode an optional enum field value.
pub fn encode_enum_opt<E: SqlEnum>(value: &Option<E>) -> ScalarValue {
    match value {
        Some(inner) => encode_enum(inner),
        None => ScalarValue::Null,
    }
}

/// Decode an enum field value; NULL decodes as ordinal zero.
pub fn decode_enum<E: SqlEnum>(value: ScalarValue, column: &str) -> OrmResult<E> {
    let ordinal = i32::from_scalar(value, column)?;
    E::from_index(ordinal)
}

/// Decode an optional enum field value.
pub fn decode_enum_opt<E: SqlEnum>(value: ScalarValue, column: &str) -> OrmResult<Option<E>> {
    match value {
        ScalarValue::Null => Ok(None),
        other => decode_enum(other, column).map(Some),
    }
}

/// Encode a blob field value through its codec.
pub fn encode_blob<C, T>(value: &T) -> OrmResult<ScalarValue>
where
    C: BlobCodec<T>,
{
    Ok(ScalarValue::Bytes(C::default().encode(value)?))
}

/// Encode an optional blob field value through its codec.
pub fn encode_blob_opt<C, T>(value: &Option<T>) -> OrmResult<ScalarValue>
where
    C: BlobCodec<T>,
{
    match value {
        Some(inner) => encode_blob::<C, T>(inner),
        None => Ok(ScalarValue::Null),
    }
}

/// Decode a blob field value through its codec.
pub fn decode_blob<C, T>(value: ScalarValue, column: &str) -> OrmResult<T>
where
    C: BlobCodec<T>,
{
    match value {
        ScalarValue::Bytes(bytes) => C::default().decode(&bytes),
        ScalarValue::Null => Err(OrmError::decode(
            column,
            "NULL payload for a non-optional blob field",
        )),
        other => Err(OrmError::decode(
            column,
            format!("expected bytes, got {}", other.kind_name()),
        )),
    }
}

/// Decode an optional blob field value through its codec.
pub fn decode_blob_opt<C, T>(value: ScalarValue, column: &str) -> OrmResult<Option<T>>
where
    C: BlobCodec<T>,
{
    match value {
        ScalarValue::Null => Ok(None),
        other => decode_blob::<C, T>(other, column).map(Some),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::schema::FieldType;
    use uuid::Uuid;

    /// Mirror of the table used throughout the formatting tests.
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct ExtendedTable {
        pub identifier: Uuid,
        pub name: String,
        pub age: i32,
        pub payload: Payload,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Payload {
        pub content: i32,
    }

    /// Little-endian payload codec for the blob column.
    #[derive(Debug, Default)]
    pub(crate) struct PayloadCodec;

    impl BlobCodec<Payload> for PayloadCodec {
        fn encode(&self, value: &Payload) -> OrmResult<Vec<u8>> {
            Ok(value.content.to_le_bytes().to_vec())
        }

        fn decode(&self, bytes: &[u8]) -> OrmResult<Payload> {
            let content = bytes
                .try_into()
                .map(i32::from_le_bytes)
                .map_err(|_| OrmError::decode("Payload", "expected four payload bytes"))?;
            Ok(Payload { content })
        }
    }

    impl Model for ExtendedTable {
        const TABLE: &'static str = "Extended";

        fn fields() -> &'static [FieldSpec] {
            static FIELDS: &[FieldSpec] = &[
                FieldSpec::new("Identifier", FieldType::Uuid).primary_key(),
                FieldSpec::new("Name", FieldType::Text).not_null().max_size(128),
                FieldSpec::new("Age", FieldType::Int),
                FieldSpec::new("Payload", FieldType::Blob).not_null().max_size(8192),
            ];
            FIELDS
        }

        fn values(&self) -> OrmResult<Vec<ScalarValue>> {
            Ok(vec![
                self.identifier.into(),
                self.name.clone().into(),
                self.age.into(),
                encode_blob::<PayloadCodec, _>(&self.payload)?,
            ])
        }

        fn from_values(values: Vec<ScalarValue>) -> OrmResult<Self> {
            let mut values = values.into_iter();
            let mut next = |column: &str| {
                values
                    .next()
                    .ok_or_else(|| OrmError::decode(column, "missing field value"))
            };
            Ok(Self {
                identifier: Uuid::from_scalar(next("Identifier")?, "Identifier")?,
                name: String::from_scalar(next("Name")?, "Name")?,
                age: i32::from_scalar(next("Age")?, "Age")?,
                payload: decode_blob::<PayloadCodec, _>(next("Payload")?, "Payload")?,
            })
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub(crate) enum Something {
        First,
        Second,
        Third,
    }

    impl SqlEnum for Something {
        fn to_index(&self) -> i32 {
            match self {
                Self::First => 0,
                Self::Second => 1,
                Self::Third => 2,
            }
        }

        fn from_index(value: i32) -> OrmResult<Self> {
            match value {
                0 => Ok(Self::First),
                1 => Ok(Self::Second),
                2 => Ok(Self::Third),
                other => Err(OrmError::decode(
                    "Something",
                    format!("{other} is not a valid ordinal"),
                )),
            }
        }
    }

    #[test]
    fn enum_round_trips_through_ordinal() {
        let encoded = encode_enum(&Something::Third);
        assert_eq!(encoded, ScalarValue::Enum(2));
        let back: Something = decode_enum(encoded, "Something").unwrap();
        assert_eq!(back, Something::Third);
    }

    #[test]
    fn optional_enum_null_is_none() {
        let decoded: Option<Something> = decode_enum_opt(ScalarValue::Null, "Something").unwrap();
        assert_eq!(decoded, None);
        assert_eq!(encode_enum_opt::<Something>(&None), ScalarValue::Null);
    }

    #[test]
    fn model_values_round_trip() {
        let record = ExtendedTable {
            identifier: Uuid::parse_str("eac14a93-32a9-480a-bcf6-5190c3a2a0d3").unwrap(),
            name: "Peter".to_string(),
            age: 42,
            payload: Payload { content: 255 },
        };
        let values = record.values().unwrap();
        let back = ExtendedTable::from_values(values).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn blob_decode_rejects_null_for_required_field() {
        let err = decode_blob::<PayloadCodec, Payload>(ScalarValue::Null, "Payload").unwrap_err();
        assert!(matches!(err, OrmError::Decode { .. }));
    }
}

//! The ordered column matcher list.
//!
//! Each matcher claims a field or passes; the first claim wins. The order
//! matters: the blob hook runs before everything else, and the specific
//! temporal matchers run before the numeric fallbacks, mirroring the
//! nullable-unwrapping order of the original resolution chain. A field no
//! matcher claims is a configuration error.

use super::convert::ValueConverter;
use super::{ColumnDescriptor, ColumnKind, FieldSpec, FieldType, SchemaColumn};
use crate::error::{OrmError, OrmResult};

type Matcher = fn(&FieldSpec) -> Option<SchemaColumn>;

const MATCHERS: &[Matcher] = &[
    match_blob,
    match_text,
    match_uuid,
    match_integer,
    match_unsigned_integer,
    match_long,
    match_unsigned_long,
    match_enum,
    match_double,
    match_datetime,
    match_date,
    match_time,
    match_span,
    match_bool,
    match_decimal,
];

/// Resolve a field to its column descriptor and converter.
pub(super) fn resolve(field: &FieldSpec) -> OrmResult<SchemaColumn> {
    for matcher in MATCHERS {
        if let Some(column) = matcher(field) {
            return Ok(column);
        }
    }
    Err(OrmError::UnsupportedType(field.name.to_string()))
}

fn descriptor(field: &FieldSpec, kind: ColumnKind, size: u32) -> ColumnDescriptor {
    ColumnDescriptor {
        name: field.name.to_string(),
        kind,
        size,
        not_null: field.not_null,
        primary_key: field.primary_key,
        auto_increment: false,
    }
}

fn match_blob(field: &FieldSpec) -> Option<SchemaColumn> {
    if field.field_type != FieldType::Blob {
        return None;
    }
    Some(SchemaColumn {
        descriptor: descriptor(field, ColumnKind::Binary, field.max_size.unwrap_or(0)),
        converter: ValueConverter::Binary,
        requires_quoting: false,
    })
}

fn match_text(field: &FieldSpec) -> Option<SchemaColumn> {
    if field.field_type != FieldType::Text {
        return None;
    }
    let descriptor = match field.fixed_size {
        Some(size) => descriptor(field, ColumnKind::FixedText, size),
        None => descriptor(
            field,
            ColumnKind::VariableText,
            field.max_size.unwrap_or(0),
        ),
    };
    Some(SchemaColumn {
        descriptor,
        converter: ValueConverter::Text,
        requires_quoting: true,
    })
}

fn match_uuid(field: &FieldSpec) -> Option<SchemaColumn> {
    if field.field_type != FieldType::Uuid {
        return None;
    }
    // A GUID is NOT NULL unless the field itself is declared optional.
    let mut descriptor = descriptor(field, ColumnKind::FixedText, 32);
    descriptor.not_null = field.not_null || !field.nullable;
    Some(SchemaColumn {
        descriptor,
        converter: ValueConverter::Uuid,
        requires_quoting: true,
    })
}

fn integer_column(
    field: &FieldSpec,
    kind: ColumnKind,
    converter: ValueConverter,
) -> SchemaColumn {
    let mut descriptor = descriptor(field, kind, 0);
    descriptor.auto_increment = field.auto_increment;
    SchemaColumn {
        descriptor,
        converter,
        requires_quoting: false,
    }
}

fn match_integer(field: &FieldSpec) -> Option<SchemaColumn> {
    (field.field_type == FieldType::Int)
        .then(|| integer_column(field, ColumnKind::Integer, ValueConverter::Int))
}

fn match_unsigned_integer(field: &FieldSpec) -> Option<SchemaColumn> {
    (field.field_type == FieldType::UnsignedInt).then(|| {
        integer_column(
            field,
            ColumnKind::UnsignedInteger,
            ValueConverter::UnsignedInt,
        )
    })
}

fn match_long(field: &FieldSpec) -> Option<SchemaColumn> {
    (field.field_type == FieldType::Long)
        .then(|| integer_column(field, ColumnKind::Long, ValueConverter::Long))
}

fn match_unsigned_long(field: &FieldSpec) -> Option<SchemaColumn> {
    (field.field_type == FieldType::UnsignedLong)
        .then(|| integer_column(field, ColumnKind::UnsignedLong, ValueConverter::UnsignedLong))
}

fn match_enum(field: &FieldSpec) -> Option<SchemaColumn> {
    if field.field_type != FieldType::Enum {
        return None;
    }
    Some(SchemaColumn {
        descriptor: descriptor(field, ColumnKind::Integer, 0),
        converter: ValueConverter::Enum,
        requires_quoting: false,
    })
}

fn match_double(field: &FieldSpec) -> Option<SchemaColumn> {
    if field.field_type != FieldType::Double {
        return None;
    }
    Some(SchemaColumn {
        descriptor: descriptor(field, ColumnKind::Double, 0),
        converter: ValueConverter::Double,
        requires_quoting: false,
    })
}

fn match_datetime(field: &FieldSpec) -> Option<SchemaColumn> {
    if field.field_type != FieldType::DateTime {
        return None;
    }
    // Stored as UTC ticks in a BIGINT column.
    Some(SchemaColumn {
        descriptor: descriptor(field, ColumnKind::Long, 0),
        converter: ValueConverter::DateTime,
        requires_quoting: false,
    })
}

fn match_date(field: &FieldSpec) -> Option<SchemaColumn> {
    if field.field_type != FieldType::Date {
        return None;
    }
    Some(SchemaColumn {
        descriptor: descriptor(field, ColumnKind::Date, 0),
        converter: ValueConverter::Date,
        requires_quoting: true,
    })
}

fn match_time(field: &FieldSpec) -> Option<SchemaColumn> {
    if field.field_type != FieldType::Time {
        return None;
    }
    let fraction = field.time_fraction.unwrap_or(0);
    Some(SchemaColumn {
        descriptor: descriptor(field, ColumnKind::Time { fraction }, 0),
        converter: ValueConverter::Time,
        requires_quoting: true,
    })
}

fn match_span(field: &FieldSpec) -> Option<SchemaColumn> {
    if field.field_type != FieldType::Span {
        return None;
    }
    // Spans keep six fractional digits unless declared otherwise.
    let fraction = field.time_fraction.unwrap_or(6);
    Some(SchemaColumn {
        descriptor: descriptor(field, ColumnKind::Time { fraction }, 0),
        converter: ValueConverter::Span,
        requires_quoting: true,
    })
}

fn match_bool(field: &FieldSpec) -> Option<SchemaColumn> {
    if field.field_type != FieldType::Bool {
        return None;
    }
    Some(SchemaColumn {
        descriptor: descriptor(field, ColumnKind::Integer, 0),
        converter: ValueConverter::Bool,
        requires_quoting: false,
    })
}

fn match_decimal(field: &FieldSpec) -> Option<SchemaColumn> {
    if field.field_type != FieldType::Decimal {
        return None;
    }
    // Widest DECIMAL MySQL accepts, so stored values keep full range.
    let kind = ColumnKind::Decimal {
        precision: 65,
        scale: 30,
    };
    Some(SchemaColumn {
        descriptor: descriptor(field, kind, 0),
        converter: ValueConverter::Decimal,
        requires_quoting: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_defaults_to_not_null() {
        let field = FieldSpec::new("Identifier", FieldType::Uuid).primary_key();
        let column = resolve(&field).unwrap();
        assert!(column.descriptor.not_null);
        assert!(column.descriptor.primary_key);
        assert_eq!(column.descriptor.kind, ColumnKind::FixedText);
        assert_eq!(column.descriptor.size, 32);
    }

    #[test]
    fn nullable_uuid_relaxes_not_null() {
        let field = FieldSpec::new("Identifier", FieldType::Uuid).nullable();
        let column = resolve(&field).unwrap();
        assert!(!column.descriptor.not_null);
    }

    #[test]
    fn fixed_size_text_wins_over_max_size() {
        let field = FieldSpec::new("Code", FieldType::Text)
            .fixed_size(8)
            .max_size(128);
        let column = resolve(&field).unwrap();
        assert_eq!(column.descriptor.kind, ColumnKind::FixedText);
        assert_eq!(column.descriptor.size, 8);
    }

    #[test]
    fn auto_increment_applies_to_integer_kinds() {
        let field = FieldSpec::new("Identifier", FieldType::UnsignedLong)
            .primary_key()
            .auto_increment();
        let column = resolve(&field).unwrap();
        assert!(column.descriptor.auto_increment);
        assert_eq!(column.descriptor.kind, ColumnKind::UnsignedLong);
    }

    #[test]
    fn datetime_maps_to_long_column() {
        let field = FieldSpec::new("Birthday", FieldType::DateTime);
        let column = resolve(&field).unwrap();
        assert_eq!(column.descriptor.kind, ColumnKind::Long);
        assert!(!column.requires_quoting);
    }

    #[test]
    fn span_defaults_to_six_fraction_digits() {
        let field = FieldSpec::new("Elapsed", FieldType::Span);
        let column = resolve(&field).unwrap();
        assert_eq!(column.descriptor.kind, ColumnKind::Time { fraction: 6 });
    }

    #[test]
    fn enum_maps_to_integer() {
        let field = FieldSpec::new("Something", FieldType::Enum);
        let column = resolve(&field).unwrap();
        assert_eq!(column.descriptor.kind, ColumnKind::Integer);
    }
}

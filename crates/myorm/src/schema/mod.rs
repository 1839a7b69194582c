//! Table schemas: field descriptions, column descriptors, and the
//! process-wide schema cache.
//!
//! A model type exposes its declaration-order [`FieldSpec`] list; the
//! matcher turns each spec into a [`ColumnDescriptor`] plus converter, and
//! the aggregate is cached per type for the lifetime of the process.

mod convert;
mod matcher;

pub use convert::ValueConverter;

use crate::error::{OrmError, OrmResult};
use crate::ident::quote_identifier;
use crate::model::Model;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Declared type tag of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Uuid,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    Double,
    Decimal,
    Bool,
    Enum,
    DateTime,
    Date,
    Time,
    Span,
    Blob,
}

/// Declaration of one model field: type tag plus attached metadata.
///
/// Field order is significant: it determines SELECT column order and
/// INSERT value order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    /// Declared as `Option<T>`; relaxes NOT NULL defaults
    pub nullable: bool,
    pub not_null: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub fixed_size: Option<u32>,
    pub max_size: Option<u32>,
    pub time_fraction: Option<u8>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            nullable: false,
            not_null: false,
            primary_key: false,
            auto_increment: false,
            fixed_size: None,
            max_size: None,
            time_fraction: None,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub const fn fixed_size(mut self, size: u32) -> Self {
        self.fixed_size = Some(size);
        self
    }

    pub const fn max_size(mut self, size: u32) -> Self {
        self.max_size = Some(size);
        self
    }

    pub const fn time_fraction(mut self, digits: u8) -> Self {
        self.time_fraction = Some(digits);
        self
    }
}

/// Canonical SQL column kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    FixedText,
    VariableText,
    Integer,
    UnsignedInteger,
    Long,
    UnsignedLong,
    Double,
    Decimal { precision: u8, scale: u8 },
    Date,
    Time { fraction: u8 },
    Binary,
}

/// Immutable metadata describing one mapped column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
    /// Meaningful only for FixedText, VariableText and Binary
    pub size: u32,
    pub not_null: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            size: 0,
            not_null: false,
            primary_key: false,
            auto_increment: false,
        }
    }

    pub fn fixed_text(name: impl Into<String>, size: u32, not_null: bool, primary_key: bool) -> Self {
        Self {
            size,
            not_null,
            primary_key,
            ..Self::new(name, ColumnKind::FixedText)
        }
    }

    pub fn variable_text(
        name: impl Into<String>,
        maximum_size: u32,
        not_null: bool,
        primary_key: bool,
    ) -> Self {
        Self {
            size: maximum_size,
            not_null,
            primary_key,
            ..Self::new(name, ColumnKind::VariableText)
        }
    }

    pub fn integer(name: impl Into<String>, primary_key: bool) -> Self {
        Self {
            primary_key,
            ..Self::new(name, ColumnKind::Integer)
        }
    }

    pub fn long(name: impl Into<String>, primary_key: bool) -> Self {
        Self {
            primary_key,
            ..Self::new(name, ColumnKind::Long)
        }
    }

    pub fn binary(name: impl Into<String>, maximum_size: u32, not_null: bool) -> Self {
        Self {
            size: maximum_size,
            not_null,
            ..Self::new(name, ColumnKind::Binary)
        }
    }

    /// The MySQL type token for this column.
    pub fn sql_type(&self) -> String {
        match self.kind {
            ColumnKind::FixedText => format!("CHAR({})", self.size),
            ColumnKind::VariableText => {
                if self.size > 0 && self.size <= 255 {
                    format!("VARCHAR({})", self.size)
                } else {
                    "TEXT".to_string()
                }
            }
            ColumnKind::Integer => "INT SIGNED".to_string(),
            ColumnKind::UnsignedInteger => "INT UNSIGNED".to_string(),
            ColumnKind::Long => "BIGINT SIGNED".to_string(),
            ColumnKind::UnsignedLong => "BIGINT UNSIGNED".to_string(),
            ColumnKind::Double => "DOUBLE".to_string(),
            ColumnKind::Decimal { precision, scale } => {
                format!("DECIMAL({precision},{scale})")
            }
            ColumnKind::Date => "DATE".to_string(),
            ColumnKind::Time { fraction } => format!("TIME({fraction})"),
            ColumnKind::Binary => {
                if self.size > 16_777_215 {
                    "LONGBLOB".to_string()
                } else if self.size > 65_535 {
                    "MEDIUMBLOB".to_string()
                } else {
                    "BLOB".to_string()
                }
            }
        }
    }

    /// Render the full column definition for CREATE TABLE.
    pub fn format_definition(&self) -> OrmResult<String> {
        let mut out = format!("{} {}", quote_identifier(&self.name)?, self.sql_type());
        if self.not_null {
            out.push_str(" NOT NULL");
        }
        if self.auto_increment {
            out.push_str(" AUTO_INCREMENT");
        }
        Ok(out)
    }
}

/// One mapped column: descriptor, converter, and quoting flag.
#[derive(Debug, Clone)]
pub struct SchemaColumn {
    pub descriptor: ColumnDescriptor,
    pub converter: ValueConverter,
    /// Canonical text embeds inside single quotes when rendered literally
    pub requires_quoting: bool,
}

/// The derived schema of one model type.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<SchemaColumn>,
}

impl TableSchema {
    /// Derive a schema from a model's field declarations.
    ///
    /// Configuration errors (empty table name, duplicate columns, an
    /// unclaimed field type) surface here, eagerly, never at execution.
    pub fn derive<T: Model>() -> OrmResult<Self> {
        Self::from_fields(T::TABLE, T::fields())
    }

    pub(crate) fn from_fields(table: &str, fields: &[FieldSpec]) -> OrmResult<Self> {
        if table.trim().is_empty() {
            return Err(OrmError::config("Model declares an empty table name"));
        }
        if fields.is_empty() {
            return Err(OrmError::config(format!(
                "Table '{table}' declares no mappable fields"
            )));
        }

        let mut columns = Vec::with_capacity(fields.len());
        for field in fields {
            if columns
                .iter()
                .any(|c: &SchemaColumn| c.descriptor.name == field.name)
            {
                return Err(OrmError::config(format!(
                    "Table '{table}' declares column '{}' more than once",
                    field.name
                )));
            }
            columns.push(matcher::resolve(field)?);
        }

        Ok(Self {
            table: table.to_string(),
            columns,
        })
    }

    /// Get the cached schema for a model type, deriving it on first use.
    pub fn of<T: Model>() -> OrmResult<Arc<Self>> {
        SchemaCache::global().get_or_derive::<T>()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> OrmResult<&SchemaColumn> {
        self.columns
            .iter()
            .find(|c| c.descriptor.name == name)
            .ok_or_else(|| {
                OrmError::config(format!(
                    "Table '{}' has no column named '{name}'",
                    self.table
                ))
            })
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|c| c.descriptor.name.as_str())
            .collect()
    }

    /// Columns flagged auto-increment.
    pub fn auto_increment_columns(&self) -> impl Iterator<Item = &SchemaColumn> {
        self.columns
            .iter()
            .filter(|c| c.descriptor.auto_increment)
    }
}

/// Write-once-per-type store of derived schemas.
///
/// Published entries are immutable; the first derivation wins and every
/// later request returns the same `Arc`. Builders go through the process
/// global, but callers may hold their own cache.
#[derive(Debug, Default)]
pub struct SchemaCache {
    inner: RwLock<HashMap<TypeId, Arc<TableSchema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache backing the statement builders.
    pub fn global() -> &'static SchemaCache {
        static GLOBAL: OnceLock<SchemaCache> = OnceLock::new();
        GLOBAL.get_or_init(SchemaCache::new)
    }

    /// Fetch the schema for `T`, deriving and publishing it on first use.
    pub fn get_or_derive<T: Model>(&self) -> OrmResult<Arc<TableSchema>> {
        let key = TypeId::of::<T>();

        if let Some(schema) = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
        {
            return Ok(Arc::clone(schema));
        }

        // Derivation runs outside the lock; insert-if-absent keeps the
        // first published schema if two threads race.
        let derived = Arc::new(TableSchema::derive::<T>()?);
        let mut map = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(Arc::clone(map.entry(key).or_insert(derived)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::ExtendedTable;

    #[test]
    fn sql_type_tokens() {
        let text = ColumnDescriptor::variable_text("Name", 128, true, false);
        assert_eq!(text.sql_type(), "VARCHAR(128)");

        let long_text = ColumnDescriptor::variable_text("Body", 4096, false, false);
        assert_eq!(long_text.sql_type(), "TEXT");

        let unsized_text = ColumnDescriptor::variable_text("Note", 0, false, false);
        assert_eq!(unsized_text.sql_type(), "TEXT");

        let blob = ColumnDescriptor::binary("Payload", 0, true);
        assert_eq!(blob.sql_type(), "BLOB");

        let medium = ColumnDescriptor::binary("Payload", 70_000, true);
        assert_eq!(medium.sql_type(), "MEDIUMBLOB");

        let large = ColumnDescriptor::binary("Payload", 20_000_000, true);
        assert_eq!(large.sql_type(), "LONGBLOB");
    }

    #[test]
    fn definition_includes_flags() {
        let mut column = ColumnDescriptor::long("Identifier", true);
        column.kind = ColumnKind::UnsignedLong;
        column.not_null = true;
        column.auto_increment = true;
        assert_eq!(
            column.format_definition().unwrap(),
            "`Identifier` BIGINT UNSIGNED NOT NULL AUTO_INCREMENT"
        );
    }

    #[test]
    fn cache_returns_same_instance() {
        let cache = SchemaCache::new();
        let first = cache.get_or_derive::<ExtendedTable>().unwrap();
        let second = cache.get_or_derive::<ExtendedTable>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn duplicate_column_is_config_error() {
        let fields = [
            FieldSpec::new("Name", FieldType::Text),
            FieldSpec::new("Name", FieldType::Int),
        ];
        let err = TableSchema::from_fields("dupes", &fields).unwrap_err();
        assert!(matches!(err, OrmError::Config(_)));
    }
}

//! Typed INSERT builder, upsert variant, and identity retrieval.

use crate::command::{SqlCommand, SqlCommandText, SqlFields, SqlQuery};
use crate::error::{OrmError, OrmResult};
use crate::ident::{quote_identifier, quote_string_literal};
use crate::model::Model;
use crate::schema::{TableSchema, ValueConverter};
use crate::value::FromScalarValue;
use std::marker::PhantomData;

/// INSERT of one fully populated record.
///
/// Values render as literals in declaration order. Auto-increment columns
/// are excluded: the server assigns them.
#[derive(Debug, Clone)]
pub struct InsertInto {
    table: String,
    values: Vec<(String, String)>,
    update_on_duplicate_key: bool,
    auto_increment_columns: usize,
}

impl InsertInto {
    /// Build an INSERT from a record. Conversion failures surface here.
    pub fn row<T: Model>(record: &T) -> OrmResult<Self> {
        let schema = TableSchema::of::<T>()?;
        let values = record.values()?;
        if values.len() != schema.columns.len() {
            return Err(OrmError::config(format!(
                "Table '{}' expects {} values, the record produced {}",
                schema.table,
                schema.columns.len(),
                values.len()
            )));
        }

        let mut rendered = Vec::with_capacity(schema.columns.len());
        let mut auto_increment_columns = 0;
        for (column, value) in schema.columns.iter().zip(values) {
            if column.descriptor.auto_increment {
                auto_increment_columns += 1;
                continue;
            }

            let name = &column.descriptor.name;
            let literal = match column.converter.to_canonical(name, &value)? {
                None => "NULL".to_string(),
                Some(text) if column.requires_quoting => quote_string_literal(&text),
                Some(text) => text,
            };
            rendered.push((name.clone(), literal));
        }

        Ok(Self {
            table: schema.table.clone(),
            values: rendered,
            update_on_duplicate_key: false,
            auto_increment_columns,
        })
    }

    /// The upsert variant: appends `ON DUPLICATE KEY UPDATE` over every
    /// inserted column.
    pub fn update_on_duplicate_key(&self) -> Self {
        Self {
            update_on_duplicate_key: true,
            ..self.clone()
        }
    }

    /// Follow the insert with `SELECT LAST_INSERT_ID()` and materialize
    /// the assigned identity as `V`.
    ///
    /// Valid only when the schema has exactly one auto-increment column.
    pub fn get_last_insert_identity<V: FromScalarValue>(&self) -> OrmResult<InsertIdentity<V>> {
        if self.auto_increment_columns != 1 {
            return Err(OrmError::validation(format!(
                "last-insert identity requires exactly one auto-increment column, found {}",
                self.auto_increment_columns
            )));
        }
        Ok(InsertIdentity {
            insert: self.clone(),
            _marker: PhantomData,
        })
    }
}

impl SqlCommand for InsertInto {
    fn format(&self) -> OrmResult<SqlCommandText> {
        let columns: Vec<String> = self
            .values
            .iter()
            .map(|(name, _)| quote_identifier(name))
            .collect::<OrmResult<_>>()?;
        let literals: Vec<&str> = self.values.iter().map(|(_, value)| value.as_str()).collect();

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(&self.table)?,
            columns.join(", "),
            literals.join(", ")
        );

        if self.update_on_duplicate_key {
            let assignments: Vec<String> = columns
                .iter()
                .zip(&self.values)
                .map(|(column, (_, value))| format!("{column}={value}"))
                .collect();
            sql.push('\n');
            sql.push_str(&format!(
                "ON DUPLICATE KEY UPDATE {}",
                assignments.join(", ")
            ));
        }

        Ok(SqlCommandText::without_parameters(sql))
    }
}

/// An INSERT followed by `SELECT LAST_INSERT_ID()`, typed over the
/// caller's requested identity width.
#[derive(Debug, Clone)]
pub struct InsertIdentity<V> {
    insert: InsertInto,
    _marker: PhantomData<fn() -> V>,
}

impl<V> SqlCommand for InsertIdentity<V> {
    fn format(&self) -> OrmResult<SqlCommandText> {
        let mut text = self.insert.format()?;
        text.command.push_str(";\nSELECT LAST_INSERT_ID()");
        Ok(text)
    }
}

impl<V: FromScalarValue> SqlQuery for InsertIdentity<V> {
    type Output = V;

    fn translate_row(&self, fields: &dyn SqlFields) -> OrmResult<Option<V>> {
        let raw = fields.get(0)?;
        let value = ValueConverter::UnsignedLong.from_raw("LAST_INSERT_ID", raw)?;
        if value.is_null() {
            return Ok(None);
        }
        V::from_scalar(value, "LAST_INSERT_ID").map(Some)
    }
}

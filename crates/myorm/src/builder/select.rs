//! Typed SELECT builder.

use super::aggregate::{SelectGroupedValue, SelectValue, ValueOperation};
use super::where_clause::ConstraintChain;
use crate::command::{SqlCommand, SqlCommandText, SqlFields, SqlQuery};
use crate::error::OrmResult;
use crate::ident::quote_identifier;
use crate::model::Model;
use crate::schema::TableSchema;
use crate::value::ScalarValue;
use chrono::Weekday;
use std::marker::PhantomData;

/// SELECT over all mapped columns of `T`, in declaration order.
///
/// Every chaining method returns a new builder; the receiver is never
/// mutated. Conversion failures surface at the call that introduced the
/// offending value.
#[derive(Debug, Clone)]
pub struct Select<T: Model> {
    chain: ConstraintChain,
    columns: Vec<String>,
    limit: Option<u32>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Model> Select<T> {
    /// Select every mapped column of `T`.
    pub fn all() -> OrmResult<Self> {
        let schema = TableSchema::of::<T>()?;
        let columns = schema
            .columns
            .iter()
            .map(|c| c.descriptor.name.clone())
            .collect();
        Ok(Self {
            chain: ConstraintChain::new(schema),
            columns,
            limit: None,
            _marker: PhantomData,
        })
    }

    fn with_chain(&self, chain: ConstraintChain) -> Self {
        Self {
            chain,
            columns: self.columns.clone(),
            limit: self.limit,
            _marker: PhantomData,
        }
    }

    pub fn where_equal(&self, column: &str, value: impl Into<ScalarValue>) -> OrmResult<Self> {
        Ok(self.with_chain(self.chain.equal(column, value.into())?))
    }

    pub fn where_not_equal(&self, column: &str, value: impl Into<ScalarValue>) -> OrmResult<Self> {
        Ok(self.with_chain(self.chain.not_equal(column, value.into())?))
    }

    pub fn where_greater_or_equal(
        &self,
        column: &str,
        value: impl Into<ScalarValue>,
    ) -> OrmResult<Self> {
        Ok(self.with_chain(self.chain.greater_or_equal(column, value.into())?))
    }

    pub fn where_less(&self, column: &str, value: impl Into<ScalarValue>) -> OrmResult<Self> {
        Ok(self.with_chain(self.chain.less(column, value.into())?))
    }

    /// LIKE `%value%`. Literal `%`/`_` inside `value` act as wildcards.
    pub fn where_contains(&self, column: &str, value: &str) -> OrmResult<Self> {
        Ok(self.with_chain(self.chain.like(column, value, |v| format!("%{v}%"))?))
    }

    /// LIKE `value%`.
    pub fn where_starts_with(&self, column: &str, value: &str) -> OrmResult<Self> {
        Ok(self.with_chain(self.chain.like(column, value, |v| format!("{v}%"))?))
    }

    /// LIKE `%value`.
    pub fn where_ends_with(&self, column: &str, value: &str) -> OrmResult<Self> {
        Ok(self.with_chain(self.chain.like(column, value, |v| format!("%{v}"))?))
    }

    /// IN over one placeholder per value; empty sets are a usage error.
    pub fn where_in<V: Into<ScalarValue>>(
        &self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> OrmResult<Self> {
        let values = values.into_iter().map(Into::into).collect();
        Ok(self.with_chain(self.chain.in_list(column, values)?))
    }

    /// `DAYOFWEEK(column) = n`, Sunday = 1; valid only on DATE columns.
    pub fn where_day_of_week(&self, column: &str, day: Weekday) -> OrmResult<Self> {
        Ok(self.with_chain(self.chain.day_of_week(column, day)?))
    }

    /// Limit the result to at most `count` records.
    pub fn take(&self, count: u32) -> Self {
        let mut next = self.with_chain(self.chain.clone());
        next.limit = Some(count);
        next
    }

    /// Aggregate to `MAX(column)`, carrying the accumulated constraints.
    pub fn maximum<V>(&self, column: &str) -> OrmResult<SelectValue<T, V>> {
        SelectValue::new(self.chain.clone(), column, ValueOperation::Maximum)
    }

    /// Aggregate to `MIN(column)`, carrying the accumulated constraints.
    pub fn minimum<V>(&self, column: &str) -> OrmResult<SelectValue<T, V>> {
        SelectValue::new(self.chain.clone(), column, ValueOperation::Minimum)
    }

    /// Aggregate to `SUM(column)`, carrying the accumulated constraints.
    pub fn sum<V>(&self, column: &str) -> OrmResult<SelectValue<T, V>> {
        SelectValue::new(self.chain.clone(), column, ValueOperation::Sum)
    }

    /// Aggregate to `SUM(value_column)` grouped by `group_column`.
    pub fn sum_by<V, G>(
        &self,
        value_column: &str,
        group_column: &str,
    ) -> OrmResult<SelectGroupedValue<T, G, V>> {
        SelectGroupedValue::new(self.chain.clone(), group_column, value_column)
    }
}

impl<T: Model> SqlCommand for Select<T> {
    fn format(&self) -> OrmResult<SqlCommandText> {
        let schema = self.chain.schema();
        let quoted: Vec<String> = self
            .columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<OrmResult<_>>()?;

        let mut sql = format!(
            "SELECT {} FROM {}",
            quoted.join(", "),
            quote_identifier(&schema.table)?
        );
        self.chain.append_clauses(&mut sql)?;

        if let Some(limit) = self.limit {
            sql.push_str(&format!("\nLIMIT {limit}"));
        }

        Ok(SqlCommandText::new(sql, self.chain.parameters()))
    }
}

impl<T: Model> SqlQuery for Select<T> {
    type Output = T;

    fn translate_row(&self, fields: &dyn SqlFields) -> OrmResult<Option<T>> {
        let schema = self.chain.schema();
        let mut values = Vec::with_capacity(schema.columns.len());
        for (index, column) in schema.columns.iter().enumerate() {
            let raw = fields.get(index)?;
            values.push(column.converter.from_raw(&column.descriptor.name, raw)?);
        }
        T::from_values(values).map(Some)
    }
}

//! Typed DELETE builder.

use super::where_clause::ConstraintChain;
use crate::command::{SqlCommand, SqlCommandText};
use crate::error::OrmResult;
use crate::ident::quote_identifier;
use crate::model::Model;
use crate::schema::TableSchema;
use crate::value::ScalarValue;
use chrono::Weekday;
use std::marker::PhantomData;

/// DELETE with the same constraint chain as SELECT; projects nothing.
#[derive(Debug, Clone)]
pub struct Delete<T: Model> {
    chain: ConstraintChain,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Model> Delete<T> {
    /// Delete over every row; narrow with constraints.
    pub fn all() -> OrmResult<Self> {
        let schema = TableSchema::of::<T>()?;
        Ok(Self {
            chain: ConstraintChain::new(schema),
            _marker: PhantomData,
        })
    }

    fn with_chain(&self, chain: ConstraintChain) -> Self {
        Self {
            chain,
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
}

impl<T: Model> SqlCommand for Delete<T> {
    fn format(&self) -> OrmResult<SqlCommandText> {
        let mut sql = format!(
            "DELETE FROM {}",
            quote_identifier(&self.chain.schema().table)?
        );
        self.chain.append_clauses(&mut sql)?;
        Ok(SqlCommandText::new(sql, self.chain.parameters()))
    }
}

//! Aggregate SELECT commands produced by [`Select`](super::Select).

use super::where_clause::ConstraintChain;
use crate::command::{SqlCommand, SqlCommandText, SqlFields, SqlQuery};
use crate::error::OrmResult;
use crate::ident::quote_identifier;
use crate::model::Model;
use crate::value::{FromScalarValue, ScalarValue};
use std::marker::PhantomData;

/// The aggregate functions a value selection can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOperation {
    Maximum,
    Minimum,
    Sum,
}

impl ValueOperation {
    fn function(self) -> &'static str {
        match self {
            Self::Maximum => "MAX",
            Self::Minimum => "MIN",
            Self::Sum => "SUM",
        }
    }
}

/// SELECT of a single aggregated value.
///
/// An aggregate over zero rows yields SQL NULL, which materializes as a
/// skipped row; `execute_single` then reports absence instead of a value.
#[derive(Debug, Clone)]
pub struct SelectValue<T: Model, V> {
    chain: ConstraintChain,
    column: String,
    operation: ValueOperation,
    _marker: PhantomData<fn() -> (T, V)>,
}

impl<T: Model, V> SelectValue<T, V> {
    pub(super) fn new(
        chain: ConstraintChain,
        column: &str,
        operation: ValueOperation,
    ) -> OrmResult<Self> {
        chain.schema().column(column)?;
        Ok(Self {
            chain,
            column: column.to_string(),
            operation,
            _marker: PhantomData,
        })
    }
}

impl<T: Model, V> SqlCommand for SelectValue<T, V> {
    fn format(&self) -> OrmResult<SqlCommandText> {
        let mut sql = format!(
            "SELECT {}({}) FROM {}",
            self.operation.function(),
            quote_identifier(&self.column)?,
            quote_identifier(&self.chain.schema().table)?
        );
        self.chain.append_clauses(&mut sql)?;
        Ok(SqlCommandText::new(sql, self.chain.parameters()))
    }
}

impl<T: Model, V: FromScalarValue> SqlQuery for SelectValue<T, V> {
    type Output = V;

    fn translate_row(&self, fields: &dyn SqlFields) -> OrmResult<Option<V>> {
        let column = self.chain.schema().column(&self.column)?;
        let value = column.converter.from_raw(&self.column, fields.get(0)?)?;
        if value.is_null() {
            return Ok(None);
        }
        V::from_scalar(value, &self.column).map(Some)
    }
}

/// A group key paired with its aggregated value.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedValue<G, V> {
    pub group: Option<G>,
    pub value: Option<V>,
}

/// SELECT of per-group sums: `SELECT g, SUM(v) … GROUP BY g`.
#[derive(Debug, Clone)]
pub struct SelectGroupedValue<T: Model, G, V> {
    chain: ConstraintChain,
    group_column: String,
    value_column: String,
    _marker: PhantomData<fn() -> (T, G, V)>,
}

impl<T: Model, G, V> SelectGroupedValue<T, G, V> {
    pub(super) fn new(
        chain: ConstraintChain,
        group_column: &str,
        value_column: &str,
    ) -> OrmResult<Self> {
        chain.schema().column(group_column)?;
        chain.schema().column(value_column)?;
        Ok(Self {
            chain,
            group_column: group_column.to_string(),
            value_column: value_column.to_string(),
            _marker: PhantomData,
        })
    }
}

impl<T: Model, G, V> SqlCommand for SelectGroupedValue<T, G, V> {
    fn format(&self) -> OrmResult<SqlCommandText> {
        let group = quote_identifier(&self.group_column)?;
        let mut sql = format!(
            "SELECT {group}, SUM({}) FROM {}",
            quote_identifier(&self.value_column)?,
            quote_identifier(&self.chain.schema().table)?
        );
        self.chain.append_clauses(&mut sql)?;
        sql.push_str(&format!("\nGROUP BY {group}"));
        Ok(SqlCommandText::new(sql, self.chain.parameters()))
    }
}

impl<T: Model, G: FromScalarValue, V: FromScalarValue> SqlQuery for SelectGroupedValue<T, G, V> {
    type Output = GroupedValue<G, V>;

    fn translate_row(&self, fields: &dyn SqlFields) -> OrmResult<Option<GroupedValue<G, V>>> {
        let schema = self.chain.schema();
        let group_converter = schema.column(&self.group_column)?.converter;
        let value_converter = schema.column(&self.value_column)?.converter;

        let group_value = group_converter.from_raw(&self.group_column, fields.get(0)?)?;
        let sum_value = value_converter.from_raw(&self.value_column, fields.get(1)?)?;

        let group = match group_value {
            ScalarValue::Null => None,
            other => Some(G::from_scalar(other, &self.group_column)?),
        };
        let value = match sum_value {
            ScalarValue::Null => None,
            other => Some(V::from_scalar(other, &self.value_column)?),
        };

        Ok(Some(GroupedValue { group, value }))
    }
}

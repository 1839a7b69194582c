//! Typed UPDATE builder.

use super::where_clause::ConstraintChain;
use crate::command::{SqlCommand, SqlCommandText};
use crate::error::{OrmError, OrmResult};
use crate::ident::{quote_identifier, quote_string_literal};
use crate::model::Model;
use crate::schema::TableSchema;
use crate::value::ScalarValue;
use std::marker::PhantomData;

/// UPDATE with last-write-wins assignments and a conjunctive constraint
/// chain.
#[derive(Debug, Clone)]
pub struct Update<T: Model> {
    chain: ConstraintChain,
    assignments: Vec<(String, String)>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Model> Update<T> {
    /// Start an empty update for `T`'s table.
    pub fn create() -> OrmResult<Self> {
        let schema = TableSchema::of::<T>()?;
        Ok(Self {
            chain: ConstraintChain::new(schema),
            assignments: Vec::new(),
            _marker: PhantomData,
        })
    }

    fn with_chain(&self, chain: ConstraintChain) -> Self {
        Self {
            chain,
            assignments: self.assignments.clone(),
            _marker: PhantomData,
        }
    }

    /// Assign a column. Setting the same column again replaces the prior
    /// assignment; the list keeps one entry per column.
    pub fn set(&self, column: &str, value: impl Into<ScalarValue>) -> OrmResult<Self> {
        let schema_column = self.chain.schema().column(column)?;
        let literal = match schema_column.converter.to_canonical(column, &value.into())? {
            None => "NULL".to_string(),
            Some(text) if schema_column.requires_quoting => quote_string_literal(&text),
            Some(text) => text,
        };

        let mut assignments = self.assignments.clone();
        assignments.retain(|(name, _)| name != column);
        assignments.push((column.to_string(), literal));

        Ok(Self {
            chain: self.chain.clone(),
            assignments,
            _marker: PhantomData,
        })
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
}

impl<T: Model> SqlCommand for Update<T> {
    fn format(&self) -> OrmResult<SqlCommandText> {
        // An update without assignments would render malformed SQL.
        if self.assignments.is_empty() {
            return Err(OrmError::validation(
                "UPDATE requires at least one assignment",
            ));
        }

        let assignments: Vec<String> = self
            .assignments
            .iter()
            .map(|(column, literal)| {
                Ok(format!("{} = {literal}", quote_identifier(column)?))
            })
            .collect::<OrmResult<_>>()?;

        let mut sql = format!(
            "UPDATE {} SET {}",
            quote_identifier(&self.chain.schema().table)?,
            assignments.join(", ")
        );
        self.chain.append_clauses(&mut sql)?;

        Ok(SqlCommandText::new(sql, self.chain.parameters()))
    }
}

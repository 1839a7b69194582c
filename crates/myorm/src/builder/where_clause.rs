//! Predicate nodes and the shared constraint chain.
//!
//! Every constraint in a statement is one conjunctive node; the first node
//! renders with `WHERE`, every later one with `AND`. Nodes are pure values:
//! formatting never mutates them, and adding a node produces a new chain.

use crate::command::{ParamValue, SqlParameterValue};
use crate::error::{OrmError, OrmResult};
use crate::ident::quote_identifier;
use crate::schema::{ColumnKind, TableSchema};
use crate::value::ScalarValue;
use chrono::Weekday;
use std::sync::Arc;

/// One conjunctive condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    Equal {
        column: String,
        placeholder: String,
        value: ParamValue,
    },
    NotEqual {
        column: String,
        placeholder: String,
        value: ParamValue,
    },
    GreaterOrEqual {
        column: String,
        placeholder: String,
        value: ParamValue,
    },
    Less {
        column: String,
        placeholder: String,
        value: ParamValue,
    },
    Like {
        column: String,
        placeholder: String,
        value: ParamValue,
    },
    In {
        column: String,
        placeholders: Vec<String>,
        values: Vec<ParamValue>,
    },
    /// `DAYOFWEEK(column) = day`; carries no bound parameter
    DayOfWeek { column: String, day: u8 },
}

impl Where {
    /// Number of parameters this node binds.
    pub fn parameter_count(&self) -> usize {
        match self {
            Self::In { values, .. } => values.len(),
            Self::DayOfWeek { .. } => 0,
            _ => 1,
        }
    }

    /// The node's bound parameters, in placeholder order.
    pub fn parameters(&self) -> Vec<SqlParameterValue> {
        match self {
            Self::Equal {
                placeholder, value, ..
            }
            | Self::NotEqual {
                placeholder, value, ..
            }
            | Self::GreaterOrEqual {
                placeholder, value, ..
            }
            | Self::Less {
                placeholder, value, ..
            }
            | Self::Like {
                placeholder, value, ..
            } => vec![SqlParameterValue::new(placeholder.clone(), value.clone())],
            Self::In {
                placeholders,
                values,
                ..
            } => placeholders
                .iter()
                .zip(values)
                .map(|(name, value)| SqlParameterValue::new(name.clone(), value.clone()))
                .collect(),
            Self::DayOfWeek { .. } => Vec::new(),
        }
    }

    /// Render the node; the first constraint in a chain uses `WHERE`,
    /// every later one `AND`.
    pub fn format(&self, first: bool) -> OrmResult<String> {
        let keyword = if first { "WHERE" } else { "AND" };
        match self {
            Self::Equal {
                column, placeholder, ..
            } => Ok(format!(
                "{keyword} {} = {placeholder}",
                quote_identifier(column)?
            )),
            Self::NotEqual {
                column, placeholder, ..
            } => Ok(format!(
                "{keyword} {} <> {placeholder}",
                quote_identifier(column)?
            )),
            Self::GreaterOrEqual {
                column, placeholder, ..
            } => Ok(format!(
                "{keyword} {} >= {placeholder}",
                quote_identifier(column)?
            )),
            Self::Less {
                column, placeholder, ..
            } => Ok(format!(
                "{keyword} {} < {placeholder}",
                quote_identifier(column)?
            )),
            Self::Like {
                column, placeholder, ..
            } => Ok(format!(
                "{keyword} {} LIKE {placeholder}",
                quote_identifier(column)?
            )),
            Self::In {
                column,
                placeholders,
                ..
            } => Ok(format!(
                "{keyword} {} IN ({})",
                quote_identifier(column)?,
                placeholders.join(", ")
            )),
            Self::DayOfWeek { column, day } => Ok(format!(
                "{keyword} DAYOFWEEK({}) = {day}",
                quote_identifier(column)?
            )),
        }
    }
}

/// The conjunctive constraint chain shared by SELECT, UPDATE and DELETE.
///
/// Placeholders are numbered `@p0, @p1, …` cumulatively across the chain,
/// counting every value of a multi-value IN node.
#[derive(Debug, Clone)]
pub(crate) struct ConstraintChain {
    schema: Arc<TableSchema>,
    items: Vec<Where>,
}

impl ConstraintChain {
    pub fn new(schema: Arc<TableSchema>) -> Self {
        Self {
            schema,
            items: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    pub fn items(&self) -> &[Where] {
        &self.items
    }

    pub fn parameter_count(&self) -> usize {
        self.items.iter().map(Where::parameter_count).sum()
    }

    fn placeholder(index: usize) -> String {
        format!("@p{index}")
    }

    fn push(&self, node: Where) -> Self {
        let mut items = self.items.clone();
        items.push(node);
        Self {
            schema: Arc::clone(&self.schema),
            items,
        }
    }

    fn comparison(
        &self,
        column: &str,
        value: ScalarValue,
        build: fn(String, String, ParamValue) -> Where,
    ) -> OrmResult<Self> {
        let schema_column = self.schema.column(column)?;
        let param = schema_column.converter.to_param(column, &value)?;
        let placeholder = Self::placeholder(self.parameter_count());
        Ok(self.push(build(column.to_string(), placeholder, param)))
    }

    pub fn equal(&self, column: &str, value: ScalarValue) -> OrmResult<Self> {
        self.comparison(column, value, |column, placeholder, value| Where::Equal {
            column,
            placeholder,
            value,
        })
    }

    pub fn not_equal(&self, column: &str, value: ScalarValue) -> OrmResult<Self> {
        self.comparison(column, value, |column, placeholder, value| Where::NotEqual {
            column,
            placeholder,
            value,
        })
    }

    pub fn greater_or_equal(&self, column: &str, value: ScalarValue) -> OrmResult<Self> {
        self.comparison(column, value, |column, placeholder, value| {
            Where::GreaterOrEqual {
                column,
                placeholder,
                value,
            }
        })
    }

    pub fn less(&self, column: &str, value: ScalarValue) -> OrmResult<Self> {
        self.comparison(column, value, |column, placeholder, value| Where::Less {
            column,
            placeholder,
            value,
        })
    }

    /// LIKE with the wildcard pattern embedded into the bound value.
    /// Literal `%`/`_` in the needle are not escaped.
    pub fn like(&self, column: &str, value: &str, wrap: fn(&str) -> String) -> OrmResult<Self> {
        let schema_column = self.schema.column(column)?;
        let canonical = schema_column
            .converter
            .to_canonical(column, &ScalarValue::Text(value.to_string()))?
            .ok_or_else(|| OrmError::conversion(column, "cannot build a LIKE pattern from NULL"))?;
        let placeholder = Self::placeholder(self.parameter_count());
        Ok(self.push(Where::Like {
            column: column.to_string(),
            placeholder,
            value: ParamValue::Text(wrap(&canonical)),
        }))
    }

    /// IN with one placeholder per value. An empty value set is a usage
    /// error raised before any SQL exists.
    pub fn in_list(&self, column: &str, values: Vec<ScalarValue>) -> OrmResult<Self> {
        if values.is_empty() {
            return Err(OrmError::validation(
                "IN constraint requires at least one value",
            ));
        }

        let schema_column = self.schema.column(column)?;
        let start = self.parameter_count();
        let mut placeholders = Vec::with_capacity(values.len());
        let mut params = Vec::with_capacity(values.len());
        for (offset, value) in values.iter().enumerate() {
            placeholders.push(Self::placeholder(start + offset));
            params.push(schema_column.converter.to_param(column, value)?);
        }

        Ok(self.push(Where::In {
            column: column.to_string(),
            placeholders,
            values: params,
        }))
    }

    /// `DAYOFWEEK(column) = n` with MySQL's Sunday = 1 convention.
    pub fn day_of_week(&self, column: &str, day: Weekday) -> OrmResult<Self> {
        let schema_column = self.schema.column(column)?;
        if schema_column.descriptor.kind != ColumnKind::Date {
            return Err(OrmError::validation(format!(
                "day-of-week constraints require a DATE column, '{column}' is not one"
            )));
        }
        let day_number = day.num_days_from_sunday() as u8 + 1;
        Ok(self.push(Where::DayOfWeek {
            column: column.to_string(),
            day: day_number,
        }))
    }

    /// Append the chain's clauses to a statement, newline-separated.
    pub fn append_clauses(&self, sql: &mut String) -> OrmResult<()> {
        for (index, node) in self.items.iter().enumerate() {
            sql.push('\n');
            sql.push_str(&node.format(index == 0)?);
        }
        Ok(())
    }

    /// All bound parameters, in placeholder order.
    pub fn parameters(&self) -> Vec<SqlParameterValue> {
        self.items.iter().flat_map(Where::parameters).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::ExtendedTable;

    fn chain() -> ConstraintChain {
        ConstraintChain::new(TableSchema::of::<ExtendedTable>().unwrap())
    }

    #[test]
    fn placeholders_count_cumulatively_across_in_lists() {
        let chain = chain()
            .in_list(
                "Age",
                vec![ScalarValue::Int(1), ScalarValue::Int(2), ScalarValue::Int(3)],
            )
            .unwrap()
            .equal("Name", ScalarValue::Text("Peter".to_string()))
            .unwrap();

        let params = chain.parameters();
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["@p0", "@p1", "@p2", "@p3"]);
    }

    #[test]
    fn empty_in_list_is_rejected() {
        let err = chain().in_list("Age", Vec::new()).unwrap_err();
        assert!(matches!(err, OrmError::Validation(_)));
    }

    #[test]
    fn unknown_column_is_config_error() {
        let err = chain()
            .equal("Nickname", ScalarValue::Text("x".to_string()))
            .unwrap_err();
        assert!(matches!(err, OrmError::Config(_)));
    }

    #[test]
    fn formatting_twice_is_identical() {
        let chain = chain()
            .equal("Name", ScalarValue::Text("Peter".to_string()))
            .unwrap();
        let node = &chain.items()[0];
        assert_eq!(node.format(true).unwrap(), node.format(true).unwrap());
        assert_eq!(node.format(true).unwrap(), "WHERE `Name` = @p0");
        assert_eq!(node.format(false).unwrap(), "AND `Name` = @p0");
    }

    #[test]
    fn adding_a_constraint_leaves_the_original_chain_untouched() {
        let base = chain()
            .equal("Name", ScalarValue::Text("Peter".to_string()))
            .unwrap();
        let extended = base.equal("Age", ScalarValue::Int(42)).unwrap();
        assert_eq!(base.items().len(), 1);
        assert_eq!(extended.items().len(), 2);
    }

    #[test]
    fn conversion_failure_surfaces_at_the_call() {
        let err = chain().equal("Age", ScalarValue::Text("old".to_string())).unwrap_err();
        assert!(err.is_conversion());
    }
}

//! Table-level commands: CREATE TABLE, DROP TABLE, existence probe, and
//! the ensure helper.

use crate::command::{SqlCommand, SqlCommandText, SqlFields, SqlQuery};
use crate::connection::{SqlCommandExt, SqlConnection, SqlQueryExt};
use crate::error::OrmResult;
use crate::ident::{escape_string_literal, quote_identifier};
use crate::model::Model;
use crate::schema::{ColumnDescriptor, TableSchema};
use crate::value::RawValue;

/// CREATE TABLE from accumulated column descriptors.
///
/// The PRIMARY KEY clause is omitted when no column is flagged; multiple
/// flagged columns form a composite key in declaration order.
#[derive(Debug, Clone)]
pub struct CreateTable {
    name: String,
    columns: Vec<ColumnDescriptor>,
}

impl CreateTable {
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a column, returning a new builder.
    pub fn with(&self, column: ColumnDescriptor) -> Self {
        let mut columns = self.columns.clone();
        columns.push(column);
        Self {
            name: self.name.clone(),
            columns,
        }
    }

    /// Build from a model's derived schema.
    pub fn for_model<T: Model>() -> OrmResult<Self> {
        let schema = TableSchema::of::<T>()?;
        Ok(Self {
            name: schema.table.clone(),
            columns: schema
                .columns
                .iter()
                .map(|c| c.descriptor.clone())
                .collect(),
        })
    }
}

impl SqlCommand for CreateTable {
    fn format(&self) -> OrmResult<SqlCommandText> {
        let definitions: Vec<String> = self
            .columns
            .iter()
            .map(ColumnDescriptor::format_definition)
            .collect::<OrmResult<_>>()?;

        let mut sql = format!("CREATE TABLE {}(\n", quote_identifier(&self.name)?);
        sql.push_str(&definitions.join(", "));

        let primary_keys: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| quote_identifier(&c.name))
            .collect::<OrmResult<_>>()?;

        if primary_keys.is_empty() {
            sql.push('\n');
        } else {
            sql.push_str(",\n");
            sql.push_str(&format!("PRIMARY KEY ({})\n", primary_keys.join(", ")));
        }
        sql.push(')');

        Ok(SqlCommandText::without_parameters(sql))
    }
}

/// DROP TABLE.
#[derive(Debug, Clone)]
pub struct DropTable {
    name: String,
}

impl DropTable {
    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn for_model<T: Model>() -> OrmResult<Self> {
        let schema = TableSchema::of::<T>()?;
        Ok(Self {
            name: schema.table.clone(),
        })
    }
}

impl SqlCommand for DropTable {
    fn format(&self) -> OrmResult<SqlCommandText> {
        Ok(SqlCommandText::without_parameters(format!(
            "DROP TABLE {}",
            quote_identifier(&self.name)?
        )))
    }
}

/// Existence probe against `information_schema.tables`, scoped to the
/// current database. Materializes "a row came back" as `true`.
#[derive(Debug, Clone)]
pub struct HasTable {
    name: String,
}

impl HasTable {
    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn for_model<T: Model>() -> OrmResult<Self> {
        let schema = TableSchema::of::<T>()?;
        Ok(Self {
            name: schema.table.clone(),
        })
    }
}

impl SqlCommand for HasTable {
    fn format(&self) -> OrmResult<SqlCommandText> {
        Ok(SqlCommandText::without_parameters(format!(
            "SELECT * FROM information_schema.tables WHERE table_name = '{}' AND table_schema = DATABASE() LIMIT 1",
            escape_string_literal(&self.name)
        )))
    }
}

impl SqlQuery for HasTable {
    type Output = bool;

    fn translate_row(&self, fields: &dyn SqlFields) -> OrmResult<Option<bool>> {
        Ok(Some(!matches!(fields.get(0)?, RawValue::Null)))
    }
}

/// Convenience entry points for table lifecycle management.
pub struct Table;

impl Table {
    pub async fn create<T: Model>(connection: &impl SqlConnection) -> OrmResult<()> {
        CreateTable::for_model::<T>()?.execute(connection).await
    }

    pub async fn drop<T: Model>(connection: &impl SqlConnection) -> OrmResult<()> {
        DropTable::for_model::<T>()?.execute(connection).await
    }

    pub async fn has<T: Model>(connection: &impl SqlConnection) -> OrmResult<bool> {
        let probe = HasTable::for_model::<T>()?;
        Ok(probe.execute_single(connection).await?.unwrap_or(false))
    }

    /// Create the table unless it already exists.
    pub async fn ensure<T: Model>(connection: &impl SqlConnection) -> OrmResult<()> {
        if !Self::has::<T>(connection).await? {
            Self::create::<T>(connection).await?;
        }
        Ok(())
    }
}

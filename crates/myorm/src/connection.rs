//! The execution-adapter boundary.
//!
//! The core produces [`SqlCommandText`] values; a connection adapter owns
//! everything past that point (sockets, authentication, transactions,
//! timeouts). The extension traits below are the caller-facing surface:
//! they format a command, hand it to the adapter, and map raw rows back
//! through the command's row translator.

use crate::command::{SqlCommand, SqlCommandText, SqlQuery};
use crate::error::OrmResult;
use crate::value::RawValue;

/// A live database connection, as the core sees it.
///
/// Implementations may suspend; the core never assumes execution is
/// synchronous.
pub trait SqlConnection: Send + Sync {
    /// Run a statement, discarding any result rows.
    fn execute(
        &self,
        command: &SqlCommandText,
    ) -> impl std::future::Future<Output = OrmResult<()>> + Send;

    /// Run a statement and fetch every result row's raw field values.
    fn query_rows(
        &self,
        command: &SqlCommandText,
    ) -> impl std::future::Future<Output = OrmResult<Vec<Vec<RawValue>>>> + Send;
}

/// Execution helpers available on every formatted command.
pub trait SqlCommandExt: SqlCommand {
    /// Format and run the command.
    fn execute(
        &self,
        connection: &impl SqlConnection,
    ) -> impl std::future::Future<Output = OrmResult<()>> {
        async move {
            let text = self.format()?;
            #[cfg(feature = "tracing")]
            tracing::debug!(sql = %text.command, "executing statement");
            connection.execute(&text).await
        }
    }

    /// Best-effort execution: any failure collapses to `false`, swallowing
    /// the cause. Not a general error-handling pattern.
    fn try_execute(
        &self,
        connection: &impl SqlConnection,
    ) -> impl std::future::Future<Output = bool> {
        async move { self.execute(connection).await.is_ok() }
    }
}

impl<C: SqlCommand> SqlCommandExt for C {}

/// Execution helpers available on every row-producing command.
pub trait SqlQueryExt: SqlQuery {
    /// Run the query and materialize every row, omitting rows the
    /// translator skips.
    fn execute_read(
        &self,
        connection: &impl SqlConnection,
    ) -> impl std::future::Future<Output = OrmResult<Vec<Self::Output>>> {
        async move {
            let text = self.format()?;
            #[cfg(feature = "tracing")]
            tracing::debug!(sql = %text.command, "reading statement");
            let rows = connection.query_rows(&text).await?;

            let mut records = Vec::with_capacity(rows.len());
            for row in rows {
                if let Some(record) = self.translate_row(&row)? {
                    records.push(record);
                }
            }
            Ok(records)
        }
    }

    /// Run the query and materialize the first row, if any. Zero rows is
    /// absence, never an error.
    fn execute_single(
        &self,
        connection: &impl SqlConnection,
    ) -> impl std::future::Future<Output = OrmResult<Option<Self::Output>>> {
        async move {
            let text = self.format()?;
            #[cfg(feature = "tracing")]
            tracing::debug!(sql = %text.command, "reading statement");
            let rows = connection.query_rows(&text).await?;

            match rows.first() {
                Some(row) => self.translate_row(row),
                None => Ok(None),
            }
        }
    }
}

impl<Q: SqlQuery> SqlQueryExt for Q {}

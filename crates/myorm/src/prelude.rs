//! Convenience re-exports for the common surface.

pub use crate::builder::{CreateTable, Delete, DropTable, HasTable, InsertInto, Select, Table, Update};
pub use crate::codec::{BlobCodec, JsonCodec};
pub use crate::command::{SqlCommand, SqlCommandText, SqlQuery};
pub use crate::connection::{SqlCommandExt, SqlConnection, SqlQueryExt};
pub use crate::error::{OrmError, OrmResult};
pub use crate::model::{Model, SqlEnum};
pub use crate::value::{FromScalarValue, ScalarValue};

#[cfg(feature = "mysql")]
pub use crate::mysql::MySqlConnection;

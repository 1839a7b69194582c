//! # myorm
//!
//! A model-definition-first statement builder and ORM for MySQL.
//!
//! ## Features
//!
//! - **Typed schemas**: a [`Model`] declares its table and fields once;
//!   the column schema is derived and cached per type
//! - **Persistent builders**: every `where_*`/`set` call returns a new
//!   statement value, so partially built statements are safely shareable
//! - **Round-trip converters**: each column kind has a canonical SQL
//!   representation and an exact inverse
//! - **Parameterized rendering**: value positions bind as `@pN`
//!   placeholders in first-occurrence order
//! - **Thin execution boundary**: the core emits [`SqlCommandText`];
//!   adapters own the wire
//!
//! ## Example
//!
//! ```ignore
//! use myorm::{Model, Select, SqlQueryExt};
//!
//! #[derive(Model)]
//! #[orm(table = "players")]
//! struct Player {
//!     #[orm(primary_key, column = "Identifier")]
//!     identifier: uuid::Uuid,
//!     #[orm(not_null, column = "Name")]
//!     name: String,
//!     #[orm(column = "Age")]
//!     age: i32,
//! }
//!
//! let adults = Select::<Player>::all()?
//!     .where_greater_or_equal("Age", 21)?
//!     .execute_read(&connection)
//!     .await?;
//! ```

pub mod builder;
pub mod codec;
pub mod command;
pub mod connection;
pub mod error;
pub mod ident;
pub mod model;
pub mod prelude;
pub mod schema;
pub mod value;

#[cfg(feature = "mysql")]
pub mod mysql;

pub use builder::{
    CreateTable, Delete, DropTable, GroupedValue, HasTable, InsertIdentity, InsertInto, Select,
    SelectGroupedValue, SelectValue, Table, Update, ValueOperation, Where,
};
pub use codec::{BlobCodec, JsonCodec};
pub use command::{ParamValue, SqlCommand, SqlCommandText, SqlFields, SqlParameterValue, SqlQuery};
pub use connection::{SqlCommandExt, SqlConnection, SqlQueryExt};
pub use error::{OrmError, OrmResult};
pub use model::{Model, SqlEnum};
pub use schema::{
    ColumnDescriptor, ColumnKind, FieldSpec, FieldType, SchemaCache, SchemaColumn, TableSchema,
    ValueConverter,
};
pub use value::{FromScalarValue, RawValue, ScalarValue};

#[cfg(feature = "mysql")]
pub use mysql::MySqlConnection;

//! Derive macros for myorm
//!
//! Provides `#[derive(Model)]` and `#[derive(SqlEnum)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod model;
mod sql_enum;

/// Derive the `Model` trait for a struct.
///
/// # Example
///
/// ```ignore
/// use myorm::Model;
///
/// #[derive(Model)]
/// #[orm(table = "players")]
/// struct Player {
///     #[orm(primary_key, column = "Identifier")]
///     identifier: uuid::Uuid,
///     #[orm(not_null, max_size = 128, column = "Name")]
///     name: String,
///     #[orm(column = "Age")]
///     age: i32,
/// }
/// ```
///
/// # Attributes
///
/// Struct level:
/// - `#[orm(table = "name")]` - Table name (required)
///
/// Field level:
/// - `#[orm(column = "name")]` - Column name (defaults to the field name)
/// - `#[orm(primary_key)]` - Part of the primary key
/// - `#[orm(not_null)]` - Declare the column NOT NULL
/// - `#[orm(auto_increment)]` - Server-assigned identity column
/// - `#[orm(fixed_size = N)]` - CHAR(N) instead of VARCHAR/TEXT
/// - `#[orm(max_size = N)]` - VARCHAR(N) (N <= 255) or sized blob
/// - `#[orm(time_fraction = N)]` - Fractional second digits for TIME
/// - `#[orm(enumeration)]` - Store the field through its `SqlEnum` impl
/// - `#[orm(blob)]` - Store the field through `JsonCodec`
/// - `#[orm(blob, codec = Type)]` - Store the field through a custom codec
#[proc_macro_derive(Model, attributes(orm))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive the `SqlEnum` trait for a unit-variant enum.
///
/// Ordinals follow declaration order, honoring explicit integer
/// discriminants.
#[proc_macro_derive(SqlEnum)]
pub fn derive_sql_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    sql_enum::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

//! Formatted command text, bound parameters, and the command traits.

use crate::error::OrmResult;
use crate::value::RawValue;

/// A value bound to a named placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Text(String),
    /// Binary payloads bind as raw bytes instead of text
    Bytes(Vec<u8>),
}

/// A named parameter accompanying a formatted command.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlParameterValue {
    /// Placeholder name, including the `@` prefix
    pub name: String,
    pub value: ParamValue,
}

impl SqlParameterValue {
    pub fn new(name: impl Into<String>, value: ParamValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A fully formatted SQL command alongside its bound parameters.
///
/// Parameter order matches placeholder first-occurrence order in
/// `command`; a command without bound values carries an empty list.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlCommandText {
    pub command: String,
    pub parameters: Vec<SqlParameterValue>,
}

impl SqlCommandText {
    pub fn new(command: impl Into<String>, parameters: Vec<SqlParameterValue>) -> Self {
        Self {
            command: command.into(),
            parameters,
        }
    }

    /// A command with no bound parameters.
    pub fn without_parameters(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            parameters: Vec::new(),
        }
    }
}

/// Positional access to one fetched row's raw field values.
pub trait SqlFields {
    fn get(&self, index: usize) -> OrmResult<RawValue>;
}

impl SqlFields for Vec<RawValue> {
    fn get(&self, index: usize) -> OrmResult<RawValue> {
        self.iter().nth(index).cloned().ok_or_else(|| {
            crate::error::OrmError::decode(
                format!("#{index}"),
                format!("row has only {} fields", self.len()),
            )
        })
    }
}

/// A formatted SQL command.
pub trait SqlCommand {
    /// Format the command and collect its parameters.
    ///
    /// Formatting is pure: calling it twice yields identical text and
    /// parameter lists.
    fn format(&self) -> OrmResult<SqlCommandText>;
}

/// An executable SQL command that can translate result rows.
pub trait SqlQuery: SqlCommand {
    type Output;

    /// Project one result row into a typed instance.
    ///
    /// Returns `Ok(None)` when the row should be skipped (e.g. a NULL
    /// aggregate over an empty table).
    fn translate_row(&self, fields: &dyn SqlFields) -> OrmResult<Option<Self::Output>>;
}

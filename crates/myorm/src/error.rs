//! Error types for myorm

use thiserror::Error;

/// Result type alias for myorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for statement building and execution
#[derive(Debug, Error)]
pub enum OrmError {
    /// Schema configuration error (bad table declaration, unknown column)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A field declared a type no column matcher claims
    #[error("Unsupported column type for field '{0}'")]
    UnsupportedType(String),

    /// Value cannot be rendered to its column's canonical form
    #[error("Conversion error on column '{column}': {message}")]
    Conversion { column: String, message: String },

    /// Row value cannot be interpreted by the column's converter
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Builder misuse (empty IN list, zero-assignment UPDATE, bad identifier)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Driver-level failure, raised only by connection adapters
    #[error("Execution error: {0}")]
    Execution(String),
}

impl OrmError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a conversion error for a specific column
    pub fn conversion(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Check if this is a conversion error
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion { .. })
    }

    /// Check if this error originated in the execution adapter
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}

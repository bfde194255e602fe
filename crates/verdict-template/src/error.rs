//! Template error types

use thiserror::Error;

/// Template error
///
/// Each failure kind is its own variant so callers can tell a missing
/// template (fix the load) from bad data (fail fast).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// No template registered under this identifier
    #[error("Template not found: {template}")]
    NotFound { template: String },

    /// The template source is not well formed
    #[error("Failed to parse template '{template}' at line {line}: {message}")]
    Parse {
        template: String,
        line: usize,
        message: String,
    },

    /// A placeholder references a field the data record does not have
    #[error("Template '{template}' references missing field '{field}'")]
    MissingField { template: String, field: String },

    /// The data record could not be turned into a rendering context
    #[error("Invalid data for template '{template}': {message}")]
    InvalidData { template: String, message: String },
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

//! Error types for Verdict Core

use thiserror::Error;

/// Errors raised while building a module set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleSetError {
    #[error("Module name must not be empty")]
    EmptyName,

    #[error("Duplicate module name: {name}")]
    DuplicateModule { name: String },

    #[error("Module set is empty")]
    Empty,

    #[error("Invalid query path '{path}': {reason}")]
    InvalidQueryPath { path: String, reason: String },

    #[error("Template context for module '{module}' is not serializable: {message}")]
    InvalidTemplateData { module: String, message: String },
}

/// Errors raised by a rule-text loader
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Rule module not found: {identifier}")]
    NotFound { identifier: String },

    #[error("Failed to read rule module '{identifier}': {message}")]
    Io { identifier: String, message: String },
}

/// Errors raised while decoding a raw engine result into a decision
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The result is neither a boolean nor a mapping
    #[error("Malformed result: expected a boolean or a mapping, found {found}")]
    UnexpectedResult { found: String },

    /// A reserved key is present with the wrong type
    #[error("Key '{key}' has the wrong shape: expected {expected}, found {found}")]
    Shape {
        key: String,
        expected: String,
        found: String,
    },

    /// A key the result contract requires is absent
    #[error("Required key '{key}' is missing from the result")]
    MissingKey { key: String },

    /// One entry of a diagnostic sequence could not be decoded
    #[error("Entry {index} of '{key}' is malformed at '{field}': {reason}")]
    MalformedEntry {
        key: String,
        index: usize,
        field: String,
        reason: String,
    },
}

impl DecodeError {
    /// Name of the offending key, when the error is tied to one
    pub fn key(&self) -> Option<&str> {
        match self {
            DecodeError::UnexpectedResult { .. } => None,
            DecodeError::Shape { key, .. }
            | DecodeError::MissingKey { key }
            | DecodeError::MalformedEntry { key, .. } => Some(key),
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_error_names_key() {
        let error = DecodeError::Shape {
            key: "is_valid".to_string(),
            expected: "boolean".to_string(),
            found: "string".to_string(),
        };
        assert_eq!(error.key(), Some("is_valid"));
        assert!(error.to_string().contains("is_valid"));
        assert!(error.to_string().contains("expected boolean"));
    }

    #[test]
    fn test_malformed_entry_display() {
        let error = DecodeError::MalformedEntry {
            key: "mismatches".to_string(),
            index: 2,
            field: "hint".to_string(),
            reason: "missing".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Entry 2 of 'mismatches' is malformed at 'hint': missing"
        );
    }

    #[test]
    fn test_unexpected_result_has_no_key() {
        let error = DecodeError::UnexpectedResult {
            found: "number".to_string(),
        };
        assert!(error.key().is_none());
    }

    #[test]
    fn test_module_set_error_display() {
        let error = ModuleSetError::DuplicateModule {
            name: "final_check.rego".to_string(),
        };
        assert_eq!(error.to_string(), "Duplicate module name: final_check.rego");
    }
}

//! SDK error types

use thiserror::Error;
use verdict_core::ModuleSetError;
use verdict_repository::RepositoryError;
use verdict_runtime::RuntimeError;
use verdict_template::TemplateError;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// The builder is missing something it needs
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid module set: {0}")]
    ModuleSet(#[from] ModuleSetError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl SdkError {
    /// True when the query ran but produced no decision
    pub fn is_empty_result(&self) -> bool {
        matches!(self, SdkError::Runtime(RuntimeError::EmptyResult { .. }))
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let error = SdkError::Config("query path is required".to_string());
        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("query path"));
    }

    #[test]
    fn test_empty_result_detection() {
        let error: SdkError = RuntimeError::EmptyResult {
            query: "data.p.allow".to_string(),
        }
        .into();
        assert!(error.is_empty_result());
        assert!(!SdkError::Config("x".to_string()).is_empty_result());
    }
}

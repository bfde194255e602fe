//! Runtime error types

use thiserror::Error;
use verdict_core::{DecodeError, LoadError};
use verdict_template::TemplateError;

/// A module set that cannot be compiled into one policy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Two declarations of the same rule cannot coexist
    #[error(
        "Conflicting declarations of '{rule}' in modules '{first_module}' and '{second_module}': {reason}"
    )]
    ConflictingDeclaration {
        rule: String,
        first_module: String,
        second_module: String,
        reason: String,
    },

    #[error("Module '{module}' has no package declaration")]
    MissingPackage { module: String },

    /// The query path does not address a rule any module declares
    #[error("Query path '{query}' does not name a declared rule")]
    QueryPathNotFound { query: String },

    /// The engine refused to load a module
    #[error("Engine rejected module '{module}': {message}")]
    EngineRejected { module: String, message: String },
}

/// Failure while evaluating a compiled policy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Failed to evaluate '{query}': {message}")]
    Engine { query: String, message: String },

    #[error("Input document cannot be passed to the engine: {0}")]
    Input(String),

    #[error("Engine result cannot be converted: {0}")]
    Output(String),
}

/// Runtime error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A file-backed module could not be read
    #[error("Failed to load rule module '{module}': {source}")]
    ModuleLoad {
        module: String,
        #[source]
        source: LoadError,
    },

    /// A templated module could not be rendered
    #[error("Failed to render rule module '{module}': {source}")]
    Template {
        module: String,
        #[source]
        source: TemplateError,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    /// The query produced no value for the input
    #[error("Query '{query}' produced no decision")]
    EmptyResult { query: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

//! Rule engine seam
//!
//! The decision layer never evaluates rules itself. A [`PolicyEngine`]
//! compiles a [`CompilationUnit`] into a [`CompiledPolicy`], which evaluates
//! the unit's query against input documents.

mod rego;

pub use rego::RegoEngine;

use crate::error::{CompileError, EvalError};
use crate::resolver::CompilationUnit;
use serde_json::Value;
use verdict_core::InputDocument;

/// Compiles resolved modules into an evaluable policy
pub trait PolicyEngine: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    fn compile(&self, unit: &CompilationUnit) -> Result<Box<dyn CompiledPolicy>, CompileError>;
}

/// A compiled policy bound to one query path
///
/// Implementations must not let one evaluation observe state left behind by
/// another. A policy may be evaluated from several threads at once.
pub trait CompiledPolicy: Send + Sync {
    /// Evaluate the query; `None` means the query produced no value
    fn evaluate(&self, input: &InputDocument) -> Result<Option<Value>, EvalError>;
}

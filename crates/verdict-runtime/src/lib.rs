//! Verdict Runtime - decision query preparation and evaluation
//!
//! Preparing a query runs four steps:
//! 1. **Resolve** each module body to rule text (inline, file or template)
//! 2. **Validate** the merged declarations of all modules
//! 3. **Compile** the modules with a [`PolicyEngine`]
//! 4. **Bind** the result shape used to decode evaluations
//!
//! The prepared query then turns input documents into decisions.

pub mod engine;
pub mod error;
pub mod query;
pub mod resolver;
pub mod validation;

pub use engine::{CompiledPolicy, PolicyEngine, RegoEngine};
pub use error::{CompileError, EvalError, Result, RuntimeError};
pub use query::{DecisionQuery, PreparedQuery};
pub use resolver::{resolve, CompilationUnit, ResolvedModule};
pub use validation::{validate, DeclarationIndex, RuleKind};

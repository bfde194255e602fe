//! Verdict Core - shared types for the Verdict decision layer
//!
//! This crate provides the data model used across the Verdict workspace:
//! - Rule module sources and module sets bound to a query path
//! - Input documents and raw engine results
//! - The typed `Decision` and the decoder that produces it
//! - Case-insensitive permission matching
//! - Error types

pub mod decision;
pub mod decode;
pub mod error;
pub mod input;
pub mod module;
pub mod permissions;

// Re-export commonly used types
pub use decision::{Decision, Diagnostic};
pub use decode::{Decoder, RawResult, ResultShape};
pub use error::{DecodeError, LoadError, ModuleSetError};
pub use input::InputDocument;
pub use module::{
    ModuleBody, ModuleLoader, ModuleSet, ModuleSetBuilder, QueryPath, RuleModuleSource,
    StaticModules,
};
pub use permissions::MissingPermissions;

//! Verdict SDK
//!
//! High-level API for building decision services from rule modules, rule
//! templates and policy definitions.
//!
//! ```rust,ignore
//! use verdict_sdk::{DecisionRequest, DecisionServiceBuilder, InputDocument, ResultShape};
//!
//! let service = DecisionServiceBuilder::new()
//!     .with_query("data.authorization.allow")
//!     .with_shape(ResultShape::Verdict)
//!     .add_file_module("authorization", "policies/modules/authorization.rego")
//!     .build()
//!     .await?;
//!
//! let response = service.decide(DecisionRequest::new(
//!     InputDocument::new().with("role", "admin"),
//! ))?;
//! assert!(response.decision.is_allowed());
//! ```

pub mod api;
pub mod builder;
pub mod config;
pub mod decision_service;
pub mod error;
pub mod template_data;

// Re-export main types
pub use api::{build_module_set, decide, prepare, render};
pub use builder::DecisionServiceBuilder;
pub use config::EngineOptions;
pub use decision_service::{DecisionRequest, DecisionResponse, DecisionService, Outcome};
pub use error::{Result, SdkError};
pub use template_data::PolicyTemplateData;

// Re-export commonly used types from dependencies
pub use verdict_core::{
    Decision, Diagnostic, InputDocument, MissingPermissions, ModuleSet, ResultShape,
    RuleModuleSource,
};
pub use verdict_repository::{PolicyDefinition, RepositoryConfig};
pub use verdict_runtime::PreparedQuery;

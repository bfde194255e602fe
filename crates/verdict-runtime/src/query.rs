//! Decision queries
//!
//! A [`DecisionQuery`] binds a module set to a result shape. Preparing it
//! resolves, validates and compiles the modules once; the resulting
//! [`PreparedQuery`] evaluates any number of input documents.

use crate::engine::{CompiledPolicy, PolicyEngine, RegoEngine};
use crate::error::{Result, RuntimeError};
use crate::resolver::resolve;
use crate::validation::{validate, DeclarationIndex};
use std::fmt;
use std::time::Instant;
use verdict_core::{
    Decision, Decoder, InputDocument, ModuleLoader, ModuleSet, QueryPath, RawResult, ResultShape,
};
use verdict_template::Renderer;

/// A module set plus how to read its result
#[derive(Debug, Clone)]
pub struct DecisionQuery {
    module_set: ModuleSet,
    shape: ResultShape,
    declared_permissions: Option<Vec<String>>,
    strict_validation: bool,
}

impl DecisionQuery {
    pub fn new(module_set: ModuleSet) -> Self {
        Self {
            module_set,
            shape: ResultShape::default(),
            declared_permissions: None,
            strict_validation: true,
        }
    }

    pub fn with_shape(mut self, shape: ResultShape) -> Self {
        self.shape = shape;
        self
    }

    /// Permissions the modules require, in the order callers expect them
    /// reported back
    pub fn with_declared_permissions(mut self, permissions: Vec<String>) -> Self {
        self.declared_permissions = Some(permissions);
        self
    }

    /// Run the local declaration check before compiling (on by default)
    pub fn with_strict_validation(mut self, enabled: bool) -> Self {
        self.strict_validation = enabled;
        self
    }

    pub fn module_set(&self) -> &ModuleSet {
        &self.module_set
    }

    pub fn shape(&self) -> ResultShape {
        self.shape
    }

    /// Prepare with the default Rego engine
    pub fn prepare(&self, loader: &dyn ModuleLoader, renderer: &Renderer) -> Result<PreparedQuery> {
        self.prepare_with_engine(&RegoEngine::new(), loader, renderer)
    }

    /// Resolve, validate and compile the module set
    ///
    /// Every load, template, declaration and engine failure surfaces here,
    /// never at evaluation time.
    pub fn prepare_with_engine(
        &self,
        engine: &dyn PolicyEngine,
        loader: &dyn ModuleLoader,
        renderer: &Renderer,
    ) -> Result<PreparedQuery> {
        let start = Instant::now();
        let query_path = self.module_set.query_path();

        let unit = resolve(&self.module_set, loader, renderer).map_err(|e| {
            tracing::warn!(query = %query_path, error = %e, "Failed to resolve modules");
            e
        })?;

        let declarations = if self.strict_validation {
            Some(validate(&unit).map_err(|e| {
                tracing::warn!(query = %query_path, error = %e, "Module set failed validation");
                RuntimeError::from(e)
            })?)
        } else {
            None
        };

        let policy = engine.compile(&unit).map_err(|e| {
            tracing::warn!(query = %query_path, engine = engine.name(), error = %e, "Engine rejected module set");
            RuntimeError::from(e)
        })?;

        tracing::info!(
            query = %query_path,
            modules = unit.modules().len(),
            engine = engine.name(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Prepared decision query"
        );

        Ok(PreparedQuery {
            query_path: query_path.clone(),
            module_names: self.module_set.names().map(str::to_string).collect(),
            decoder: Decoder::new(self.shape),
            declared_permissions: self.declared_permissions.clone(),
            declarations,
            policy,
        })
    }
}

/// A compiled decision query
pub struct PreparedQuery {
    query_path: QueryPath,
    module_names: Vec<String>,
    decoder: Decoder,
    declared_permissions: Option<Vec<String>>,
    declarations: Option<DeclarationIndex>,
    policy: Box<dyn CompiledPolicy>,
}

impl fmt::Debug for PreparedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedQuery")
            .field("query_path", &self.query_path)
            .field("module_names", &self.module_names)
            .field("shape", &self.decoder.shape())
            .finish_non_exhaustive()
    }
}

impl PreparedQuery {
    pub fn query_path(&self) -> &QueryPath {
        &self.query_path
    }

    pub fn module_names(&self) -> &[String] {
        &self.module_names
    }

    pub fn shape(&self) -> ResultShape {
        self.decoder.shape()
    }

    pub fn declared_permissions(&self) -> Option<&[String]> {
        self.declared_permissions.as_deref()
    }

    /// Declarations found by the validation pass, if it ran
    pub fn declarations(&self) -> Option<&DeclarationIndex> {
        self.declarations.as_ref()
    }

    /// Evaluate the query and return the undecoded result
    pub fn evaluate(&self, input: &InputDocument) -> Result<RawResult> {
        let value = self.policy.evaluate(input).map_err(|e| {
            tracing::warn!(query = %self.query_path, error = %e, "Evaluation failed");
            RuntimeError::from(e)
        })?;

        let value = value.ok_or_else(|| {
            tracing::warn!(query = %self.query_path, "Query produced no decision");
            RuntimeError::EmptyResult {
                query: self.query_path.to_string(),
            }
        })?;

        tracing::debug!(query = %self.query_path, result = %value, "Evaluated query");
        Ok(RawResult::from_value(value)?)
    }

    /// Evaluate and decode into a [`Decision`]
    pub fn decide(&self, input: &InputDocument) -> Result<Decision> {
        let raw = self.evaluate(input)?;
        let decision = self.decoder.decode(raw).map_err(|e| {
            tracing::warn!(query = %self.query_path, error = %e, "Result does not match its shape");
            RuntimeError::from(e)
        })?;

        Ok(decision.normalize_missing_permissions(self.declared_permissions.as_deref()))
    }
}

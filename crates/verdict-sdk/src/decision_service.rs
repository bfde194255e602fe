//! DecisionService - main API for evaluating decisions

use crate::config::EngineOptions;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use verdict_core::{Decision, InputDocument, QueryPath, ResultShape};
use verdict_runtime::PreparedQuery;

/// Decision request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionRequest {
    /// Facts the rules are evaluated against
    pub input: InputDocument,

    /// Request metadata, echoed back in the response
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl DecisionRequest {
    pub fn new(input: InputDocument) -> Self {
        Self {
            input,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Decision response
#[derive(Debug, Clone, Serialize)]
pub struct DecisionResponse {
    pub decision: Decision,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,

    /// Request metadata (echoed back)
    pub metadata: HashMap<String, String>,
}

/// Result of [`DecisionService::decide_or_deny`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The policy produced a decision, which may itself be a denial
    Decided { decision: Decision },

    /// No decision could be produced; access is denied
    Denied { reason: String },
}

impl Outcome {
    /// Only a decided, allowing decision grants access
    pub fn is_allowed(&self) -> bool {
        matches!(self, Outcome::Decided { decision } if decision.is_allowed())
    }

    pub fn decision(&self) -> Option<&Decision> {
        match self {
            Outcome::Decided { decision } => Some(decision),
            Outcome::Denied { .. } => None,
        }
    }
}

/// A prepared decision query ready to evaluate requests
///
/// Built by [`crate::DecisionServiceBuilder`]. Evaluation is synchronous and
/// never changes the service, so one service handles any number of requests.
#[derive(Debug)]
pub struct DecisionService {
    prepared: PreparedQuery,
    options: EngineOptions,
}

impl DecisionService {
    pub(crate) fn new(prepared: PreparedQuery, options: EngineOptions) -> Self {
        Self { prepared, options }
    }

    /// Evaluate one input document
    pub fn evaluate(&self, input: &InputDocument) -> Result<Decision> {
        Ok(self.prepared.decide(input)?)
    }

    /// Evaluate a request and time it
    pub fn decide(&self, request: DecisionRequest) -> Result<DecisionResponse> {
        let start = Instant::now();
        let decision = self.evaluate(&request.input)?;
        let processing_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            query = %self.prepared.query_path(),
            allowed = decision.is_allowed(),
            processing_time_ms,
            "Decision made"
        );

        Ok(DecisionResponse {
            decision,
            processing_time_ms,
            metadata: request.metadata,
        })
    }

    /// Evaluate and turn every failure into a denial
    ///
    /// A failure is never coerced into an allow.
    pub fn decide_or_deny(&self, input: &InputDocument) -> Outcome {
        match self.evaluate(input) {
            Ok(decision) => Outcome::Decided { decision },
            Err(e) => {
                tracing::warn!(
                    query = %self.prepared.query_path(),
                    error = %e,
                    "Denying request that produced no decision"
                );
                Outcome::Denied {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn query_path(&self) -> &QueryPath {
        self.prepared.query_path()
    }

    pub fn shape(&self) -> ResultShape {
        self.prepared.shape()
    }

    pub fn module_names(&self) -> &[String] {
        self.prepared.module_names()
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn prepared(&self) -> &PreparedQuery {
        &self.prepared
    }
}

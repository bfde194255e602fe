//! Rego engine adapter backed by `regorus`

use super::{CompiledPolicy, PolicyEngine};
use crate::error::{CompileError, EvalError};
use crate::resolver::CompilationUnit;
use serde_json::Value;
use verdict_core::InputDocument;

/// [`PolicyEngine`] that evaluates Rego with the `regorus` interpreter
#[derive(Debug, Clone, Copy, Default)]
pub struct RegoEngine;

impl RegoEngine {
    pub fn new() -> Self {
        Self
    }
}

impl PolicyEngine for RegoEngine {
    fn name(&self) -> &str {
        "regorus"
    }

    fn compile(&self, unit: &CompilationUnit) -> Result<Box<dyn CompiledPolicy>, CompileError> {
        let mut engine = regorus::Engine::new();

        for module in unit.modules() {
            engine
                .add_policy(format!("{}.rego", module.name), module.text.clone())
                .map_err(|e| CompileError::EngineRejected {
                    module: module.name.clone(),
                    message: e.to_string(),
                })?;
        }

        // regorus analyses the loaded modules on first evaluation. Running
        // the query once here stores the analysed engine, so every clone
        // starts prepared and analysis errors surface now.
        let query = unit.query_path().to_string();
        engine.set_input(regorus::Value::new_object());
        engine
            .eval_rule(query.clone())
            .map_err(|e| rejection(unit, e.to_string()))?;

        Ok(Box::new(CompiledRego { engine, query }))
    }
}

/// Attribute an engine error to the module its message names
fn rejection(unit: &CompilationUnit, message: String) -> CompileError {
    let module = unit
        .modules()
        .iter()
        .find(|m| message.contains(&format!("{}.rego", m.name)))
        .or_else(|| unit.modules().first())
        .map(|m| m.name.clone())
        .unwrap_or_default();

    CompileError::EngineRejected { module, message }
}

/// Loaded engine plus the rule to evaluate
struct CompiledRego {
    engine: regorus::Engine,
    query: String,
}

impl CompiledPolicy for CompiledRego {
    fn evaluate(&self, input: &InputDocument) -> Result<Option<Value>, EvalError> {
        // Each evaluation runs on its own copy of the loaded engine
        let mut engine = self.engine.clone();

        let input = regorus::Value::from_json_str(&input.to_json())
            .map_err(|e| EvalError::Input(e.to_string()))?;
        engine.set_input(input);

        let result = engine
            .eval_rule(self.query.clone())
            .map_err(|e| EvalError::Engine {
                query: self.query.clone(),
                message: e.to_string(),
            })?;

        if matches!(result, regorus::Value::Undefined) {
            return Ok(None);
        }

        let json = result
            .to_json_str()
            .map_err(|e| EvalError::Output(e.to_string()))?;
        let value = serde_json::from_str(&json).map_err(|e| EvalError::Output(e.to_string()))?;
        Ok(Some(value))
    }
}

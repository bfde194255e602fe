//! Typed decisions produced by the decoder

use crate::decode::ResultShape;
use crate::permissions::MissingPermissions;
use serde::{Deserialize, Serialize};

/// Explanation of one failed sub-check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Name of the checked field (e.g. `source_uuid`)
    pub field: String,

    /// Value the policy expected
    pub expected: String,

    /// Value found in the input
    pub actual: String,

    /// Human remediation hint
    pub hint: String,
}

/// Outcome of one evaluation
///
/// Decisions are only built by [`crate::Decoder`]; a passing decision never
/// carries failure detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    allowed: bool,
    shape: ResultShape,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    permissions_granted: Option<bool>,
    #[serde(skip_serializing_if = "MissingPermissions::is_empty")]
    missing_permissions: MissingPermissions,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<Diagnostic>,
}

impl Decision {
    pub(crate) fn verdict(allowed: bool, shape: ResultShape) -> Self {
        Self {
            allowed,
            shape,
            resource_valid: None,
            permissions_granted: None,
            missing_permissions: MissingPermissions::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Passing decision keeping the sub-verdicts the policy reported
    pub(crate) fn passed(
        shape: ResultShape,
        resource_valid: Option<bool>,
        permissions_granted: Option<bool>,
    ) -> Self {
        Self {
            resource_valid,
            permissions_granted,
            ..Self::verdict(true, shape)
        }
    }

    pub(crate) fn denied(
        shape: ResultShape,
        resource_valid: Option<bool>,
        permissions_granted: Option<bool>,
        missing_permissions: MissingPermissions,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            allowed: false,
            shape,
            resource_valid,
            permissions_granted,
            missing_permissions,
            diagnostics,
        }
    }

    /// Overall verdict
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Result shape the decision was decoded from
    pub fn shape(&self) -> ResultShape {
        self.shape
    }

    /// Resource validity sub-verdict, when the policy reported one
    pub fn resource_valid(&self) -> Option<bool> {
        self.resource_valid
    }

    /// Permission grant sub-verdict, when the policy reported one
    pub fn permissions_granted(&self) -> Option<bool> {
        self.permissions_granted
    }

    pub fn missing_permissions(&self) -> &MissingPermissions {
        &self.missing_permissions
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Find the diagnostic for a field
    pub fn diagnostic(&self, field: &str) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.field == field)
    }

    /// Reorder the missing-permission list against the declared permissions
    pub fn normalize_missing_permissions(mut self, declared: Option<&[String]>) -> Self {
        let reported = std::mem::take(&mut self.missing_permissions).into_vec();
        self.missing_permissions = MissingPermissions::normalize(reported, declared);
        self
    }
}

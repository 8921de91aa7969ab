//! Per-request evaluation context

use pactum_api_types::{ApiId, ResourceKind};
use serde::{Deserialize, Serialize};

/// Context for a single permission evaluation.
///
/// Built once per request and immutable afterwards; the evaluator keeps no
/// state across calls, so everything the scope resolution needs travels in
/// here. Pre-resolved relationship hints let callers that already joined the
/// data (a request handler that loaded the booking anyway) skip redundant
/// lookups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Target resource identifier, when the permission concerns one
    pub target: Option<ApiId>,

    /// Kind of the target resource
    pub resource_kind: Option<ResourceKind>,

    /// Pre-resolved provider association of the target resource
    pub provider_id: Option<ApiId>,

    /// Pre-resolved owning organization of the target resource
    pub organization_id: Option<ApiId>,

    /// Request path recorded in the audit trail
    pub request_path: Option<String>,
}

impl EvaluationContext {
    /// An empty context, for permissions that need no resource
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a context
    pub fn builder() -> EvaluationContextBuilder {
        EvaluationContextBuilder::default()
    }

    /// Context targeting a single resource
    pub fn for_target(kind: ResourceKind, target: impl Into<ApiId>) -> Self {
        Self {
            target: Some(target.into()),
            resource_kind: Some(kind),
            ..Self::default()
        }
    }

    /// Path recorded in audit records, `"unknown"` when the caller gave none
    pub fn audit_path(&self) -> &str {
        self.request_path.as_deref().unwrap_or("unknown")
    }
}

/// Helper to assemble an [`EvaluationContext`]
#[derive(Debug, Default)]
pub struct EvaluationContextBuilder {
    context: EvaluationContext,
}

impl EvaluationContextBuilder {
    /// Set the target resource
    pub fn target(mut self, kind: ResourceKind, id: impl Into<ApiId>) -> Self {
        self.context.target = Some(id.into());
        self.context.resource_kind = Some(kind);
        self
    }

    /// Supply a pre-resolved provider association
    pub fn provider_id(mut self, id: impl Into<ApiId>) -> Self {
        self.context.provider_id = Some(id.into());
        self
    }

    /// Supply a pre-resolved owning organization
    pub fn organization_id(mut self, id: impl Into<ApiId>) -> Self {
        self.context.organization_id = Some(id.into());
        self
    }

    /// Set the request path for auditing
    pub fn request_path(mut self, path: impl Into<String>) -> Self {
        self.context.request_path = Some(path.into());
        self
    }

    /// Build the final context
    pub fn build(self) -> EvaluationContext {
        self.context
    }
}

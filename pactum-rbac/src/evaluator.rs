//! Scoped permission evaluation
//!
//! The evaluator is the single decision point for "may this user do this to
//! that resource". It is stateless across calls and infallible at the
//! boundary: every malformed input, failed lookup or unresolved relationship
//! becomes an explicit deny, and every call leaves exactly one audit record.

use pactum_api_types::{ApiId, ResourceKind, SubjectProfile};
use pactum_interfaces::{RelationshipStore, SubjectStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::audit::{AuditLogger, AuditRecord};
use crate::auth::ProfileCache;
use crate::config::RbacConfig;
use crate::context::EvaluationContext;
use crate::error::RbacResult;
use crate::models::{
    EvaluationResult, Permission, PermissionParseError, ResolvedRelationships, Scope,
};

/// Permission evaluator for authorization decisions
pub struct PermissionEvaluator {
    subjects: Arc<dyn SubjectStore>,
    relationships: Arc<dyn RelationshipStore>,
    audit: AuditLogger,
    cache: Option<ProfileCache>,
    config: RbacConfig,
}

impl PermissionEvaluator {
    /// Create a new evaluator over the given stores and audit logger
    pub fn new(
        subjects: Arc<dyn SubjectStore>,
        relationships: Arc<dyn RelationshipStore>,
        audit: AuditLogger,
        config: RbacConfig,
    ) -> RbacResult<Self> {
        config.validate()?;

        let cache = if config.enable_cache {
            Some(ProfileCache::new(Duration::from_secs(config.cache_ttl_seconds)))
        } else {
            None
        };

        Ok(Self {
            subjects,
            relationships,
            audit,
            cache,
            config,
        })
    }

    /// Evaluate a permission for a requester.
    ///
    /// Never returns an error and never panics past this boundary; callers
    /// always receive a decision, and the corresponding audit record has
    /// been handed to the audit pipeline before this function returns.
    pub async fn evaluate_permission(
        &self,
        user_id: Option<&ApiId>,
        permission: &str,
        context: &EvaluationContext,
    ) -> EvaluationResult {
        let result = match Permission::parse(permission) {
            Ok(parsed) => {
                let profile = match user_id {
                    Some(uid) => self.load_profile(uid).await,
                    None => None,
                };

                let is_admin = profile
                    .as_ref()
                    .map(|p| p.active && p.roles.iter().any(|r| self.config.is_admin_role(r)))
                    .unwrap_or(false);

                let resolved = self.resolve_relationships(&parsed, context).await;

                decide(
                    user_id,
                    profile.as_ref(),
                    is_admin,
                    &parsed,
                    &resolved,
                    permission,
                )
            }
            Err(PermissionParseError::UnsupportedScope(scope)) => EvaluationResult::deny(
                format!("unsupported scope '{}'", scope),
                permission,
            ),
            Err(_) => EvaluationResult::deny("invalid permission format", permission),
        };

        debug!(
            user_id = user_id.map(|u| u.as_str()).unwrap_or("anonymous"),
            permission = permission,
            allowed = result.allowed,
            reason = %result.reason,
            "permission evaluated"
        );

        self.audit.record(AuditRecord::new(
            user_id.cloned(),
            permission,
            result.decision(),
            result.reason.clone(),
            context.audit_path(),
        ));

        result
    }

    /// Drop a cached subject profile, e.g. after a role change
    pub async fn invalidate_subject(&self, user_id: &ApiId) {
        if let Some(cache) = &self.cache {
            cache.invalidate(user_id).await;
        }
    }

    /// Access the audit logger, e.g. to query the decision trail
    pub fn audit_logger(&self) -> &AuditLogger {
        &self.audit
    }

    /// The active configuration
    pub fn config(&self) -> &RbacConfig {
        &self.config
    }

    /// Resolve the requester's profile, preferring the cache.
    ///
    /// Lookup failures degrade to "no profile": the requester is then
    /// treated like a subject without roles or relationships, which denies
    /// every non-public scope.
    async fn load_profile(&self, user_id: &ApiId) -> Option<SubjectProfile> {
        if let Some(cache) = &self.cache {
            if let Some(profile) = cache.get(user_id).await {
                return Some(profile);
            }
        }

        match self.subjects.subject_profile(user_id).await {
            Ok(Some(profile)) => {
                if let Some(cache) = &self.cache {
                    cache.put(profile.clone()).await;
                }
                Some(profile)
            }
            Ok(None) => {
                debug!(user_id = %user_id, "no subject profile found");
                None
            }
            Err(e) => {
                warn!(user_id = %user_id, "subject lookup failed: {}", e);
                None
            }
        }
    }

    /// Resolve the relationship facts the declared scope needs.
    ///
    /// Context hints win over store lookups; lookup failures leave the fact
    /// unresolved, which the decision table treats as a deny.
    async fn resolve_relationships(
        &self,
        permission: &Permission,
        context: &EvaluationContext,
    ) -> ResolvedRelationships {
        let mut resolved = ResolvedRelationships::default();

        // The resource segment of the permission doubles as the resource
        // kind when the caller did not tag the context explicitly.
        let kind = context
            .resource_kind
            .or_else(|| ResourceKind::parse(&permission.resource));

        match permission.scope {
            Scope::Own => {
                if let (Some(kind), Some(target)) = (kind, context.target.as_ref()) {
                    match self.relationships.resource_owner(kind, target).await {
                        Ok(owner) => resolved.owner = owner,
                        Err(e) => warn!(target = %target, "owner lookup failed: {}", e),
                    }
                }
            }
            Scope::Provider => {
                if let Some(provider_id) = context.provider_id.as_ref() {
                    resolved.resource_provider = Some(provider_id.clone());
                } else if let (Some(kind), Some(target)) = (kind, context.target.as_ref()) {
                    match self.relationships.resource_provider(kind, target).await {
                        Ok(provider) => resolved.resource_provider = provider,
                        Err(e) => warn!(target = %target, "provider lookup failed: {}", e),
                    }
                }
            }
            Scope::Organization => {
                if let Some(organization_id) = context.organization_id.as_ref() {
                    resolved.resource_organization = Some(organization_id.clone());
                } else if let (Some(kind), Some(target)) = (kind, context.target.as_ref()) {
                    match self.relationships.resource_organization(kind, target).await {
                        Ok(organization) => resolved.resource_organization = organization,
                        Err(e) => warn!(target = %target, "organization lookup failed: {}", e),
                    }
                }
            }
            Scope::Booking => {
                if let Some(target) = context.target.as_ref() {
                    match self.relationships.booking_parties(target).await {
                        Ok(parties) => resolved.booking = parties,
                        Err(e) => warn!(target = %target, "booking lookup failed: {}", e),
                    }
                }
            }
            Scope::Public | Scope::All => {}
        }

        resolved
    }
}

/// The pure decision table.
///
/// First match wins. Takes only resolved facts, no stores, so every branch
/// is testable without async machinery.
fn decide(
    user_id: Option<&ApiId>,
    profile: Option<&SubjectProfile>,
    is_admin: bool,
    permission: &Permission,
    resolved: &ResolvedRelationships,
    required: &str,
) -> EvaluationResult {
    if is_admin {
        return EvaluationResult::allow("admin has full access", required);
    }

    if permission.scope == Scope::Public {
        return EvaluationResult::allow("public resource accessible to all", required);
    }

    let user_id = match user_id {
        Some(uid) => uid,
        None => return EvaluationResult::deny("authentication required", required),
    };

    match permission.scope {
        Scope::Public => EvaluationResult::allow("public resource accessible to all", required),

        Scope::Own => match resolved.owner.as_ref() {
            None => EvaluationResult::deny(
                "missing context: resource owner could not be resolved",
                required,
            ),
            Some(owner) if owner == user_id => {
                EvaluationResult::allow("User owns the resource", required)
            }
            Some(_) => EvaluationResult::deny("User does not own the resource", required),
        },

        Scope::Provider => {
            let requester_provider = match profile.and_then(|p| p.effective_provider_id()) {
                Some(provider) => provider,
                None => {
                    return EvaluationResult::deny(
                        "missing context: requester has no provider identity",
                        required,
                    )
                }
            };
            match resolved.resource_provider.as_ref() {
                None => EvaluationResult::deny(
                    "missing context: resource provider could not be resolved",
                    required,
                ),
                Some(provider) if provider == requester_provider => {
                    EvaluationResult::allow("Provider is associated with the resource", required)
                }
                Some(_) => EvaluationResult::deny(
                    "Provider is not associated with the resource",
                    required,
                ),
            }
        }

        Scope::Organization => {
            let requester_organization = match profile.and_then(|p| p.effective_organization_id()) {
                Some(organization) => organization,
                None => {
                    return EvaluationResult::deny(
                        "missing context: requester has no organization membership",
                        required,
                    )
                }
            };
            match resolved.resource_organization.as_ref() {
                None => EvaluationResult::deny(
                    "missing context: resource organization could not be resolved",
                    required,
                ),
                Some(organization) if organization == requester_organization => {
                    EvaluationResult::allow("User belongs to the owning organization", required)
                }
                Some(_) => {
                    EvaluationResult::deny("User does not belong to the organization", required)
                }
            }
        }

        Scope::Booking => match resolved.booking.as_ref() {
            None => EvaluationResult::deny(
                "missing context: booking could not be resolved",
                required,
            ),
            Some(parties) => {
                if parties.is_client(user_id) {
                    EvaluationResult::allow("User is the booking client", required)
                } else if profile
                    .and_then(|p| p.effective_provider_id())
                    .map(|provider| parties.is_provider(provider))
                    .unwrap_or(false)
                {
                    EvaluationResult::allow("Provider is assigned to the booking", required)
                } else {
                    EvaluationResult::deny("No relationship to the booking", required)
                }
            }
        },

        // Only the admin branch above may satisfy `all`, regardless of
        // rule ordering.
        Scope::All => EvaluationResult::deny("User does not have all access", required),
    }
}

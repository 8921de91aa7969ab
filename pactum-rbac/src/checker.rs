//! Permission checking utilities

use pactum_api_types::{ApiId, ResourceKind};
use std::sync::Arc;

use crate::context::EvaluationContext;
use crate::error::{RbacError, RbacResult};
use crate::evaluator::PermissionEvaluator;
use crate::models::EvaluationResult;

/// Permission checker for validating user actions
///
/// A thin facade over [`PermissionEvaluator`] exposing the platform's
/// recurring checks, so call sites read as intent rather than permission
/// string assembly.
#[derive(Clone)]
pub struct PermissionChecker {
    evaluator: Arc<PermissionEvaluator>,
}

impl PermissionChecker {
    /// Create a new permission checker
    pub fn new(evaluator: Arc<PermissionEvaluator>) -> Self {
        Self { evaluator }
    }

    /// Evaluate a permission, returning the full result
    pub async fn check(
        &self,
        user_id: Option<&ApiId>,
        permission: &str,
        context: &EvaluationContext,
    ) -> EvaluationResult {
        self.evaluator
            .evaluate_permission(user_id, permission, context)
            .await
    }

    /// Evaluate a permission, converting a deny into an error
    pub async fn require(
        &self,
        user_id: Option<&ApiId>,
        permission: &str,
        context: &EvaluationContext,
    ) -> RbacResult<()> {
        let result = self.check(user_id, permission, context).await;
        if result.allowed {
            Ok(())
        } else {
            Err(RbacError::permission_denied(
                user_id.map(|u| u.as_str()).unwrap_or("anonymous"),
                result.required_permission,
                result.reason,
            ))
        }
    }

    /// Check profile-related permissions
    pub async fn can_view_profile(&self, user_id: &ApiId, target_user: &ApiId) -> bool {
        let context = EvaluationContext::for_target(ResourceKind::User, target_user.clone());
        self.check(Some(user_id), "user:view:own", &context).await.allowed
    }

    pub async fn can_edit_profile(&self, user_id: &ApiId, target_user: &ApiId) -> bool {
        let context = EvaluationContext::for_target(ResourceKind::User, target_user.clone());
        self.check(Some(user_id), "user:edit:own", &context).await.allowed
    }

    /// Check booking-related permissions
    pub async fn can_view_booking(&self, user_id: &ApiId, booking_id: &ApiId) -> bool {
        let context = EvaluationContext::for_target(ResourceKind::Booking, booking_id.clone());
        self.check(Some(user_id), "booking:view:booking", &context).await.allowed
    }

    pub async fn can_view_booking_as_provider(&self, user_id: &ApiId, booking_id: &ApiId) -> bool {
        let context = EvaluationContext::for_target(ResourceKind::Booking, booking_id.clone());
        self.check(Some(user_id), "booking:view:provider", &context).await.allowed
    }

    pub async fn can_update_booking(&self, user_id: &ApiId, booking_id: &ApiId) -> bool {
        let context = EvaluationContext::for_target(ResourceKind::Booking, booking_id.clone());
        self.check(Some(user_id), "booking:update:provider", &context).await.allowed
    }

    /// Check contract-related permissions
    pub async fn can_view_contract(&self, user_id: &ApiId, contract_id: &ApiId) -> bool {
        let context = EvaluationContext::for_target(ResourceKind::Contract, contract_id.clone());
        self.check(Some(user_id), "contract:view:own", &context).await.allowed
    }

    pub async fn can_sign_contract_as_provider(&self, user_id: &ApiId, contract_id: &ApiId) -> bool {
        let context = EvaluationContext::for_target(ResourceKind::Contract, contract_id.clone());
        self.check(Some(user_id), "contract:sign:provider", &context).await.allowed
    }

    pub async fn can_approve_contract(&self, user_id: &ApiId, contract_id: &ApiId) -> bool {
        let context = EvaluationContext::for_target(ResourceKind::Contract, contract_id.clone());
        self.check(Some(user_id), "contract:approve:organization", &context)
            .await
            .allowed
    }

    /// Check service management permissions
    pub async fn can_manage_service(&self, user_id: &ApiId, service_id: &ApiId) -> bool {
        let context = EvaluationContext::for_target(ResourceKind::Service, service_id.clone());
        self.check(Some(user_id), "service:manage:provider", &context).await.allowed
    }

    /// Check escrow payment permissions
    pub async fn can_view_payment(&self, user_id: &ApiId, booking_id: &ApiId) -> bool {
        let context = EvaluationContext::for_target(ResourceKind::Booking, booking_id.clone());
        self.check(Some(user_id), "payment:view:booking", &context).await.allowed
    }

    pub async fn can_release_escrow(&self, user_id: &ApiId, booking_id: &ApiId) -> bool {
        let context = EvaluationContext::for_target(ResourceKind::Booking, booking_id.clone());
        self.check(Some(user_id), "payment:release:booking", &context).await.allowed
    }

    /// Marketplace discovery is public, anonymous requesters included
    pub async fn can_search_marketplace(&self, user_id: Option<&ApiId>) -> bool {
        self.check(user_id, "discovery:search:public", &EvaluationContext::empty())
            .await
            .allowed
    }

    /// Platform-wide notification broadcasting, admins only
    pub async fn can_broadcast_notifications(&self, user_id: &ApiId) -> bool {
        self.check(Some(user_id), "notification:broadcast:all", &EvaluationContext::empty())
            .await
            .allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditLogger, InMemoryAuditStorage};
    use crate::auth::ProfileBuilder;
    use crate::config::RbacConfig;
    use crate::memory::InMemoryDirectory;
    use pactum_api_types::BookingParties;

    async fn seeded_checker() -> PermissionChecker {
        let directory = InMemoryDirectory::new();

        directory
            .add_subject(ProfileBuilder::for_user("client-basic-1").with_role("client").build())
            .await;
        directory
            .add_subject(
                ProfileBuilder::for_user("provider-individual-1")
                    .with_role("provider")
                    .with_provider("provider-ind-1")
                    .build(),
            )
            .await;
        directory
            .add_subject(
                ProfileBuilder::for_user("admin-system-1")
                    .with_role("platform_admin")
                    .build(),
            )
            .await;

        directory
            .add_owner(ResourceKind::User, "client-basic-1", "client-basic-1")
            .await;
        directory
            .add_booking(BookingParties::new(
                ApiId::from("booking-1"),
                ApiId::from("client-basic-1"),
                Some(ApiId::from("provider-ind-1")),
            ))
            .await;
        directory
            .add_provider_link(ResourceKind::Booking, "booking-1", "provider-ind-1")
            .await;

        let audit = AuditLogger::new(Arc::new(InMemoryAuditStorage::new()), Default::default());
        let evaluator = PermissionEvaluator::new(
            Arc::new(directory.clone()),
            Arc::new(directory),
            audit,
            RbacConfig::default(),
        )
        .unwrap();

        PermissionChecker::new(Arc::new(evaluator))
    }

    #[tokio::test]
    async fn test_profile_checks() {
        let checker = seeded_checker().await;
        let client = ApiId::from("client-basic-1");

        assert!(checker.can_view_profile(&client, &client).await);
        assert!(!checker.can_view_profile(&ApiId::from("provider-individual-1"), &client).await);
    }

    #[tokio::test]
    async fn test_booking_checks() {
        let checker = seeded_checker().await;

        assert!(
            checker
                .can_view_booking(&ApiId::from("client-basic-1"), &ApiId::from("booking-1"))
                .await
        );
        assert!(
            checker
                .can_view_booking_as_provider(
                    &ApiId::from("provider-individual-1"),
                    &ApiId::from("booking-1")
                )
                .await
        );
        assert!(
            !checker
                .can_view_booking_as_provider(
                    &ApiId::from("client-basic-1"),
                    &ApiId::from("booking-1")
                )
                .await
        );
    }

    #[tokio::test]
    async fn test_marketplace_is_public() {
        let checker = seeded_checker().await;
        assert!(checker.can_search_marketplace(None).await);
        assert!(checker.can_search_marketplace(Some(&ApiId::from("client-basic-1"))).await);
    }

    #[tokio::test]
    async fn test_broadcast_requires_admin() {
        let checker = seeded_checker().await;
        assert!(checker.can_broadcast_notifications(&ApiId::from("admin-system-1")).await);
        assert!(!checker.can_broadcast_notifications(&ApiId::from("client-basic-1")).await);
    }

    #[tokio::test]
    async fn test_require_converts_deny_to_error() {
        let checker = seeded_checker().await;
        let context = EvaluationContext::for_target(ResourceKind::User, "client-basic-1");

        assert!(checker
            .require(Some(&ApiId::from("client-basic-1")), "user:view:own", &context)
            .await
            .is_ok());

        let err = checker
            .require(Some(&ApiId::from("provider-individual-1")), "user:view:own", &context)
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());
    }
}

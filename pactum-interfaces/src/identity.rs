//! Identity and relationship lookup interfaces
//!
//! These traits define the read-only contracts the permission evaluator
//! queries when it needs to resolve who owns a resource, which provider or
//! organization it belongs to, or who the parties of a booking are. The
//! evaluator never writes through these interfaces.

use async_trait::async_trait;
use pactum_api_types::{ApiId, BookingParties, ResourceKind, SubjectProfile};

/// Common lookup error type
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Internal lookup error: {message}")]
    Internal { message: String },
}

impl LookupError {
    /// Create a not-found error for an entity
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Base directory trait with health check capability
#[async_trait]
pub trait Directory: Send + Sync {
    /// Check if the directory is healthy and can serve lookups
    async fn health_check(&self) -> Result<(), LookupError>;
}

/// Resolves user identities to subject profiles
#[async_trait]
pub trait SubjectStore: Directory {
    /// Fetch the profile for a user, or `None` when the user is unknown
    async fn subject_profile(&self, user_id: &ApiId) -> Result<Option<SubjectProfile>, LookupError>;
}

/// Resolves resource ownership and association relationships
///
/// Every method returns `Ok(None)` when the relationship genuinely does not
/// exist; transport and backend failures surface as `Err` and are treated by
/// callers as unresolved context.
#[async_trait]
pub trait RelationshipStore: Directory {
    /// Resolve the direct owner of a resource
    async fn resource_owner(
        &self,
        kind: ResourceKind,
        resource_id: &ApiId,
    ) -> Result<Option<ApiId>, LookupError>;

    /// Resolve the provider associated with a resource
    async fn resource_provider(
        &self,
        kind: ResourceKind,
        resource_id: &ApiId,
    ) -> Result<Option<ApiId>, LookupError>;

    /// Resolve the organization owning a resource
    async fn resource_organization(
        &self,
        kind: ResourceKind,
        resource_id: &ApiId,
    ) -> Result<Option<ApiId>, LookupError>;

    /// Resolve both parties of a booking
    async fn booking_parties(
        &self,
        booking_id: &ApiId,
    ) -> Result<Option<BookingParties>, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_predicates() {
        let err = LookupError::not_found("booking", "booking-404");
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Entity not found: booking with id booking-404"
        );

        let err = LookupError::connection("pool exhausted");
        assert!(!err.is_not_found());
    }
}

//! Unified domain payloads exchanged between the stores and the evaluator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ApiId;

/// Resolved identity of a requesting subject.
///
/// This is the payload the subject store returns for a user id: the role
/// names granted to the user plus the relationship ids (provider,
/// organization) that scoped permission checks compare against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectProfile {
    /// User ID
    pub user_id: ApiId,

    /// Role names assigned to the subject
    pub roles: Vec<String>,

    /// Provider identity the subject acts for, if any
    pub provider_id: Option<ApiId>,

    /// Organization the subject belongs to, if any
    pub organization_id: Option<ApiId>,

    /// Whether the account is active; suspended subjects keep their
    /// identity but lose relationship-based access
    pub active: bool,

    /// When the profile was last refreshed from the identity store
    pub refreshed_at: DateTime<Utc>,
}

impl SubjectProfile {
    /// Create a minimal active profile with no roles or relationships
    pub fn new(user_id: ApiId) -> Self {
        Self {
            user_id,
            roles: Vec::new(),
            provider_id: None,
            organization_id: None,
            active: true,
            refreshed_at: Utc::now(),
        }
    }

    /// Add a role name, ignoring duplicates
    pub fn add_role(&mut self, role: impl Into<String>) {
        let role = role.into();
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
    }

    /// Check if the subject holds the given role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Provider identity, suppressed for inactive accounts
    pub fn effective_provider_id(&self) -> Option<&ApiId> {
        if self.active {
            self.provider_id.as_ref()
        } else {
            None
        }
    }

    /// Organization membership, suppressed for inactive accounts
    pub fn effective_organization_id(&self) -> Option<&ApiId> {
        if self.active {
            self.organization_id.as_ref()
        } else {
            None
        }
    }
}

/// The two parties of a booking.
///
/// The provider side is optional: a booking whose provider account was
/// removed keeps its client relationship but has no provider to match
/// against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingParties {
    pub booking_id: ApiId,
    pub client_id: ApiId,
    pub provider_id: Option<ApiId>,
}

impl BookingParties {
    pub fn new(booking_id: ApiId, client_id: ApiId, provider_id: Option<ApiId>) -> Self {
        Self {
            booking_id,
            client_id,
            provider_id,
        }
    }

    /// Check whether the given user is the booking's client owner
    pub fn is_client(&self, user_id: &ApiId) -> bool {
        &self.client_id == user_id
    }

    /// Check whether the given provider identity is assigned to the booking
    pub fn is_provider(&self, provider_id: &ApiId) -> bool {
        self.provider_id.as_ref() == Some(provider_id)
    }
}

//! Error types for RBAC operations

use thiserror::Error;

/// Result type for RBAC operations
pub type RbacResult<T> = Result<T, RbacError>;

/// RBAC-specific errors
#[derive(Error, Debug)]
pub enum RbacError {
    /// Identity or relationship lookup failed
    #[error("Lookup error: {0}")]
    Lookup(#[from] pactum_interfaces::LookupError),

    /// Permission string could not be parsed
    #[error("Invalid permission '{permission}': {message}")]
    InvalidPermission { permission: String, message: String },

    /// Permission denied
    #[error("Permission denied: {required_permission} for user {user_id}: {reason}")]
    PermissionDenied {
        user_id: String,
        required_permission: String,
        reason: String,
    },

    /// Subject not found
    #[error("Subject not found: {user_id}")]
    SubjectNotFound { user_id: String },

    /// Role not found in the catalog
    #[error("Role not found: {role_name}")]
    RoleNotFound { role_name: String },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Audit pipeline failure
    #[error("Audit error: {message}")]
    Audit { message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RbacError {
    /// Create a new invalid permission error
    pub fn invalid_permission(permission: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPermission {
            permission: permission.into(),
            message: message.into(),
        }
    }

    /// Create a new permission denied error
    pub fn permission_denied(
        user_id: impl Into<String>,
        required_permission: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::PermissionDenied {
            user_id: user_id.into(),
            required_permission: required_permission.into(),
            reason: reason.into(),
        }
    }

    /// Create a new invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new audit error
    pub fn audit(message: impl Into<String>) -> Self {
        Self::Audit {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this is a permission denied error
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SubjectNotFound { .. } | Self::RoleNotFound { .. }
        ) || matches!(self, Self::Lookup(e) if e.is_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_predicates() {
        let err = RbacError::permission_denied("client-basic-1", "booking:edit:own", "User does not own the resource");
        assert!(err.is_permission_denied());
        assert!(!err.is_not_found());

        let err = RbacError::SubjectNotFound {
            user_id: "ghost-1".to_string(),
        };
        assert!(err.is_not_found());

        let err = RbacError::Lookup(pactum_interfaces::LookupError::not_found("booking", "booking-404"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_permission_display() {
        let err = RbacError::invalid_permission("booking:view", "expected resource:action:scope");
        assert_eq!(
            err.to_string(),
            "Invalid permission 'booking:view': expected resource:action:scope"
        );
    }
}

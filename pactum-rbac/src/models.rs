//! Data models for the scoped permission system

use once_cell::sync::Lazy;
use pactum_api_types::{ApiId, BookingParties};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Resource and action segments are lowercase identifiers
static SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("segment regex is valid"));

/// Errors produced while parsing a permission string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionParseError {
    /// Not a three-segment `resource:action:scope` string
    #[error("expected resource:action:scope, got '{0}'")]
    WrongShape(String),

    /// Resource or action segment is not a valid identifier
    #[error("invalid segment '{0}'")]
    BadSegment(String),

    /// Scope segment is not one of the supported scopes
    #[error("unsupported scope '{0}'")]
    UnsupportedScope(String),
}

/// The relationship a permission grant is conditioned on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Requester must be the resource's direct owner
    Own,
    /// Requester's provider identity must match the resource's provider
    Provider,
    /// Requester's organization must match the resource's organization
    Organization,
    /// Requester is the booking's client or its assigned provider
    Booking,
    /// Always allowed, anonymous requesters included
    Public,
    /// Administrative access only
    All,
}

impl Scope {
    /// Convert to the scope segment used in permission strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Own => "own",
            Scope::Provider => "provider",
            Scope::Organization => "organization",
            Scope::Booking => "booking",
            Scope::Public => "public",
            Scope::All => "all",
        }
    }

    /// Parse a scope segment
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "own" => Some(Scope::Own),
            "provider" => Some(Scope::Provider),
            "organization" => Some(Scope::Organization),
            "booking" => Some(Scope::Booking),
            "public" => Some(Scope::Public),
            "all" => Some(Scope::All),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed `resource:action:scope` permission
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub resource: String,
    pub action: String,
    pub scope: Scope,
}

impl Permission {
    /// Create a new permission
    pub fn new(resource: impl Into<String>, action: impl Into<String>, scope: Scope) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            scope,
        }
    }

    /// Parse a `resource:action:scope` string.
    ///
    /// Fails closed: any shape, segment or scope problem is an error the
    /// evaluator converts into a deny, never a fallback grant.
    pub fn parse(s: &str) -> Result<Self, PermissionParseError> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(PermissionParseError::WrongShape(s.to_string()));
        }

        for segment in &parts[..2] {
            if !SEGMENT_RE.is_match(segment) {
                return Err(PermissionParseError::BadSegment(segment.to_string()));
            }
        }

        let scope = Scope::parse(parts[2])
            .ok_or_else(|| PermissionParseError::UnsupportedScope(parts[2].to_string()))?;

        Ok(Self {
            resource: parts[0].to_string(),
            action: parts[1].to_string(),
            scope,
        })
    }

    /// Check if permission covers the given resource/action pair
    pub fn matches(&self, resource: &str, action: &str) -> bool {
        self.resource == resource && self.action == action
    }
}

impl std::str::FromStr for Permission {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.resource, self.action, self.scope)
    }
}

/// Final outcome of an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::Deny => "DENY",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A complete evaluation result.
///
/// `reason` always names the rule that fired; callers and the audit trail
/// both rely on it being specific, so there is no generic "ok" variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Whether access is allowed
    pub allowed: bool,

    /// Reason naming the rule that fired
    pub reason: String,

    /// The permission string that was required
    pub required_permission: String,
}

impl EvaluationResult {
    /// Creates a new allow result
    pub fn allow(reason: impl Into<String>, required_permission: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
            required_permission: required_permission.into(),
        }
    }

    /// Creates a new deny result
    pub fn deny(reason: impl Into<String>, required_permission: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            required_permission: required_permission.into(),
        }
    }

    /// The decision this result represents
    pub fn decision(&self) -> Decision {
        if self.allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Relationship facts resolved for one evaluation.
///
/// Only the facts the declared scope needs are populated; `None` means the
/// relationship could not be resolved, which every rule treats as a deny.
#[derive(Debug, Clone, Default)]
pub struct ResolvedRelationships {
    /// Direct owner of the target resource
    pub owner: Option<ApiId>,

    /// Provider associated with the target resource
    pub resource_provider: Option<ApiId>,

    /// Organization owning the target resource
    pub resource_organization: Option<ApiId>,

    /// Parties of the target booking
    pub booking: Option<BookingParties>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_parsing() {
        let perm = Permission::parse("booking:view:provider").unwrap();
        assert_eq!(perm.resource, "booking");
        assert_eq!(perm.action, "view");
        assert_eq!(perm.scope, Scope::Provider);
        assert_eq!(perm.to_string(), "booking:view:provider");
    }

    #[test]
    fn test_permission_shape_errors() {
        assert_eq!(
            Permission::parse("booking:view"),
            Err(PermissionParseError::WrongShape("booking:view".to_string()))
        );
        assert_eq!(
            Permission::parse("booking:view:own:extra"),
            Err(PermissionParseError::WrongShape("booking:view:own:extra".to_string()))
        );
        assert_eq!(
            Permission::parse(""),
            Err(PermissionParseError::WrongShape("".to_string()))
        );
    }

    #[test]
    fn test_permission_segment_errors() {
        assert_eq!(
            Permission::parse("Booking:view:own"),
            Err(PermissionParseError::BadSegment("Booking".to_string()))
        );
        assert_eq!(
            Permission::parse("booking:vi ew:own"),
            Err(PermissionParseError::BadSegment("vi ew".to_string()))
        );
    }

    #[test]
    fn test_unsupported_scope() {
        assert_eq!(
            Permission::parse("booking:view:galaxy"),
            Err(PermissionParseError::UnsupportedScope("galaxy".to_string()))
        );
    }

    #[test]
    fn test_scope_round_trip() {
        for scope in [
            Scope::Own,
            Scope::Provider,
            Scope::Organization,
            Scope::Booking,
            Scope::Public,
            Scope::All,
        ] {
            assert_eq!(Scope::parse(scope.as_str()), Some(scope));
        }
        assert!(Scope::parse("tenant").is_none());
    }

    #[test]
    fn test_result_constructors() {
        let result = EvaluationResult::allow("User owns the resource", "user:view:own");
        assert!(result.allowed);
        assert_eq!(result.decision(), Decision::Allow);

        let result = EvaluationResult::deny("User does not own the resource", "user:view:own");
        assert!(!result.allowed);
        assert_eq!(result.decision(), Decision::Deny);
        assert!(!result.reason.is_empty());
    }

    #[test]
    fn test_decision_serde() {
        assert_eq!(serde_json::to_string(&Decision::Allow).unwrap(), "\"ALLOW\"");
        assert_eq!(serde_json::to_string(&Decision::Deny).unwrap(), "\"DENY\"");
    }
}

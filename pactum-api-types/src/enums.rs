//! Shared enumerations for roles and resource kinds

use serde::{Deserialize, Serialize};

/// Platform-level user roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// End customer booking services
    Client,
    /// Service provider (individual or company)
    Provider,
    /// Worker promoting/executing engagements for a provider
    Promoter,
    /// Platform administrator
    Admin,
}

impl UserRole {
    /// Convert to the lowercase role name used in profiles and config
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Client => "client",
            UserRole::Provider => "provider",
            UserRole::Promoter => "promoter",
            UserRole::Admin => "platform_admin",
        }
    }

    /// Parse a role name as stored in subject profiles
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "client" => Some(UserRole::Client),
            "provider" => Some(UserRole::Provider),
            "promoter" => Some(UserRole::Promoter),
            "platform_admin" | "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kinds of resources subject to access decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    User,
    Booking,
    Contract,
    Service,
    Company,
    Organization,
    Payment,
    Notification,
}

impl ResourceKind {
    /// Convert to the resource segment used in permission strings
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Booking => "booking",
            ResourceKind::Contract => "contract",
            ResourceKind::Service => "service",
            ResourceKind::Company => "company",
            ResourceKind::Organization => "organization",
            ResourceKind::Payment => "payment",
            ResourceKind::Notification => "notification",
        }
    }

    /// Parse a resource segment back into a kind
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(ResourceKind::User),
            "booking" => Some(ResourceKind::Booking),
            "contract" => Some(ResourceKind::Contract),
            "service" => Some(ResourceKind::Service),
            "company" => Some(ResourceKind::Company),
            "organization" => Some(ResourceKind::Organization),
            "payment" => Some(ResourceKind::Payment),
            "notification" => Some(ResourceKind::Notification),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Client, UserRole::Provider, UserRole::Promoter, UserRole::Admin] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
        assert!(UserRole::parse("intruder").is_none());
    }

    #[test]
    fn test_resource_kind_round_trip() {
        assert_eq!(ResourceKind::parse("booking"), Some(ResourceKind::Booking));
        assert_eq!(ResourceKind::Booking.as_str(), "booking");
        assert!(ResourceKind::parse("widget").is_none());
    }
}

//! Configuration for the scoped permission system

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// RBAC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbacConfig {
    /// Role names that grant the administrative override
    pub admin_roles: Vec<String>,

    /// Whether to cache resolved subject profiles
    pub enable_cache: bool,

    /// Cache TTL in seconds
    pub cache_ttl_seconds: u64,

    /// Standard role definitions
    pub standard_roles: HashMap<String, RoleDefinition>,

    /// Audit trail settings
    pub audit: AuditConfig,
}

impl Default for RbacConfig {
    fn default() -> Self {
        let mut standard_roles = HashMap::new();

        standard_roles.insert(
            "platform_admin".to_string(),
            RoleDefinition {
                display_name: "Platform Administrator".to_string(),
                description: Some("Full platform administration access".to_string()),
                permissions: vec!["system:admin:all".to_string()],
                inherits_from: vec![],
                is_admin: true,
            },
        );

        standard_roles.insert(
            "client".to_string(),
            RoleDefinition {
                display_name: "Client".to_string(),
                description: Some("Customer booking services on the platform".to_string()),
                permissions: vec![
                    "user:view:own".to_string(),
                    "user:edit:own".to_string(),
                    "booking:view:booking".to_string(),
                    "contract:view:own".to_string(),
                    "payment:view:booking".to_string(),
                    "discovery:search:public".to_string(),
                ],
                inherits_from: vec![],
                is_admin: false,
            },
        );

        standard_roles.insert(
            "provider".to_string(),
            RoleDefinition {
                display_name: "Service Provider".to_string(),
                description: Some("Provider offering services and fulfilling bookings".to_string()),
                permissions: vec![
                    "booking:view:provider".to_string(),
                    "booking:update:provider".to_string(),
                    "contract:view:provider".to_string(),
                    "contract:sign:provider".to_string(),
                    "service:manage:provider".to_string(),
                    "payment:view:booking".to_string(),
                    "discovery:search:public".to_string(),
                ],
                inherits_from: vec![],
                is_admin: false,
            },
        );

        standard_roles.insert(
            "promoter".to_string(),
            RoleDefinition {
                display_name: "Promoter".to_string(),
                description: Some("Worker executing engagements for a provider".to_string()),
                permissions: vec![
                    "booking:view:provider".to_string(),
                    "contract:view:provider".to_string(),
                    "discovery:search:public".to_string(),
                ],
                inherits_from: vec![],
                is_admin: false,
            },
        );

        standard_roles.insert(
            "organization_manager".to_string(),
            RoleDefinition {
                display_name: "Organization Manager".to_string(),
                description: Some("Manages contracts and members for an organization".to_string()),
                permissions: vec![
                    "contract:approve:organization".to_string(),
                    "contract:view:organization".to_string(),
                    "company:manage:organization".to_string(),
                ],
                inherits_from: vec!["client".to_string()],
                is_admin: false,
            },
        );

        Self {
            admin_roles: vec!["platform_admin".to_string()],
            enable_cache: true,
            cache_ttl_seconds: 300, // 5 minutes
            standard_roles,
            audit: AuditConfig::default(),
        }
    }
}

impl RbacConfig {
    /// Get role definition by name
    pub fn get_role_definition(&self, role_name: &str) -> Option<&RoleDefinition> {
        self.standard_roles.get(role_name)
    }

    /// Check whether a role name carries the administrative override
    pub fn is_admin_role(&self, role_name: &str) -> bool {
        if self.admin_roles.iter().any(|r| r == role_name) {
            return true;
        }
        self.standard_roles
            .get(role_name)
            .map(|def| def.is_admin)
            .unwrap_or(false)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::error::RbacError> {
        if self.enable_cache && self.cache_ttl_seconds == 0 {
            return Err(crate::error::RbacError::invalid_config(
                "cache_ttl_seconds must be positive when caching is enabled",
            ));
        }
        for (name, def) in &self.standard_roles {
            for parent in &def.inherits_from {
                if !self.standard_roles.contains_key(parent) {
                    return Err(crate::error::RbacError::invalid_config(format!(
                        "role '{}' inherits from unknown role '{}'",
                        name, parent
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Role definition in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub display_name: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub inherits_from: Vec<String>,
    pub is_admin: bool,
}

impl RoleDefinition {
    /// Create a new role definition
    pub fn new(display_name: String, permissions: Vec<String>, is_admin: bool) -> Self {
        Self {
            display_name,
            description: None,
            permissions,
            inherits_from: Vec::new(),
            is_admin,
        }
    }

    /// Add permission to role definition
    pub fn add_permission(&mut self, permission: String) {
        if !self.permissions.contains(&permission) {
            self.permissions.push(permission);
        }
    }
}

/// Audit trail settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Whether decisions are written to the audit trail
    pub enabled: bool,

    /// How long audit log files are retained
    pub retention_days: u32,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retention_days: 90,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RbacConfig::default();

        assert!(config.standard_roles.contains_key("platform_admin"));
        assert!(config.standard_roles.contains_key("client"));
        assert!(config.standard_roles.contains_key("provider"));
        assert!(config.standard_roles.contains_key("promoter"));
        assert!(config.standard_roles.contains_key("organization_manager"));

        assert!(config.is_admin_role("platform_admin"));
        assert!(!config.is_admin_role("client"));
        assert!(!config.is_admin_role("nonexistent"));

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let config = RbacConfig {
            cache_ttl_seconds: 0,
            ..RbacConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_parent() {
        let mut config = RbacConfig::default();
        config.standard_roles.insert(
            "broken".to_string(),
            RoleDefinition {
                display_name: "Broken".to_string(),
                description: None,
                permissions: vec![],
                inherits_from: vec!["missing".to_string()],
                is_admin: false,
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_role_definition_dedupes_permissions() {
        let mut def = RoleDefinition::new("Test".to_string(), vec![], false);
        def.add_permission("booking:view:provider".to_string());
        def.add_permission("booking:view:provider".to_string());
        assert_eq!(def.permissions.len(), 1);
    }
}

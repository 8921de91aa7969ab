//! Role catalog: resolving role names to permission grants
//!
//! The catalog answers introspection questions (what does this role grant,
//! which grants does this subject hold) for UIs and admin tooling. The
//! evaluator's decision table does not consult it; scope resolution is the
//! access contract.

use pactum_api_types::SubjectProfile;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::config::RbacConfig;
use crate::models::Permission;

/// Resolved role catalog
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    grants: HashMap<String, Vec<Permission>>,
    admin_roles: HashSet<String>,
}

impl RoleCatalog {
    /// Build a catalog from configuration, resolving role inheritance.
    ///
    /// Unparsable permission strings in the config are skipped with a
    /// warning rather than poisoning the whole role.
    pub fn from_config(config: &RbacConfig) -> Self {
        let mut grants = HashMap::new();
        let mut admin_roles: HashSet<String> =
            config.admin_roles.iter().cloned().collect();

        for (name, definition) in &config.standard_roles {
            if definition.is_admin {
                admin_roles.insert(name.clone());
            }

            let mut resolved = Vec::new();
            let mut visited = HashSet::new();
            let mut pending = vec![name.clone()];

            while let Some(role_name) = pending.pop() {
                if !visited.insert(role_name.clone()) {
                    continue;
                }
                let Some(definition) = config.standard_roles.get(&role_name) else {
                    continue;
                };
                for permission_str in &definition.permissions {
                    match Permission::parse(permission_str) {
                        Ok(permission) => {
                            if !resolved.contains(&permission) {
                                resolved.push(permission);
                            }
                        }
                        Err(e) => {
                            warn!(role = %role_name, permission = %permission_str, "skipping unparsable grant: {}", e);
                        }
                    }
                }
                pending.extend(definition.inherits_from.iter().cloned());
            }

            grants.insert(name.clone(), resolved);
        }

        Self { grants, admin_roles }
    }

    /// Grants for a role, inheritance resolved
    pub fn grants_for_role(&self, role_name: &str) -> Option<&[Permission]> {
        self.grants.get(role_name).map(|g| g.as_slice())
    }

    /// Check whether a role name carries the administrative override
    pub fn is_admin_role(&self, role_name: &str) -> bool {
        self.admin_roles.contains(role_name)
    }

    /// All grants a subject's roles add up to, deduplicated
    pub fn effective_grants(&self, profile: &SubjectProfile) -> Vec<Permission> {
        let mut grants = Vec::new();
        for role in &profile.roles {
            if let Some(role_grants) = self.grants_for_role(role) {
                for grant in role_grants {
                    if !grants.contains(grant) {
                        grants.push(grant.clone());
                    }
                }
            }
        }
        grants
    }

    /// Check whether any of the subject's roles grants the resource/action pair
    pub fn holds(&self, profile: &SubjectProfile, resource: &str, action: &str) -> bool {
        profile.roles.iter().any(|role| {
            self.grants_for_role(role)
                .map(|grants| grants.iter().any(|g| g.matches(resource, action)))
                .unwrap_or(false)
        })
    }

    /// Role names known to the catalog
    pub fn role_names(&self) -> Vec<&str> {
        self.grants.keys().map(|s| s.as_str()).collect()
    }
}

//! Scoped RBAC for the Pactum contract platform
//!
//! This crate provides relationship-scoped access control with support for:
//! - Closed scope vocabulary (own/provider/organization/booking/public/all)
//! - Administrative override roles
//! - Fire-and-forget audit trail with one record per decision
//! - TTL-cached subject profiles behind injected lookup stores

pub mod audit;
pub mod auth;
pub mod checker;
pub mod config;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod memory;
pub mod models;
pub mod roles;

pub use audit::{AuditLogger, AuditQuery, AuditRecord, AuditStorage, FileAuditStorage, InMemoryAuditStorage};
pub use auth::{ProfileBuilder, ProfileCache};
pub use checker::PermissionChecker;
pub use config::{AuditConfig, RbacConfig, RoleDefinition};
pub use context::{EvaluationContext, EvaluationContextBuilder};
pub use error::{RbacError, RbacResult};
pub use evaluator::PermissionEvaluator;
pub use memory::InMemoryDirectory;
pub use models::{Decision, EvaluationResult, Permission, PermissionParseError, Scope};
pub use roles::RoleCatalog;

/// Re-export commonly used types
pub use pactum_api_types::{ApiId, BookingParties, ResourceKind, SubjectProfile, UserRole};
pub use pactum_interfaces::{Directory, LookupError, RelationshipStore, SubjectStore};

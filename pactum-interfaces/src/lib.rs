//! # Pactum Interfaces
//!
//! Core interfaces and traits for the Pactum access-control architecture.
//!
//! This crate provides the read-only lookup contracts the permission
//! evaluator depends on, keeping the decision engine free of any concrete
//! persistence backend. Database-backed, service-backed and in-memory
//! implementations all satisfy the same traits, which keeps the evaluator
//! deterministic to test and breaks dependency cycles between the core and
//! the storage layer.
//!
//! ## Main Interfaces
//!
//! - [`SubjectStore`] - resolves a user id to its subject profile
//! - [`RelationshipStore`] - resolves resource ownership and associations
//! - [`Directory`] - base trait with health checking

pub mod identity;

// Re-export commonly used types
pub use identity::{Directory, LookupError, RelationshipStore, SubjectStore};

//! # Pactum API Types
//!
//! Unified identifier and domain types shared across the Pactum platform.
//!
//! These types form the vocabulary that the access-control core, the lookup
//! interfaces and the surrounding services all agree on, so that no crate
//! needs to depend on another's internals just to name a user or a booking.

pub mod domain;
pub mod enums;
pub mod ids;

// Re-export commonly used types
pub use domain::{BookingParties, SubjectProfile};
pub use enums::{ResourceKind, UserRole};
pub use ids::ApiId;

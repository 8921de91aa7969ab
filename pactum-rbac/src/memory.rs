//! In-memory identity and relationship directory
//!
//! HashMap-backed implementation of the lookup interfaces. Used by the
//! integration tests and by embedders that resolve identities ahead of time
//! (e.g. request handlers that already joined the data).

use async_trait::async_trait;
use pactum_api_types::{ApiId, BookingParties, ResourceKind, SubjectProfile};
use pactum_interfaces::{Directory, LookupError, RelationshipStore, SubjectStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct DirectoryData {
    subjects: HashMap<ApiId, SubjectProfile>,
    owners: HashMap<(ResourceKind, ApiId), ApiId>,
    providers: HashMap<(ResourceKind, ApiId), ApiId>,
    organizations: HashMap<(ResourceKind, ApiId), ApiId>,
    bookings: HashMap<ApiId, BookingParties>,
}

/// In-memory implementation of [`SubjectStore`] and [`RelationshipStore`]
#[derive(Default, Clone)]
pub struct InMemoryDirectory {
    data: Arc<RwLock<DirectoryData>>,
}

impl InMemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subject profile
    pub async fn add_subject(&self, profile: SubjectProfile) {
        let mut data = self.data.write().await;
        data.subjects.insert(profile.user_id.clone(), profile);
    }

    /// Register the direct owner of a resource
    pub async fn add_owner(
        &self,
        kind: ResourceKind,
        resource_id: impl Into<ApiId>,
        owner_id: impl Into<ApiId>,
    ) {
        let mut data = self.data.write().await;
        data.owners.insert((kind, resource_id.into()), owner_id.into());
    }

    /// Register the provider associated with a resource
    pub async fn add_provider_link(
        &self,
        kind: ResourceKind,
        resource_id: impl Into<ApiId>,
        provider_id: impl Into<ApiId>,
    ) {
        let mut data = self.data.write().await;
        data.providers.insert((kind, resource_id.into()), provider_id.into());
    }

    /// Register the organization owning a resource
    pub async fn add_organization_link(
        &self,
        kind: ResourceKind,
        resource_id: impl Into<ApiId>,
        organization_id: impl Into<ApiId>,
    ) {
        let mut data = self.data.write().await;
        data.organizations
            .insert((kind, resource_id.into()), organization_id.into());
    }

    /// Register a booking with its parties
    pub async fn add_booking(&self, parties: BookingParties) {
        let mut data = self.data.write().await;
        data.bookings.insert(parties.booking_id.clone(), parties);
    }

    /// Remove a subject, e.g. to simulate account deletion
    pub async fn remove_subject(&self, user_id: &ApiId) {
        let mut data = self.data.write().await;
        data.subjects.remove(user_id);
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn health_check(&self) -> Result<(), LookupError> {
        Ok(())
    }
}

#[async_trait]
impl SubjectStore for InMemoryDirectory {
    async fn subject_profile(&self, user_id: &ApiId) -> Result<Option<SubjectProfile>, LookupError> {
        let data = self.data.read().await;
        Ok(data.subjects.get(user_id).cloned())
    }
}

#[async_trait]
impl RelationshipStore for InMemoryDirectory {
    async fn resource_owner(
        &self,
        kind: ResourceKind,
        resource_id: &ApiId,
    ) -> Result<Option<ApiId>, LookupError> {
        let data = self.data.read().await;
        Ok(data.owners.get(&(kind, resource_id.clone())).cloned())
    }

    async fn resource_provider(
        &self,
        kind: ResourceKind,
        resource_id: &ApiId,
    ) -> Result<Option<ApiId>, LookupError> {
        let data = self.data.read().await;
        Ok(data.providers.get(&(kind, resource_id.clone())).cloned())
    }

    async fn resource_organization(
        &self,
        kind: ResourceKind,
        resource_id: &ApiId,
    ) -> Result<Option<ApiId>, LookupError> {
        let data = self.data.read().await;
        Ok(data.organizations.get(&(kind, resource_id.clone())).cloned())
    }

    async fn booking_parties(
        &self,
        booking_id: &ApiId,
    ) -> Result<Option<BookingParties>, LookupError> {
        let data = self.data.read().await;
        Ok(data.bookings.get(booking_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ProfileBuilder;

    #[tokio::test]
    async fn test_subject_round_trip() {
        let directory = InMemoryDirectory::new();
        let profile = ProfileBuilder::for_user("client-basic-1").with_role("client").build();
        directory.add_subject(profile.clone()).await;

        let found = directory
            .subject_profile(&ApiId::from("client-basic-1"))
            .await
            .unwrap();
        assert_eq!(found, Some(profile));

        directory.remove_subject(&ApiId::from("client-basic-1")).await;
        assert!(directory
            .subject_profile(&ApiId::from("client-basic-1"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_relationship_lookups() {
        let directory = InMemoryDirectory::new();
        directory
            .add_owner(ResourceKind::User, "client-basic-1", "client-basic-1")
            .await;
        directory
            .add_provider_link(ResourceKind::Booking, "booking-1", "provider-ind-1")
            .await;
        directory
            .add_organization_link(ResourceKind::Contract, "contract-1", "org-acme")
            .await;
        directory
            .add_booking(BookingParties::new(
                ApiId::from("booking-1"),
                ApiId::from("client-basic-1"),
                Some(ApiId::from("provider-ind-1")),
            ))
            .await;

        assert_eq!(
            directory
                .resource_owner(ResourceKind::User, &ApiId::from("client-basic-1"))
                .await
                .unwrap(),
            Some(ApiId::from("client-basic-1"))
        );
        assert_eq!(
            directory
                .resource_provider(ResourceKind::Booking, &ApiId::from("booking-1"))
                .await
                .unwrap(),
            Some(ApiId::from("provider-ind-1"))
        );
        assert_eq!(
            directory
                .resource_organization(ResourceKind::Contract, &ApiId::from("contract-1"))
                .await
                .unwrap(),
            Some(ApiId::from("org-acme"))
        );
        assert!(directory
            .booking_parties(&ApiId::from("booking-1"))
            .await
            .unwrap()
            .is_some());
        assert!(directory
            .booking_parties(&ApiId::from("booking-404"))
            .await
            .unwrap()
            .is_none());

        // Kind is part of the key
        assert!(directory
            .resource_owner(ResourceKind::Booking, &ApiId::from("client-basic-1"))
            .await
            .unwrap()
            .is_none());

        assert!(directory.health_check().await.is_ok());
    }
}

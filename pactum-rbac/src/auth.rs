//! Subject profile helpers and the profile cache

use pactum_api_types::{ApiId, SubjectProfile};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Helper to build a [`SubjectProfile`]
pub struct ProfileBuilder {
    profile: SubjectProfile,
}

impl ProfileBuilder {
    /// Start building a profile for a user
    pub fn for_user(user_id: impl Into<ApiId>) -> Self {
        Self {
            profile: SubjectProfile::new(user_id.into()),
        }
    }

    /// Add a role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.profile.add_role(role);
        self
    }

    /// Set the provider identity
    pub fn with_provider(mut self, provider_id: impl Into<ApiId>) -> Self {
        self.profile.provider_id = Some(provider_id.into());
        self
    }

    /// Set the organization membership
    pub fn with_organization(mut self, organization_id: impl Into<ApiId>) -> Self {
        self.profile.organization_id = Some(organization_id.into());
        self
    }

    /// Mark the account inactive
    pub fn inactive(mut self) -> Self {
        self.profile.active = false;
        self
    }

    /// Build the final profile
    pub fn build(self) -> SubjectProfile {
        self.profile
    }
}

/// A cached profile with its expiry
#[derive(Debug, Clone)]
struct CachedProfile {
    profile: SubjectProfile,
    cached_at: Instant,
    ttl: Duration,
}

impl CachedProfile {
    fn is_valid(&self) -> bool {
        self.cached_at.elapsed() < self.ttl
    }
}

/// TTL cache for resolved subject profiles.
///
/// The evaluator itself stays stateless across calls; profile caching is the
/// one cross-request concern, and it lives here so it can be sized and
/// invalidated independently of decisions.
#[derive(Debug, Clone)]
pub struct ProfileCache {
    default_ttl: Duration,
    store: Arc<RwLock<HashMap<ApiId, CachedProfile>>>,
}

impl ProfileCache {
    /// Create a new cache with the given default TTL
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get a still-valid cached profile
    pub async fn get(&self, user_id: &ApiId) -> Option<SubjectProfile> {
        let mut store = self.store.write().await;
        match store.get(user_id) {
            Some(entry) if entry.is_valid() => {
                debug!(user_id = %user_id, "profile cache hit");
                Some(entry.profile.clone())
            }
            Some(_) => {
                store.remove(user_id);
                debug!(user_id = %user_id, "profile cache entry expired");
                None
            }
            None => {
                debug!(user_id = %user_id, "profile cache miss");
                None
            }
        }
    }

    /// Cache a resolved profile
    pub async fn put(&self, profile: SubjectProfile) {
        let mut store = self.store.write().await;
        store.insert(
            profile.user_id.clone(),
            CachedProfile {
                profile,
                cached_at: Instant::now(),
                ttl: self.default_ttl,
            },
        );
    }

    /// Drop a cached profile, e.g. after a role change
    pub async fn invalidate(&self, user_id: &ApiId) {
        self.store.write().await.remove(user_id);
    }

    /// Drop every cached profile
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Remove expired entries, returning how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let mut store = self.store.write().await;
        let expired: Vec<ApiId> = store
            .iter()
            .filter(|(_, entry)| !entry.is_valid())
            .map(|(k, _)| k.clone())
            .collect();

        let count = expired.len();
        for key in expired {
            store.remove(&key);
        }
        count
    }

    /// Number of entries currently held, valid or not
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

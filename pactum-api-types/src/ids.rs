use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unified ID type used for every addressable entity on the platform.
///
/// Identities originate in different systems (auth provider subjects, seeded
/// fixtures, database rows), so the canonical representation is an opaque
/// string rather than an integer or UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiId(pub String);

impl ApiId {
    /// Create from a string-like value
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Create from UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }

    /// Mint a fresh random identifier
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Get as string (always available)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Try to parse as UUID
    pub fn as_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.0).ok()
    }

    /// An id is blank when it carries no usable identity
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for ApiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ApiId {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl From<String> for ApiId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ApiId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_id_conversions() {
        let id = ApiId::from_string("client-basic-1");
        assert_eq!(id.as_str(), "client-basic-1");
        assert_eq!(id.to_string(), "client-basic-1");
        assert!(id.as_uuid().is_none());

        let uuid = Uuid::new_v4();
        let id = ApiId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), Some(uuid));
    }

    #[test]
    fn test_blank_detection() {
        assert!(ApiId::from_string("").is_blank());
        assert!(ApiId::from_string("   ").is_blank());
        assert!(!ApiId::from_string("provider-ind-1").is_blank());
    }

    #[test]
    fn test_serde_transparent() {
        let id = ApiId::from_string("booking-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"booking-1\"");
        let back: ApiId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

//! Correlation identifiers
//!
//! A host (HTTP handler, CLI invocation) mints a `RequestId` and attaches it
//! to errors so a failed mutation can be matched to the request that
//! triggered it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a single inbound request against the story store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Mint a fresh time-ordered id (UUIDv7)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an id received from an upstream caller
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn test_display_matches_as_str() {
        let id = RequestId::from_string("req-42".to_string());
        assert_eq!(format!("{}", id), "req-42");
        assert_eq!(id.as_str(), "req-42");
    }

    #[test]
    fn test_request_id_serde_is_transparent_string() {
        let id = RequestId::from_string("req-7".to_string());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"req-7\"");
    }
}

//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Identifier of an onboarded API client (tenant).
///
/// Any non-blank string is accepted; the value is stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);

impl ClientId {
    /// Creates a new ClientId, returning error if empty or whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("client_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ClientId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_accepts_non_empty_string() {
        let id = ClientId::new("acme").unwrap();
        assert_eq!(id.as_str(), "acme");
        assert_eq!(id.to_string(), "acme");
    }

    #[test]
    fn client_id_rejects_empty_string() {
        let result = ClientId::new("");
        match result {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "client_id"),
            other => panic!("expected EmptyField, got {:?}", other),
        }
    }

    #[test]
    fn client_id_rejects_whitespace_only() {
        assert!(ClientId::new("   \t").is_err());
    }

    #[test]
    fn client_id_deserialization_validates() {
        let ok: ClientId = serde_json::from_str("\"acme\"").unwrap();
        assert_eq!(ok.as_str(), "acme");

        let err = serde_json::from_str::<ClientId>("\"\"");
        assert!(err.is_err());
    }
}

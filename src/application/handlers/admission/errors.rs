//! Errors surfaced by admission and rule-administration handlers.
//!
//! Denials are not errors; they are [`AdmissionOutcome::Denied`] values.
//!
//! [`AdmissionOutcome::Denied`]: crate::domain::admission::AdmissionOutcome::Denied

use thiserror::Error;

use crate::domain::foundation::{ClientId, ErrorCode, ValidationError};
use crate::ports::{LockError, StoreError};

/// Failure of an admission check or an administrative operation.
#[derive(Debug, Clone, Error)]
pub enum AdmissionError {
    /// Empty or malformed input; nothing was changed.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// The client is already onboarded.
    #[error("client '{client_id}' already exists")]
    Conflict { client_id: String },

    /// The targeted client does not exist.
    #[error("client '{client_id}' not found")]
    ClientNotFound { client_id: String },

    /// None of the targeted rules exist.
    #[error("no matching rules: {0}")]
    RuleNotFound(String),

    /// Durable store or cache I/O failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The bounded lock wait elapsed.
    #[error("timed out after {waited_ms}ms waiting for lock on client '{client_id}'")]
    LockTimeout { client_id: String, waited_ms: u64 },

    /// The lock provider failed to acquire or release.
    #[error("lock failure: {0}")]
    LockFailure(String),
}

impl AdmissionError {
    pub fn conflict(client_id: &ClientId) -> Self {
        AdmissionError::Conflict {
            client_id: client_id.to_string(),
        }
    }

    pub fn client_not_found(client_id: &ClientId) -> Self {
        AdmissionError::ClientNotFound {
            client_id: client_id.to_string(),
        }
    }

    /// True for both client and rule lookups that found nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AdmissionError::ClientNotFound { .. } | AdmissionError::RuleNotFound(_)
        )
    }

    /// Returns the stable code reported to API callers.
    pub fn code(&self) -> ErrorCode {
        match self {
            AdmissionError::InvalidArgument(e) => e.code(),
            AdmissionError::Conflict { .. } => ErrorCode::ClientAlreadyExists,
            AdmissionError::ClientNotFound { .. } => ErrorCode::ClientNotFound,
            AdmissionError::RuleNotFound(_) => ErrorCode::RuleNotFound,
            AdmissionError::StoreUnavailable(_) => ErrorCode::StoreUnavailable,
            AdmissionError::LockTimeout { .. } => ErrorCode::LockTimeout,
            AdmissionError::LockFailure(_) => ErrorCode::LockFailure,
        }
    }
}

impl From<StoreError> for AdmissionError {
    fn from(err: StoreError) -> Self {
        AdmissionError::StoreUnavailable(err.to_string())
    }
}

impl From<LockError> for AdmissionError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Timeout { client_id, waited_ms } => {
                AdmissionError::LockTimeout { client_id, waited_ms }
            }
            LockError::Unavailable(reason) => AdmissionError::LockFailure(reason),
        }
    }
}

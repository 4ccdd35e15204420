//! Results of an admission check.

use std::fmt;

use crate::domain::foundation::ErrorCode;

use super::rule::RuleKey;

/// Remaining budget of one enforced rule after an admitted request.
#[derive(Debug, Clone, PartialEq)]
pub struct PermitBalance {
    pub key: RuleKey,
    pub remaining: f64,
    pub max_permits: u32,
}

/// Why a request was not admitted.
///
/// Denials are normal outcomes, not errors; no rule state changes on any of them.
#[derive(Debug, Clone, PartialEq)]
pub enum DenyReason {
    /// The client is unknown and auto-provisioning is disabled.
    NotConfigured,
    /// The client exists but no rule applies to the request.
    NoLimitsConfigured,
    /// The named rule had less than one permit available.
    RateLimitExceeded { key: RuleKey, available: f64 },
}

impl DenyReason {
    pub fn code(&self) -> ErrorCode {
        match self {
            DenyReason::NotConfigured => ErrorCode::NotConfigured,
            DenyReason::NoLimitsConfigured => ErrorCode::NoLimitsConfigured,
            DenyReason::RateLimitExceeded { .. } => ErrorCode::RateLimited,
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NotConfigured => {
                write!(f, "Client not configured, and default configuration is disabled")
            }
            DenyReason::NoLimitsConfigured => {
                write!(f, "Rate limit configuration missing")
            }
            DenyReason::RateLimitExceeded { key, .. } => {
                write!(f, "Rate limit reached for {} on {}", key.client_id(), key)
            }
        }
    }
}

/// Final decision of an admission check.
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionOutcome {
    /// Admitted; one permit was consumed from every listed rule.
    Allowed(Vec<PermitBalance>),
    /// Rejected with the given reason.
    Denied(DenyReason),
}

impl AdmissionOutcome {
    /// Returns true if the request was allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, AdmissionOutcome::Allowed(_))
    }

    /// Returns true if the request was denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, AdmissionOutcome::Denied(_))
    }

    /// Returns the denial reason, if any.
    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            AdmissionOutcome::Denied(reason) => Some(reason),
            AdmissionOutcome::Allowed(_) => None,
        }
    }
}

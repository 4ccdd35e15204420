//! HTTP DTOs (Data Transfer Objects) for admission endpoints.
//!
//! These types define the JSON request/response structure for the rate limiter API.
//! They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{ConfigureClientResult, DeleteRulesResult, RemoveClientResult};
use crate::domain::admission::{
    AdmissionOutcome, LimitTier, PermitBalance, RateLimitRule, RefillUnit, RuleSelector, RuleSpec,
};
use crate::domain::foundation::ValidationError;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create or overwrite a client's limits.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigureClientRequest {
    pub client_id: String,
    /// Limits to upsert. Empty only ensures the client exists.
    #[serde(default)]
    pub limits: Vec<LimitConfigRequest>,
}

/// One limit in a configure request.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitConfigRequest {
    pub limit_type: LimitTier,
    /// Method or API name; ignored (GLOBAL) for DEFAULT limits.
    #[serde(default)]
    pub limit_name: String,
    pub time_unit: RefillUnit,
    pub max_requests: u32,
}

impl LimitConfigRequest {
    pub fn into_spec(self) -> Result<RuleSpec, ValidationError> {
        RuleSpec::new(self.limit_type, self.limit_name, self.time_unit, self.max_requests)
    }
}

/// Request to check one API call against the client's limits.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyApiLimitRequest {
    pub client_id: String,
    #[serde(default)]
    pub method_name: String,
    #[serde(default)]
    pub api_name: String,
}

/// Request to delete some of a client's limits.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteLimitsRequest {
    pub client_id: String,
    #[serde(default)]
    pub limits: Vec<LimitSelectorRequest>,
}

/// Addresses one limit for deletion.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitSelectorRequest {
    pub limit_type: LimitTier,
    #[serde(default)]
    pub limit_name: String,
}

impl From<LimitSelectorRequest> for RuleSelector {
    fn from(req: LimitSelectorRequest) -> Self {
        RuleSelector::new(req.limit_type, req.limit_name)
    }
}

/// Request to onboard a client without limits.
#[derive(Debug, Clone, Deserialize)]
pub struct AddClientRequest {
    pub client_id: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// One configured limit with its live bucket state.
#[derive(Debug, Clone, Serialize)]
pub struct LimitResponse {
    pub id: String,
    pub client_id: String,
    pub limit_type: LimitTier,
    pub limit_name: String,
    pub time_unit: RefillUnit,
    pub max_requests: u32,
    pub available_requests: f64,
    /// Last refill instant (ISO 8601).
    pub last_refill_at: String,
}

impl From<RateLimitRule> for LimitResponse {
    fn from(rule: RateLimitRule) -> Self {
        Self {
            id: rule.key().storage_key(),
            client_id: rule.client_id().to_string(),
            limit_type: rule.key().tier(),
            limit_name: rule.key().scope_name().to_string(),
            time_unit: rule.time_unit(),
            max_requests: rule.max_permits(),
            available_requests: rule.available_permits(),
            last_refill_at: rule.last_refill_at().as_datetime().to_rfc3339(),
        }
    }
}

/// Response for a configure request.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigureClientResponse {
    pub client_id: String,
    pub client_created: bool,
    pub limits: Vec<LimitResponse>,
}

impl From<ConfigureClientResult> for ConfigureClientResponse {
    fn from(result: ConfigureClientResult) -> Self {
        Self {
            client_id: result.client_id.to_string(),
            client_created: result.client_created,
            limits: result.rules.into_iter().map(LimitResponse::from).collect(),
        }
    }
}

/// Remaining budget of one enforced limit after an allowed call.
#[derive(Debug, Clone, Serialize)]
pub struct RemainingResponse {
    pub limit_type: LimitTier,
    pub limit_name: String,
    pub remaining: f64,
    pub max_requests: u32,
}

impl From<PermitBalance> for RemainingResponse {
    fn from(balance: PermitBalance) -> Self {
        Self {
            limit_type: balance.key.tier(),
            limit_name: balance.key.scope_name().to_string(),
            remaining: balance.remaining,
            max_requests: balance.max_permits,
        }
    }
}

/// Response for an admission check.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyApiLimitResponse {
    pub allowed: bool,
    /// Denial code; absent when allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub limits: Vec<RemainingResponse>,
}

impl From<AdmissionOutcome> for VerifyApiLimitResponse {
    fn from(outcome: AdmissionOutcome) -> Self {
        match outcome {
            AdmissionOutcome::Allowed(balances) => Self {
                allowed: true,
                reason_code: None,
                message: "Request allowed".to_string(),
                limits: balances.into_iter().map(RemainingResponse::from).collect(),
            },
            AdmissionOutcome::Denied(reason) => Self {
                allowed: false,
                reason_code: Some(reason.code().to_string()),
                message: reason.to_string(),
                limits: Vec::new(),
            },
        }
    }
}

/// Response for a limit deletion.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteLimitsResponse {
    pub deleted: usize,
}

impl From<DeleteRulesResult> for DeleteLimitsResponse {
    fn from(result: DeleteRulesResult) -> Self {
        Self {
            deleted: result.removed,
        }
    }
}

/// Response for a client removal.
#[derive(Debug, Clone, Serialize)]
pub struct RemoveClientResponse {
    pub client_id: String,
    pub limits_deleted: usize,
}

impl From<RemoveClientResult> for RemoveClientResponse {
    fn from(result: RemoveClientResult) -> Self {
        Self {
            client_id: result.client_id.to_string(),
            limits_deleted: result.rules_removed,
        }
    }
}

/// Response for client creation.
#[derive(Debug, Clone, Serialize)]
pub struct ClientResponse {
    pub client_id: String,
}

/// Liveness response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

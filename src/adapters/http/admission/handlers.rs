//! HTTP handlers for admission endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::{
    AddClientCommand, AdmissionError, AdmissionServices, CheckAdmissionCommand,
    ConfigureClientCommand, DeleteRulesCommand, ListClientRulesQuery, RemoveClientCommand,
};
use crate::domain::admission::RuleSpec;

use super::dto::{
    AddClientRequest, ClientResponse, ConfigureClientRequest, ConfigureClientResponse,
    DeleteLimitsRequest, DeleteLimitsResponse, ErrorResponse, HealthResponse, LimitResponse,
    RemoveClientResponse, VerifyApiLimitRequest, VerifyApiLimitResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned for each request; every handler inside shares the same ports.
#[derive(Clone)]
pub struct AdmissionAppState {
    pub services: AdmissionServices,
}

impl AdmissionAppState {
    pub fn new(services: AdmissionServices) -> Self {
        Self { services }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /ratelimiter/configure-client - Create or overwrite a client's limits
pub async fn configure_client(
    State(state): State<AdmissionAppState>,
    Json(request): Json<ConfigureClientRequest>,
) -> Result<impl IntoResponse, AdmissionApiError> {
    let rules = request
        .limits
        .into_iter()
        .map(|limit| limit.into_spec())
        .collect::<Result<Vec<RuleSpec>, _>>()
        .map_err(AdmissionError::from)?;

    let cmd = ConfigureClientCommand {
        client_id: request.client_id,
        rules,
    };
    let result = state.services.configure_client.handle(cmd).await?;

    Ok(Json(ConfigureClientResponse::from(result)))
}

/// POST /ratelimiter/verify-api-limit - Check one API call
///
/// 200 when allowed, 429 when denied.
pub async fn verify_api_limit(
    State(state): State<AdmissionAppState>,
    Json(request): Json<VerifyApiLimitRequest>,
) -> Result<impl IntoResponse, AdmissionApiError> {
    let cmd = CheckAdmissionCommand {
        client_id: request.client_id,
        method_id: request.method_name,
        api_id: request.api_name,
    };
    let outcome = state.services.check.handle(cmd).await?;

    let status = if outcome.is_allowed() {
        StatusCode::OK
    } else {
        StatusCode::TOO_MANY_REQUESTS
    };
    Ok((status, Json(VerifyApiLimitResponse::from(outcome))))
}

/// DELETE /ratelimiter/delete-limits - Delete some of a client's limits
pub async fn delete_limits(
    State(state): State<AdmissionAppState>,
    Json(request): Json<DeleteLimitsRequest>,
) -> Result<impl IntoResponse, AdmissionApiError> {
    let cmd = DeleteRulesCommand {
        client_id: request.client_id,
        selectors: request.limits.into_iter().map(Into::into).collect(),
    };
    let result = state.services.delete_rules.handle(cmd).await?;

    Ok(Json(DeleteLimitsResponse::from(result)))
}

/// POST /ratelimiter/clients - Onboard a client without limits
pub async fn add_client(
    State(state): State<AdmissionAppState>,
    Json(request): Json<AddClientRequest>,
) -> Result<impl IntoResponse, AdmissionApiError> {
    let cmd = AddClientCommand {
        client_id: request.client_id,
    };
    let client_id = state.services.add_client.handle(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(ClientResponse {
            client_id: client_id.to_string(),
        }),
    ))
}

/// DELETE /ratelimiter/clients/:client_id - Remove a client and all its limits
pub async fn remove_client(
    State(state): State<AdmissionAppState>,
    Path(client_id): Path<String>,
) -> Result<impl IntoResponse, AdmissionApiError> {
    let cmd = RemoveClientCommand { client_id };
    let result = state.services.remove_client.handle(cmd).await?;

    Ok(Json(RemoveClientResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /ratelimiter/configured-limits - Every limit of every client
pub async fn configured_limits(
    State(state): State<AdmissionAppState>,
) -> Result<impl IntoResponse, AdmissionApiError> {
    let rules = state.services.list_all_rules.handle().await?;
    let response: Vec<LimitResponse> = rules.into_iter().map(LimitResponse::from).collect();
    Ok(Json(response))
}

/// GET /ratelimiter/clients/:client_id/limits - One client's limits
pub async fn client_limits(
    State(state): State<AdmissionAppState>,
    Path(client_id): Path<String>,
) -> Result<impl IntoResponse, AdmissionApiError> {
    let query = ListClientRulesQuery { client_id };
    let rules = state.services.list_client_rules.handle(query).await?;
    let response: Vec<LimitResponse> = rules.into_iter().map(LimitResponse::from).collect();
    Ok(Json(response))
}

/// GET /health - Liveness check
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts application errors to HTTP responses.
#[derive(Debug)]
pub struct AdmissionApiError(AdmissionError);

impl From<AdmissionError> for AdmissionApiError {
    fn from(err: AdmissionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AdmissionApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            AdmissionError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AdmissionError::Conflict { .. } => StatusCode::CONFLICT,
            AdmissionError::ClientNotFound { .. } | AdmissionError::RuleNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AdmissionError::StoreUnavailable(_) | AdmissionError::LockTimeout { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AdmissionError::LockFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }

        let body = ErrorResponse::new(self.0.code().to_string(), self.0.to_string());
        (status, Json(body)).into_response()
    }
}

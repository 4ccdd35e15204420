//! Axum router configuration for admission endpoints.
//!
//! This module defines the route structure for the rate limiter API
//! and wires it to the corresponding handlers.

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{
    add_client, client_limits, configure_client, configured_limits, delete_limits, health,
    remove_client, verify_api_limit, AdmissionAppState,
};

/// Create the rate limiter API routes.
///
/// # Routes
///
/// ## Admission
/// - `POST /verify-api-limit` - Check one API call (200 allowed, 429 denied)
///
/// ## Administration
/// - `POST /configure-client` - Upsert a client's limits
/// - `DELETE /delete-limits` - Delete some of a client's limits
/// - `POST /clients` - Onboard a client without limits
/// - `DELETE /clients/:client_id` - Remove a client and its limits
/// - `GET /configured-limits` - Every limit of every client
/// - `GET /clients/:client_id/limits` - One client's limits
pub fn admission_routes() -> Router<AdmissionAppState> {
    Router::new()
        .route("/verify-api-limit", post(verify_api_limit))
        .route("/configure-client", post(configure_client))
        .route("/delete-limits", delete(delete_limits))
        .route("/configured-limits", get(configured_limits))
        .route("/clients", post(add_client))
        .route("/clients/:client_id", delete(remove_client))
        .route("/clients/:client_id/limits", get(client_limits))
}

/// Create the complete admission router.
///
/// Mounts the API under `/ratelimiter` and adds `GET /health`.
///
/// # Example
///
/// ```ignore
/// let app = admission_router().with_state(AdmissionAppState::new(services));
/// ```
pub fn admission_router() -> Router<AdmissionAppState> {
    Router::new()
        .nest("/ratelimiter", admission_routes())
        .route("/health", get(health))
}

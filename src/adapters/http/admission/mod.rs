//! HTTP adapter for admission endpoints.
//!
//! Exposes the admission engine and rule administration via REST API:
//! - `POST /ratelimiter/verify-api-limit` - Check one API call
//! - `POST /ratelimiter/configure-client` - Upsert a client's limits
//! - `DELETE /ratelimiter/delete-limits` - Delete some of a client's limits
//! - `POST /ratelimiter/clients` - Onboard a client
//! - `DELETE /ratelimiter/clients/:client_id` - Remove a client and its limits
//! - `GET /ratelimiter/configured-limits` - List every limit
//! - `GET /ratelimiter/clients/:client_id/limits` - List one client's limits
//! - `GET /health` - Liveness

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AdmissionApiError, AdmissionAppState};
pub use routes::{admission_router, admission_routes};

//! HTTP adapters - REST API implementations.

pub mod admission;

pub use admission::{admission_router, AdmissionAppState};

//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the admission-control domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use ids::ClientId;
pub use timestamp::Timestamp;

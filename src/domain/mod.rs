//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (identifiers, timestamps, errors)
//! - `admission` - Rate limit rules, tiers, and the token-bucket decision

pub mod admission;
pub mod foundation;

//! Admission domain - rules, tiers, and the refill-and-decide algorithm.
//!
//! Everything here is pure: no I/O, no clocks. Callers pass `now` explicitly.

mod bucket;
mod outcome;
mod rule;
mod tier;

pub use bucket::{refill_and_decide, refilled_permits, BucketDecision};
pub use outcome::{AdmissionOutcome, DenyReason, PermitBalance};
pub use rule::{RateLimitRule, RuleKey, RuleSelector, RuleSnapshot, RuleSpec, GLOBAL_SCOPE};
pub use tier::{LimitTier, RefillUnit};

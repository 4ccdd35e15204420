//! Continuous token-bucket refill and the all-or-nothing admission decision.
//!
//! A rule behaves as a bucket of capacity `max_permits` that refills at
//! `max_permits` tokens per elapsed `time_unit`, saturating at capacity:
//!
//! ```text
//! elapsed   = max(0, now - last_refill_at)
//! refilled  = min(max_permits, available + elapsed_units * max_permits)
//! ```
//!
//! A decision spans every applicable rule. Either all of them have at least
//! one whole permit and all are debited, or none of them is touched.

use crate::domain::foundation::Timestamp;

use super::outcome::PermitBalance;
use super::rule::{RateLimitRule, RuleKey};

/// Balance `rule` would hold at `now`, without mutating it.
pub fn refilled_permits(rule: &RateLimitRule, now: Timestamp) -> f64 {
    // Clock skew clamps to zero elapsed time.
    let elapsed_millis = now.millis_since(&rule.last_refill_at()).max(0);
    let elapsed_units = rule.time_unit().units_in(elapsed_millis);
    let capacity = f64::from(rule.max_permits());
    let refilled = rule.available_permits() + elapsed_units * capacity;
    refilled.min(capacity)
}

/// Outcome of running the bucket algorithm over a rule set.
#[derive(Debug, Clone, PartialEq)]
pub enum BucketDecision {
    /// Every rule was debited one permit.
    Admitted(Vec<PermitBalance>),
    /// The first rule without a whole permit; nothing was debited.
    Exhausted { key: RuleKey, available: f64 },
}

/// Refills and debits `rules` as one unit.
///
/// On `Exhausted` the rules are left exactly as passed in, so the caller
/// must not persist them; refill progress stays implied by the unchanged
/// `last_refill_at` and is recomputed on the next attempt.
pub fn refill_and_decide(rules: &mut [RateLimitRule], now: Timestamp) -> BucketDecision {
    let refilled: Vec<f64> = rules.iter().map(|rule| refilled_permits(rule, now)).collect();

    if let Some((rule, available)) = rules
        .iter()
        .zip(refilled.iter())
        .find(|(_, available)| **available < 1.0)
    {
        return BucketDecision::Exhausted {
            key: rule.key().clone(),
            available: *available,
        };
    }

    let balances = rules
        .iter_mut()
        .zip(refilled)
        .map(|(rule, available)| {
            rule.consume_one(available, now);
            PermitBalance {
                key: rule.key().clone(),
                remaining: rule.available_permits(),
                max_permits: rule.max_permits(),
            }
        })
        .collect();

    BucketDecision::Admitted(balances)
}

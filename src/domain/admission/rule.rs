//! Rate limit rules and the requests that create or address them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ClientId, Timestamp, ValidationError};

use super::tier::{LimitTier, RefillUnit};

/// Fixed scope name of every `DEFAULT` tier rule.
pub const GLOBAL_SCOPE: &str = "GLOBAL";

/// Structured identity of a rule: `(client, tier, scope)`.
///
/// This is the only key a rule is stored under. It never changes after
/// the rule is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    client_id: ClientId,
    tier: LimitTier,
    scope_name: String,
}

impl RuleKey {
    /// Creates a key, validating the scope against the tier.
    ///
    /// `DEFAULT` accepts only `GLOBAL` (an empty scope is normalized to it);
    /// `METHOD` and `API` require a non-blank scope.
    pub fn new(
        client_id: ClientId,
        tier: LimitTier,
        scope_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let scope_name = scope_name.into();
        let scope_name = match tier {
            LimitTier::Default => {
                if scope_name.trim().is_empty() || scope_name == GLOBAL_SCOPE {
                    GLOBAL_SCOPE.to_string()
                } else {
                    return Err(ValidationError::invalid_format(
                        "scope_name",
                        format!("DEFAULT rules must use scope '{}'", GLOBAL_SCOPE),
                    ));
                }
            }
            LimitTier::Method | LimitTier::Api => {
                if scope_name.trim().is_empty() {
                    return Err(ValidationError::empty_field("scope_name"));
                }
                scope_name
            }
        };

        Ok(Self {
            client_id,
            tier,
            scope_name,
        })
    }

    /// Key of the client-wide `DEFAULT`/`GLOBAL` rule.
    pub fn default_for(client_id: ClientId) -> Self {
        Self {
            client_id,
            tier: LimitTier::Default,
            scope_name: GLOBAL_SCOPE.to_string(),
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn tier(&self) -> LimitTier {
        self.tier
    }

    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    /// Flat string form used by key-value stores.
    ///
    /// Each component is escaped (`%` and `:`) before joining with `:`, so
    /// two distinct keys never encode to the same string.
    pub fn storage_key(&self) -> String {
        format!(
            "{}:{}:{}",
            escape_component(self.client_id.as_str()),
            self.tier.as_str(),
            escape_component(&self.scope_name)
        )
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.client_id, self.tier, self.scope_name)
    }
}

fn escape_component(raw: &str) -> String {
    raw.replace('%', "%25").replace(':', "%3A")
}

/// A configured consumption budget for one client scope.
///
/// Invariant: `0 <= available_permits <= max_permits`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleSnapshot", into = "RuleSnapshot")]
pub struct RateLimitRule {
    key: RuleKey,
    time_unit: RefillUnit,
    max_permits: u32,
    available_permits: f64,
    last_refill_at: Timestamp,
}

impl RateLimitRule {
    /// Creates a rule with a full bucket, as of `now`.
    pub fn new(key: RuleKey, time_unit: RefillUnit, max_permits: u32, now: Timestamp) -> Self {
        Self {
            key,
            time_unit,
            max_permits,
            available_permits: f64::from(max_permits),
            last_refill_at: now,
        }
    }

    /// Reconstitutes a rule from persisted state, checking its invariants.
    pub fn restore(
        key: RuleKey,
        time_unit: RefillUnit,
        max_permits: u32,
        available_permits: f64,
        last_refill_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        validate_max_permits(max_permits)?;
        if !available_permits.is_finite()
            || available_permits < 0.0
            || available_permits > f64::from(max_permits)
        {
            return Err(ValidationError::invalid_format(
                "available_permits",
                format!(
                    "{} is outside [0, {}]",
                    available_permits, max_permits
                ),
            ));
        }

        Ok(Self {
            key,
            time_unit,
            max_permits,
            available_permits,
            last_refill_at,
        })
    }

    pub fn key(&self) -> &RuleKey {
        &self.key
    }

    pub fn client_id(&self) -> &ClientId {
        self.key.client_id()
    }

    pub fn time_unit(&self) -> RefillUnit {
        self.time_unit
    }

    pub fn max_permits(&self) -> u32 {
        self.max_permits
    }

    pub fn available_permits(&self) -> f64 {
        self.available_permits
    }

    pub fn last_refill_at(&self) -> Timestamp {
        self.last_refill_at
    }

    /// Records one consumed permit out of a freshly refilled balance.
    ///
    /// The refill instant never moves backwards, even if `now` does.
    pub(super) fn consume_one(&mut self, refilled: f64, now: Timestamp) {
        self.available_permits = (refilled - 1.0).clamp(0.0, f64::from(self.max_permits));
        self.last_refill_at = self.last_refill_at.max(now);
    }
}

fn validate_max_permits(max_permits: u32) -> Result<(), ValidationError> {
    if max_permits == 0 {
        return Err(ValidationError::out_of_range(
            "max_permits",
            1,
            i64::from(u32::MAX),
            0,
        ));
    }
    Ok(())
}

/// Flat, serializable view of a rule used by caches and API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSnapshot {
    /// Encoded storage key; informational, ignored when restoring.
    #[serde(default)]
    pub id: String,
    pub client_id: String,
    pub tier: LimitTier,
    pub scope_name: String,
    pub time_unit: RefillUnit,
    pub max_permits: u32,
    pub available_permits: f64,
    pub last_refill_at: Timestamp,
}

impl From<RateLimitRule> for RuleSnapshot {
    fn from(rule: RateLimitRule) -> Self {
        Self {
            id: rule.key.storage_key(),
            client_id: rule.key.client_id.to_string(),
            tier: rule.key.tier,
            scope_name: rule.key.scope_name,
            time_unit: rule.time_unit,
            max_permits: rule.max_permits,
            available_permits: rule.available_permits,
            last_refill_at: rule.last_refill_at,
        }
    }
}

impl TryFrom<RuleSnapshot> for RateLimitRule {
    type Error = ValidationError;

    fn try_from(snapshot: RuleSnapshot) -> Result<Self, Self::Error> {
        let key = RuleKey::new(
            ClientId::new(snapshot.client_id)?,
            snapshot.tier,
            snapshot.scope_name,
        )?;
        RateLimitRule::restore(
            key,
            snapshot.time_unit,
            snapshot.max_permits,
            snapshot.available_permits,
            snapshot.last_refill_at,
        )
    }
}

/// Desired configuration of one rule, as submitted by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub tier: LimitTier,
    pub scope_name: String,
    pub time_unit: RefillUnit,
    pub max_permits: u32,
}

impl RuleSpec {
    /// Creates a validated spec.
    pub fn new(
        tier: LimitTier,
        scope_name: impl Into<String>,
        time_unit: RefillUnit,
        max_permits: u32,
    ) -> Result<Self, ValidationError> {
        validate_max_permits(max_permits)?;
        Ok(Self {
            tier,
            scope_name: scope_name.into(),
            time_unit,
            max_permits,
        })
    }

    /// Materializes the spec for `client_id` with a full bucket.
    ///
    /// Overwriting an existing rule with this value resets its consumption.
    pub fn into_rule(self, client_id: ClientId, now: Timestamp) -> Result<RateLimitRule, ValidationError> {
        validate_max_permits(self.max_permits)?;
        let key = RuleKey::new(client_id, self.tier, self.scope_name)?;
        Ok(RateLimitRule::new(key, self.time_unit, self.max_permits, now))
    }
}

/// Addresses an existing rule of a client for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSelector {
    pub tier: LimitTier,
    pub scope_name: String,
}

impl RuleSelector {
    pub fn new(tier: LimitTier, scope_name: impl Into<String>) -> Self {
        Self {
            tier,
            scope_name: scope_name.into(),
        }
    }

    /// Resolves the selector to a concrete key for `client_id`.
    pub fn key_for(&self, client_id: ClientId) -> Result<RuleKey, ValidationError> {
        RuleKey::new(client_id, self.tier, self.scope_name.clone())
    }
}

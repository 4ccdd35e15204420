//! Admission engine configuration

use serde::Deserialize;
use std::time::Duration;

use crate::application::AdmissionConfig;
use crate::domain::admission::RefillUnit;

use super::error::ValidationError;

/// Admission behaviour, cache/lock key layout and lock timing
#[derive(Debug, Clone, Deserialize)]
pub struct AdmissionSettings {
    /// Create unknown clients with a seed DEFAULT rule on first check
    #[serde(default)]
    pub auto_provision: bool,

    /// Prefix of every rule cache key
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Prefix of every client lock key
    #[serde(default = "default_lock_prefix")]
    pub lock_prefix: String,

    /// Maximum wait for a busy client lock in milliseconds; 0 waits forever
    #[serde(default = "default_lock_wait_ms")]
    pub lock_wait_ms: u64,

    /// Auto-expiry of a held distributed lock in milliseconds
    #[serde(default = "default_lock_lease_ms")]
    pub lock_lease_ms: u64,

    /// Capacity of the auto-provisioned seed rule
    #[serde(default = "default_max_permits")]
    pub default_max_permits: u32,

    /// Refill unit of the auto-provisioned seed rule (SEC, MIN, ...)
    #[serde(default = "default_time_unit")]
    pub default_time_unit: String,

    /// Copy every durable rule into the cache at startup
    #[serde(default = "default_warm_cache")]
    pub warm_cache_on_startup: bool,
}

impl AdmissionSettings {
    /// Bounded lock wait, or `None` to wait indefinitely
    pub fn lock_wait(&self) -> Option<Duration> {
        match self.lock_wait_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Auto-expiry of the distributed lock.
    ///
    /// The lease is fixed at acquisition and never renewed. A check whose
    /// storage writes stall past it may overlap with the next holder on
    /// another server, so size it above the slowest expected check.
    pub fn lock_lease(&self) -> Duration {
        Duration::from_millis(self.lock_lease_ms)
    }

    /// Engine settings derived from this section
    pub fn engine_config(&self) -> Result<AdmissionConfig, ValidationError> {
        let seed_time_unit: RefillUnit = self
            .default_time_unit
            .parse()
            .map_err(|_| ValidationError::InvalidSeedTimeUnit(self.default_time_unit.clone()))?;

        Ok(AdmissionConfig {
            auto_provision: self.auto_provision,
            seed_max_permits: self.default_max_permits,
            seed_time_unit,
        })
    }

    /// Validate admission configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_max_permits == 0 {
            return Err(ValidationError::InvalidSeedCapacity);
        }
        self.engine_config()?;

        if self.cache_prefix.is_empty() {
            return Err(ValidationError::EmptyKeyPrefix("cache_prefix"));
        }
        if self.lock_prefix.is_empty() {
            return Err(ValidationError::EmptyKeyPrefix("lock_prefix"));
        }
        if self.cache_prefix == self.lock_prefix {
            return Err(ValidationError::PrefixCollision);
        }

        // A lease that can expire while a waiter is still entitled to wait
        // lets two holders overlap.
        if self.lock_lease_ms == 0 || (self.lock_wait_ms > 0 && self.lock_lease_ms <= self.lock_wait_ms) {
            return Err(ValidationError::LeaseShorterThanWait {
                lease_ms: self.lock_lease_ms,
                wait_ms: self.lock_wait_ms,
            });
        }
        Ok(())
    }
}

impl Default for AdmissionSettings {
    fn default() -> Self {
        Self {
            auto_provision: false,
            cache_prefix: default_cache_prefix(),
            lock_prefix: default_lock_prefix(),
            lock_wait_ms: default_lock_wait_ms(),
            lock_lease_ms: default_lock_lease_ms(),
            default_max_permits: default_max_permits(),
            default_time_unit: default_time_unit(),
            warm_cache_on_startup: default_warm_cache(),
        }
    }
}

fn default_cache_prefix() -> String {
    "rate_limit:".to_string()
}

fn default_lock_prefix() -> String {
    "client_lock:".to_string()
}

fn default_lock_wait_ms() -> u64 {
    5_000
}

fn default_lock_lease_ms() -> u64 {
    30_000
}

fn default_max_permits() -> u32 {
    10
}

fn default_time_unit() -> String {
    "SEC".to_string()
}

fn default_warm_cache() -> bool {
    true
}

//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC, at millisecond precision.
///
/// Millisecond precision keeps values identical after a round trip through
/// any of the stores (PostgreSQL keeps microseconds, the cache keeps JSON).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self::from_unix_millis(Utc::now().timestamp_millis())
    }

    /// Creates a timestamp from a DateTime<Utc>, truncating to milliseconds.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::from_unix_millis(dt.timestamp_millis())
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Creates a timestamp from Unix milliseconds.
    ///
    /// Out-of-range inputs saturate to the Unix epoch.
    pub fn from_unix_millis(millis: i64) -> Self {
        Self(
            Utc.timestamp_millis_opt(millis)
                .single()
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        )
    }

    /// Returns the timestamp as Unix milliseconds.
    pub fn as_unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Milliseconds elapsed from `earlier` to this timestamp.
    ///
    /// Negative when `earlier` is actually later (clock skew).
    pub fn millis_since(&self, earlier: &Timestamp) -> i64 {
        self.0.signed_duration_since(earlier.0).num_milliseconds()
    }

    /// Creates a new timestamp by subtracting milliseconds.
    pub fn minus_millis(&self, millis: i64) -> Self {
        Self(self.0 - Duration::milliseconds(millis))
    }

    /// Creates a new timestamp by adding milliseconds.
    pub fn plus_millis(&self, millis: i64) -> Self {
        Self(self.0 + Duration::milliseconds(millis))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

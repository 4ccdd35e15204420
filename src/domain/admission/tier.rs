//! Rule tiers and refill units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

const MILLIS_IN_SECOND: i64 = 1_000;
const MILLIS_IN_MINUTE: i64 = 60 * MILLIS_IN_SECOND;
const MILLIS_IN_HOUR: i64 = 60 * MILLIS_IN_MINUTE;
const MILLIS_IN_DAY: i64 = 24 * MILLIS_IN_HOUR;
const MILLIS_IN_WEEK: i64 = 7 * MILLIS_IN_DAY;
const MILLIS_IN_MONTH: i64 = 30 * MILLIS_IN_DAY;

/// Scope level a rule applies to.
///
/// Resolution order is fixed: `Default`, then `Method`, then `Api`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LimitTier {
    /// Client-wide limit; always scoped to `GLOBAL`.
    Default,
    /// Limit for one request method (e.g. `GET`).
    Method,
    /// Limit for one API endpoint.
    Api,
}

impl LimitTier {
    /// All tiers in resolution order.
    pub const ALL: [LimitTier; 3] = [LimitTier::Default, LimitTier::Method, LimitTier::Api];

    /// Returns the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitTier::Default => "DEFAULT",
            LimitTier::Method => "METHOD",
            LimitTier::Api => "API",
        }
    }
}

impl fmt::Display for LimitTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LimitTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEFAULT" => Ok(LimitTier::Default),
            "METHOD" => Ok(LimitTier::Method),
            "API" => Ok(LimitTier::Api),
            _ => Err(ValidationError::invalid_format(
                "tier",
                format!("unknown tier '{}'", s),
            )),
        }
    }
}

/// Refill period of a rule: `max_permits` tokens are restored per one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefillUnit {
    Sec,
    Min,
    Hour,
    Day,
    Week,
    /// Fixed 30-day month.
    Month,
}

impl RefillUnit {
    /// Length of one unit in milliseconds.
    pub fn millis(&self) -> i64 {
        match self {
            RefillUnit::Sec => MILLIS_IN_SECOND,
            RefillUnit::Min => MILLIS_IN_MINUTE,
            RefillUnit::Hour => MILLIS_IN_HOUR,
            RefillUnit::Day => MILLIS_IN_DAY,
            RefillUnit::Week => MILLIS_IN_WEEK,
            RefillUnit::Month => MILLIS_IN_MONTH,
        }
    }

    /// Converts a span of milliseconds into (fractional) units.
    pub fn units_in(&self, elapsed_millis: i64) -> f64 {
        elapsed_millis as f64 / self.millis() as f64
    }

    /// Returns the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RefillUnit::Sec => "SEC",
            RefillUnit::Min => "MIN",
            RefillUnit::Hour => "HOUR",
            RefillUnit::Day => "DAY",
            RefillUnit::Week => "WEEK",
            RefillUnit::Month => "MONTH",
        }
    }
}

impl fmt::Display for RefillUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RefillUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SEC" => Ok(RefillUnit::Sec),
            "MIN" => Ok(RefillUnit::Min),
            "HOUR" => Ok(RefillUnit::Hour),
            "DAY" => Ok(RefillUnit::Day),
            "WEEK" => Ok(RefillUnit::Week),
            "MONTH" => Ok(RefillUnit::Month),
            _ => Err(ValidationError::invalid_format(
                "time_unit",
                format!("unknown time unit '{}'", s),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_round_trips_through_str() {
        for tier in LimitTier::ALL {
            assert_eq!(tier.as_str().parse::<LimitTier>().unwrap(), tier);
        }
        assert_eq!("api".parse::<LimitTier>().unwrap(), LimitTier::Api);
        assert!("CUSTOM".parse::<LimitTier>().is_err());
    }

    #[test]
    fn tier_serializes_screaming() {
        assert_eq!(serde_json::to_string(&LimitTier::Api).unwrap(), "\"API\"");
        assert_eq!(
            serde_json::from_str::<LimitTier>("\"DEFAULT\"").unwrap(),
            LimitTier::Default
        );
    }

    #[test]
    fn unit_durations_match_calendar() {
        assert_eq!(RefillUnit::Sec.millis(), 1_000);
        assert_eq!(RefillUnit::Min.millis(), 60_000);
        assert_eq!(RefillUnit::Hour.millis(), 3_600_000);
        assert_eq!(RefillUnit::Day.millis(), 86_400_000);
        assert_eq!(RefillUnit::Week.millis(), 604_800_000);
        assert_eq!(RefillUnit::Month.millis(), 2_592_000_000);
    }

    #[test]
    fn units_in_is_fractional() {
        assert!((RefillUnit::Sec.units_in(500) - 0.5).abs() < f64::EPSILON);
        assert!((RefillUnit::Min.units_in(90_000) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn unit_parses_case_insensitively() {
        assert_eq!("month".parse::<RefillUnit>().unwrap(), RefillUnit::Month);
        assert!("YEAR".parse::<RefillUnit>().is_err());
    }
}

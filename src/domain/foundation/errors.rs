//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error code matching this validation failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::OutOfRange { .. } => ErrorCode::OutOfRange,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        }
    }
}

/// Error codes organized by category.
///
/// Rendered as stable SCREAMING_SNAKE strings at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    OutOfRange,
    InvalidFormat,

    // Not found errors
    ClientNotFound,
    RuleNotFound,

    // Conflict errors
    ClientAlreadyExists,

    // Admission outcomes
    NotConfigured,
    NoLimitsConfigured,
    RateLimited,

    // Coordination errors
    LockTimeout,
    LockFailure,

    // Infrastructure errors
    StoreUnavailable,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::ClientNotFound => "CLIENT_NOT_FOUND",
            ErrorCode::RuleNotFound => "RULE_NOT_FOUND",
            ErrorCode::ClientAlreadyExists => "CLIENT_ALREADY_EXISTS",
            ErrorCode::NotConfigured => "NOT_CONFIGURED",
            ErrorCode::NoLimitsConfigured => "NO_LIMITS_CONFIGURED",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::LockTimeout => "LOCK_TIMEOUT",
            ErrorCode::LockFailure => "LOCK_FAILURE",
            ErrorCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("client_id");
        assert_eq!(format!("{}", err), "Field 'client_id' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("max_permits", 1, 1_000_000, 0);
        assert_eq!(
            format!("{}", err),
            "Field 'max_permits' must be between 1 and 1000000, got 0"
        );
    }

    #[test]
    fn validation_error_invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("scope_name", "must be GLOBAL");
        assert_eq!(
            format!("{}", err),
            "Field 'scope_name' has invalid format: must be GLOBAL"
        );
    }

    #[test]
    fn validation_error_maps_to_code() {
        assert_eq!(ValidationError::empty_field("x").code(), ErrorCode::EmptyField);
        assert_eq!(
            ValidationError::out_of_range("x", 0, 1, 2).code(),
            ErrorCode::OutOfRange
        );
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::ClientNotFound), "CLIENT_NOT_FOUND");
        assert_eq!(format!("{}", ErrorCode::LockTimeout), "LOCK_TIMEOUT");
        assert_eq!(format!("{}", ErrorCode::StoreUnavailable), "STORE_UNAVAILABLE");
    }
}

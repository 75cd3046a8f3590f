//! # Error Types
//!
//! Domain-specific error types for marquee-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  marquee-core errors (this file)                                       │
//! │  ├── CoreError        - Order / line item rule violations              │
//! │  ├── ValidationError  - Form-boundary input failures                   │
//! │  ├── SlotError        - Storage slot I/O (absorbed by CartStore)       │
//! │  └── RateLimited      - Too many attempts, carries retry-after         │
//! │                                                                         │
//! │  marquee-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Server / storefront errors (in apps)                                  │
//! │  └── ApiError, StorefrontError - What the user sees                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed line-item input never reaches this module: the sanitizer absorbs
//! it with defaults. These errors cover the boundaries where input *is*
//! rejected (forms, receipts, submitted orders) and the one recoverable
//! user-facing rejection (rate limiting).

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A serialized line item failed shape validation.
    ///
    /// ## When This Occurs
    /// - Persisted cart element without a UUID id
    /// - Ticket count outside 1..=20 in a submitted order
    /// - Negative unit price
    #[error("Invalid line item: {0}")]
    InvalidLineItem(String),

    /// An order was submitted without any line items.
    #[error("Order has no line items")]
    EmptyOrder,

    /// The declared grand total disagrees with the line items.
    #[error("Grand total {declared} does not match line items ({computed})")]
    TotalMismatch { declared: Money, computed: Money },

    /// Order payload could not be parsed.
    #[error("Malformed order payload: {0}")]
    MalformedOrder(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors raised at form boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email, phone number).
    #[error("{field} is invalid: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Name of the offending field, for attaching the message to a form input.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }

    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid(field: &str, reason: &str) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

// =============================================================================
// Storage Slot Error
// =============================================================================

/// Failure reading or writing the durable cart slot.
///
/// Never propagated past [`crate::cart::CartStore`]; the store logs it and
/// carries on with its in-memory state.
#[derive(Debug, Error)]
pub enum SlotError {
    #[error("Storage slot I/O failed: {0}")]
    Io(String),

    #[error("Storage slot unavailable: {0}")]
    Unavailable(String),

    #[error("Could not encode cart: {0}")]
    Encode(String),
}

impl From<std::io::Error> for SlotError {
    fn from(err: std::io::Error) -> Self {
        SlotError::Io(err.to_string())
    }
}

// =============================================================================
// Rate Limited
// =============================================================================

/// Rejection returned when a key has used up its attempts for the window.
///
/// The display text is meant to be shown to the end user as-is; callers
/// should not retry automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Too many attempts. Please wait {retry_after_secs} seconds before trying again.")]
pub struct RateLimited {
    /// Whole seconds until the window expires (always at least 1).
    pub retry_after_secs: u64,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message() {
        let err = RateLimited {
            retry_after_secs: 42,
        };
        assert_eq!(
            err.to_string(),
            "Too many attempts. Please wait 42 seconds before trying again."
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("email");
        assert_eq!(err.to_string(), "email is required");
        assert_eq!(err.field(), "email");

        let err = ValidationError::TooShort {
            field: "message".to_string(),
            min: 10,
        };
        assert_eq!(err.to_string(), "message must be at least 10 characters");
        assert_eq!(err.field(), "message");
    }

    #[test]
    fn test_total_mismatch_message() {
        let err = CoreError::TotalMismatch {
            declared: Money::from_major(100),
            computed: Money::from_major(200),
        };
        assert_eq!(
            err.to_string(),
            "Grand total ₦100.00 does not match line items (₦200.00)"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("receipt").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

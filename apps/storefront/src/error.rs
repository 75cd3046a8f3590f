//! # Storefront Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ClientError      - talking to apps/server (network, rejected, decode)  │
//! │  StorefrontError  - what a command reports to the user                  │
//! │     ├── Validation / Receipt  (form input)                              │
//! │     ├── RateLimited           (wait N seconds)                          │
//! │     ├── EmptyCart / ItemNotFound                                        │
//! │     ├── Client                (from ClientError)                        │
//! │     └── Config / Io                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use marquee_core::{RateLimited, ValidationError};

/// Message shown when the server failed without saying why.
pub const RETRY_MESSAGE: &str = "Failed to submit. Please try again.";

/// Errors talking to the Marquee server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never got an answer.
    #[error("Network error. Please check your connection and try again.")]
    Network(String),

    /// The server answered with an error body; its text is shown as-is.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The server failed without an error body.
    #[error("{}", RETRY_MESSAGE)]
    Unavailable { status: u16 },

    /// A success response that could not be read.
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Errors surfaced by storefront commands.
#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("{}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    #[error("Receipt rejected: {0}")]
    Receipt(ValidationError),

    #[error(transparent)]
    RateLimited(#[from] RateLimited),

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("No cart item with id {0}")]
    ItemNotFound(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for StorefrontError {
    fn from(err: ValidationError) -> Self {
        StorefrontError::Validation(vec![err])
    }
}

impl From<Vec<ValidationError>> for StorefrontError {
    fn from(errors: Vec<ValidationError>) -> Self {
        StorefrontError::Validation(errors)
    }
}

impl From<toml::de::Error> for StorefrontError {
    fn from(err: toml::de::Error) -> Self {
        StorefrontError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for StorefrontError {
    fn from(err: toml::ser::Error) -> Self {
        StorefrontError::Config(err.to_string())
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type StorefrontResult<T> = Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_shows_server_text() {
        let err = ClientError::Rejected {
            status: 400,
            message: "Invalid order data".into(),
        };
        assert_eq!(err.to_string(), "Invalid order data");
        assert_eq!(
            ClientError::Unavailable { status: 502 }.to_string(),
            RETRY_MESSAGE
        );
    }

    #[test]
    fn test_validation_joins_fields() {
        let err = StorefrontError::Validation(vec![
            ValidationError::Required {
                field: "firstName".into(),
            },
            ValidationError::Required {
                field: "email".into(),
            },
        ]);
        assert_eq!(err.to_string(), "firstName is required; email is required");
    }

    #[test]
    fn test_rate_limited_is_transparent() {
        let err: StorefrontError = RateLimited {
            retry_after_secs: 9,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Too many attempts. Please wait 9 seconds before trying again."
        );
    }
}

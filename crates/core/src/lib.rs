//! Shared primitives for all Rust crates in Fleetdesk.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across Fleetdesk crates.
pub type AppResult<T> = Result<T, AppError>;

/// User-facing message returned for every rejected credential exchange.
pub const AUTHENTICATION_FAILED_MESSAGE: &str =
    "Authentication failed. Please check your credentials.";

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Credential exchange was rejected. Displays only the user-facing message.
    #[error("{0}")]
    Authentication(String),

    /// A remote call could not be completed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Client-local storage refused a write.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds the generic authentication failure shown on the login form.
    #[must_use]
    pub fn authentication_failed() -> Self {
        Self::Authentication(AUTHENTICATION_FAILED_MESSAGE.to_owned())
    }
}

//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. Validation and lookup failures
//! are surfaced to the caller as user-facing messages; storage failures abort the whole
//! mutation because every pipeline runs inside a single database transaction.

use sea_orm::DbErr;
use thiserror::Error;

/// All errors produced by the ledger.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input rejected before any balance computation
    #[error("Invalid input: {message}")]
    Validation {
        /// User-facing description of what is wrong
        message: String,
    },

    /// A referenced person does not exist
    #[error("Person not found: {reference}")]
    PersonNotFound {
        /// The id or name that was looked up
        reference: String,
    },

    /// A referenced purchase does not exist
    #[error("Purchase not found: {id}")]
    PurchaseNotFound {
        /// Purchase id that was looked up
        id: i64,
    },

    /// A referenced payment does not exist
    #[error("Payment not found: {id}")]
    PaymentNotFound {
        /// Payment id that was looked up
        id: i64,
    },

    /// The purchase changed between the caller loading it and submitting an update
    #[error("Purchase {id} was modified by someone else (expected version {expected}, found {found})")]
    VersionConflict {
        /// Purchase id
        id: i64,
        /// Version the caller based its edit on
        expected: i32,
        /// Version currently stored
        found: i32,
    },

    /// The caller is not allowed to change the ledger
    #[error("User {user_id} is not allowed to edit the ledger")]
    Unauthorized {
        /// Discord user id of the caller
        user_id: String,
    },

    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Persistence failure from the underlying store
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Missing or unreadable environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Failure while building a response message
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework error
    #[error("Discord framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than the system.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::PersonNotFound { .. }
                | Self::PurchaseNotFound { .. }
                | Self::PaymentNotFound { .. }
                | Self::VersionConflict { .. }
                | Self::Unauthorized { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let err = Error::validation("Name must not be empty");
        assert_eq!(err.to_string(), "Invalid input: Name must not be empty");
        assert!(err.is_user_error());
    }

    #[test]
    fn test_database_error_is_not_user_error() {
        let err = Error::from(DbErr::Custom("disk full".to_string()));
        assert!(!err.is_user_error());
        assert!(err.to_string().contains("disk full"));
    }
}

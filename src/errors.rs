//! Unified error types for the `TollTag` crate.
//!
//! Workflow-local error taxonomies (`ValidationError`, `UpdateError`,
//! `WorkflowError`) live next to the modules that produce them; this module
//! holds the crate-wide error used by everything else.

use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Database-level failure surfaced by SeaORM
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Amount failed a domain check (non-positive, non-finite)
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: f64,
    },

    /// Vehicle number already registered for this owner
    #[error("Vehicle {number} is already registered")]
    DuplicateVehicle {
        /// The duplicate vehicle number
        number: String,
    },

    /// Email already has an account
    #[error("An account already exists for {email}")]
    EmailTaken {
        /// The duplicate email address
        email: String,
    },

    /// Sign-in failed; deliberately does not say whether email or password was wrong
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Password hashing or verification failure
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

// Convenience `Result` type
/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

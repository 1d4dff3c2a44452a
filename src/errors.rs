//! Unified error type for the cost estimator.
//!
//! Every fallible operation in the crate returns [`Result`]. Lookups of missing
//! reference data, missing owners, store failures and reorder failures each have
//! their own variants so callers can decide what to show the user.

use thiserror::Error;

/// All errors produced by the library and the bot.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// User input failed validation (empty name, unknown category, ...).
    #[error("Invalid input: {message}")]
    Validation {
        /// What was rejected
        message: String,
    },

    /// A cost was negative, NaN or infinite.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// The requested life stage does not exist in the rate table.
    #[error("Life stage not found: {name}")]
    LifeStageNotFound {
        /// Life stage name that was looked up
        name: String,
    },

    /// A rate row required by the input combination is missing.
    #[error("Rate not found: {what}")]
    RateNotFound {
        /// Description of the missing row
        what: String,
    },

    /// The estimate does not exist or belongs to another owner.
    #[error("Estimate not found: {id}")]
    EstimateNotFound {
        /// Estimate id
        id: i64,
    },

    /// The expense does not exist or belongs to another owner.
    #[error("Expense not found: {id}")]
    ExpenseNotFound {
        /// Expense id
        id: i64,
    },

    /// A mutating operation needs an owner and none was resolved.
    #[error("Authentication required")]
    Unauthenticated,

    /// The atomic reorder operation failed; nothing was changed.
    #[error("Reorder failed: {message}")]
    Ordering {
        /// Why the reorder was rejected
        message: String,
    },

    /// The backing store rejected a query.
    #[error("Persistence error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Formatting a reply failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Stored JSON could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

//! services/store/src/error.rs
//!
//! Defines the primary error type for the store service.

use crate::config::ConfigError;

/// The primary error type for the `store` service.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

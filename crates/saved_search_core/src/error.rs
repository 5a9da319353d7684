//! crates/saved_search_core/src/error.rs
//!
//! Errors raised while building or decoding a saved search record.

use chrono::{DateTime, Utc};

/// An error produced by record construction or by the row codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// A stored value could not be decoded into the field's type,
    /// e.g. a `Scope` string that names no known scope.
    #[error("Cannot decode column {column}: {value:?}")]
    Decoding { column: &'static str, value: String },

    /// A required column is absent or NULL.
    #[error("Missing required column {0}")]
    MissingField(&'static str),

    /// A required string column is empty.
    #[error("Column {0} must not be empty")]
    EmptyField(&'static str),

    #[error("CreatedAt ({created_at}) is later than UpdatedAt ({updated_at})")]
    TimestampOrder {
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },
}

/// A convenience type alias for `Result<T, RecordError>`.
pub type RecordResult<T> = Result<T, RecordError>;

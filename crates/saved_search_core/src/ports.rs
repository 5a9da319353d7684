//! crates/saved_search_core/src/ports.rs
//!
//! Defines the persistence contract for saved searches.
//! Concrete stores (Postgres, in-memory) live in the `store` service and
//! implement this trait, keeping the core independent of any driver.

use async_trait::async_trait;

use crate::domain::{NewSavedSearch, SavedSearch, SavedSearchUpdate};
use crate::error::RecordError;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A record failed validation or could not be decoded from its stored row.
    #[error("Invalid record: {0}")]
    Record(#[from] RecordError),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Repository Port
//=========================================================================================

#[async_trait]
pub trait SavedSearchRepository: Send + Sync {
    /// Stores a new saved search under a freshly generated ID, with both
    /// timestamps set to the current time.
    async fn create(&self, new_search: NewSavedSearch) -> PortResult<SavedSearch>;

    async fn get(&self, id: &str) -> PortResult<SavedSearch>;

    /// Applies an edit and bumps `UpdatedAt`. Returns the stored result.
    async fn update(&self, id: &str, update: SavedSearchUpdate) -> PortResult<SavedSearch>;

    /// Removes the row for good.
    async fn delete(&self, id: &str) -> PortResult<()>;

    /// All searches written by one author, oldest first.
    async fn list_by_author(&self, author_id: &str) -> PortResult<Vec<SavedSearch>>;
}

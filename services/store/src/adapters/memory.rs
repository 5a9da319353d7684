//! services/store/src/adapters/memory.rs
//!
//! An in-process implementation of the `SavedSearchRepository` port.
//! Records are kept in their encoded row form, so every read goes through
//! the same decoding path as the Postgres adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use saved_search_core::domain::{NewSavedSearch, SavedSearch, SavedSearchUpdate};
use saved_search_core::ports::{PortError, PortResult, SavedSearchRepository};
use saved_search_core::row::{columns, Row, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemorySavedSearchAdapter {
    rows: RwLock<HashMap<String, Row>>,
}

impl InMemorySavedSearchAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw row as-is, keyed by its `ID` column. Used to load data
    /// that did not go through `create`.
    pub async fn insert_row(&self, row: Row) -> PortResult<()> {
        let id = match row.get(columns::ID) {
            Some(Value::String(id)) => id.clone(),
            _ => return Err(PortError::Unexpected("row has no usable ID".to_string())),
        };
        self.rows.write().await.insert(id, row);
        Ok(())
    }

    fn not_found(id: &str) -> PortError {
        PortError::NotFound(format!("Saved search {} not found", id))
    }
}

#[async_trait]
impl SavedSearchRepository for InMemorySavedSearchAdapter {
    async fn create(&self, new_search: NewSavedSearch) -> PortResult<SavedSearch> {
        let search = new_search.into_record(Uuid::new_v4().to_string(), Utc::now())?;
        self.rows
            .write()
            .await
            .insert(search.id.clone(), search.to_row());
        debug!(id = %search.id, "Saved search created in memory");
        Ok(search)
    }

    async fn get(&self, id: &str) -> PortResult<SavedSearch> {
        let rows = self.rows.read().await;
        let row = rows.get(id).ok_or_else(|| Self::not_found(id))?;
        Ok(SavedSearch::from_row(row)?)
    }

    async fn update(&self, id: &str, update: SavedSearchUpdate) -> PortResult<SavedSearch> {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(id).ok_or_else(|| Self::not_found(id))?;

        let mut search = SavedSearch::from_row(row)?;
        search.apply_update(update, Utc::now())?;
        *row = search.to_row();
        Ok(search)
    }

    async fn delete(&self, id: &str) -> PortResult<()> {
        self.rows
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }

    async fn list_by_author(&self, author_id: &str) -> PortResult<Vec<SavedSearch>> {
        let rows = self.rows.read().await;
        let mut searches = Vec::new();
        for row in rows.values() {
            if row.get(columns::AUTHOR_ID) != Some(&Value::from(author_id)) {
                continue;
            }
            match SavedSearch::from_row(row) {
                Ok(search) => searches.push(search),
                Err(e) => {
                    warn!(author_id, error = %e, "Stored saved search failed to decode");
                    return Err(e.into());
                }
            }
        }
        searches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(searches)
    }
}

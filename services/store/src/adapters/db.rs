//! services/store/src/adapters/db.rs
//!
//! The Postgres adapter, the concrete implementation of the
//! `SavedSearchRepository` port. Every fetched row is copied into the core
//! `Row` format and decoded there, so scope and NULL handling match the
//! in-memory adapter exactly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use saved_search_core::domain::{NewSavedSearch, SavedSearch, SavedSearchUpdate, SAVED_SEARCHES_TABLE};
use saved_search_core::ports::{PortError, PortResult, SavedSearchRepository};
use saved_search_core::row::{columns, Row, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row as _};
use tracing::{debug, info};
use uuid::Uuid;

const TEXT_COLUMNS: [&str; 6] = [
    columns::ID,
    columns::NAME,
    columns::DESCRIPTION,
    columns::QUERY,
    columns::SCOPE,
    columns::AUTHOR_ID,
];
const TIMESTAMP_COLUMNS: [&str; 2] = [columns::CREATED_AT, columns::UPDATED_AT];

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `SavedSearchRepository` port.
#[derive(Clone)]
pub struct PgSavedSearchAdapter {
    pool: PgPool,
}

impl PgSavedSearchAdapter {
    /// Creates a new `PgSavedSearchAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reads every stored row without decoding it.
    pub async fn fetch_all_rows(&self) -> Result<Vec<Row>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM \"{}\" ORDER BY \"{}\" ASC",
            select_list(),
            SAVED_SEARCHES_TABLE,
            columns::CREATED_AT
        );
        let records = sqlx::query(&sql).fetch_all(&self.pool).await?;
        records.iter().map(to_store_row).collect()
    }
}

//=========================================================================================
// Row Translation
//=========================================================================================

/// The quoted column list used by every SELECT and RETURNING clause.
fn select_list() -> String {
    columns::ALL
        .iter()
        .map(|column| format!("\"{}\"", column))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Oldest first; ties on `CreatedAt` fall back to `ID`, as in the in-memory adapter.
fn list_by_author_sql() -> String {
    format!(
        "SELECT {} FROM \"{}\" WHERE \"{}\" = $1 ORDER BY \"{}\" ASC, \"{}\" ASC",
        select_list(),
        SAVED_SEARCHES_TABLE,
        columns::AUTHOR_ID,
        columns::CREATED_AT,
        columns::ID
    )
}

/// Copies a driver row into the core row format. Columns the query did not
/// return stay absent; SQL NULLs become `Value::Null`.
fn to_store_row(record: &PgRow) -> Result<Row, sqlx::Error> {
    let mut row = Row::new();
    for column in TEXT_COLUMNS {
        match record.try_get::<Option<String>, _>(column) {
            Ok(value) => {
                row.set(column, value);
            }
            Err(sqlx::Error::ColumnNotFound(_)) => {}
            Err(e) => return Err(e),
        }
    }
    for column in TIMESTAMP_COLUMNS {
        match record.try_get::<Option<DateTime<Utc>>, _>(column) {
            Ok(value) => {
                row.set(column, value.map_or(Value::Null, Value::Timestamp));
            }
            Err(sqlx::Error::ColumnNotFound(_)) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(row)
}

fn decode(record: &PgRow) -> PortResult<SavedSearch> {
    let row = to_store_row(record).map_err(|e| PortError::Unexpected(e.to_string()))?;
    Ok(SavedSearch::from_row(&row)?)
}

fn not_found_or_unexpected(id: &str) -> impl FnOnce(sqlx::Error) -> PortError + '_ {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(format!("Saved search {} not found", id)),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `SavedSearchRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl SavedSearchRepository for PgSavedSearchAdapter {
    async fn create(&self, new_search: NewSavedSearch) -> PortResult<SavedSearch> {
        let search = new_search.into_record(Uuid::new_v4().to_string(), Utc::now())?;
        let sql = format!(
            "INSERT INTO \"{}\" ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {cols}",
            SAVED_SEARCHES_TABLE,
            cols = select_list()
        );
        let record = sqlx::query(&sql)
            .bind(&search.id)
            .bind(&search.name)
            .bind(&search.description)
            .bind(&search.query)
            .bind(search.scope.as_str())
            .bind(&search.author_id)
            .bind(search.created_at)
            .bind(search.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        info!(id = %search.id, author_id = %search.author_id, "Saved search created");
        decode(&record)
    }

    async fn get(&self, id: &str) -> PortResult<SavedSearch> {
        let sql = format!(
            "SELECT {} FROM \"{}\" WHERE \"{}\" = $1",
            select_list(),
            SAVED_SEARCHES_TABLE,
            columns::ID
        );
        let record = sqlx::query(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_or_unexpected(id))?;
        decode(&record)
    }

    async fn update(&self, id: &str, update: SavedSearchUpdate) -> PortResult<SavedSearch> {
        let mut search = self.get(id).await?;
        search.apply_update(update, Utc::now())?;

        let sql = format!(
            "UPDATE \"{table}\" SET \"{name}\" = $1, \"{description}\" = $2, \"{query}\" = $3, \
             \"{scope}\" = $4, \"{updated_at}\" = $5 WHERE \"{id}\" = $6 RETURNING {cols}",
            table = SAVED_SEARCHES_TABLE,
            name = columns::NAME,
            description = columns::DESCRIPTION,
            query = columns::QUERY,
            scope = columns::SCOPE,
            updated_at = columns::UPDATED_AT,
            id = columns::ID,
            cols = select_list()
        );
        let record = sqlx::query(&sql)
            .bind(&search.name)
            .bind(&search.description)
            .bind(&search.query)
            .bind(search.scope.as_str())
            .bind(search.updated_at)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_or_unexpected(id))?;

        debug!(id, "Saved search updated");
        decode(&record)
    }

    async fn delete(&self, id: &str) -> PortResult<()> {
        let sql = format!(
            "DELETE FROM \"{}\" WHERE \"{}\" = $1",
            SAVED_SEARCHES_TABLE,
            columns::ID
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Saved search {} not found", id)));
        }
        info!(id, "Saved search deleted");
        Ok(())
    }

    async fn list_by_author(&self, author_id: &str) -> PortResult<Vec<SavedSearch>> {
        let sql = list_by_author_sql();
        let records = sqlx::query(&sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.iter().map(decode).collect()
    }
}

//! services/store/src/bin/verify.rs
//!
//! Scans the `SavedSearches` table and decodes every row, reporting the
//! rows that no longer decode (unknown scope, missing columns, broken
//! timestamps). Exits with an error if any row fails.

use saved_search_core::domain::SavedSearch;
use saved_search_core::row::{columns, Value};
use sqlx::postgres::PgPoolOptions;
use store_lib::{adapters::PgSavedSearchAdapter, config::Config, error::StoreError};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), StoreError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded.");

    // --- 2. Connect to Database ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    let adapter = PgSavedSearchAdapter::new(db_pool);

    // --- 3. Decode Every Row ---
    let rows = adapter.fetch_all_rows().await?;
    let mut failures = 0usize;
    for row in &rows {
        match SavedSearch::from_row(row) {
            Ok(search) => {
                let json = serde_json::to_string(&search)
                    .map_err(|e| StoreError::Internal(e.to_string()))?;
                debug!(record = %json, "Row decoded");
            }
            Err(e) => {
                failures += 1;
                let id = match row.get(columns::ID) {
                    Some(Value::String(id)) => id.as_str(),
                    _ => "<no id>",
                };
                error!(id, error = %e, "Row failed to decode");
            }
        }
    }

    info!(total = rows.len(), failures, "Scan complete.");
    if failures > 0 {
        return Err(StoreError::Internal(format!(
            "{} of {} saved searches failed to decode",
            failures,
            rows.len()
        )));
    }
    Ok(())
}

//! crates/saved_search_core/src/row.rs
//!
//! The store row format: a saved search as a set of named columns.
//! Adapters translate their driver's rows into a [`Row`] and back, so
//! column naming and decoding rules live in one place.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::{SavedSearch, SavedSearchScope};
use crate::error::{RecordError, RecordResult};

/// Column names of the `SavedSearches` table.
pub mod columns {
    pub const ID: &str = "ID";
    pub const NAME: &str = "Name";
    pub const DESCRIPTION: &str = "Description";
    pub const QUERY: &str = "Query";
    pub const SCOPE: &str = "Scope";
    pub const AUTHOR_ID: &str = "AuthorID";
    pub const CREATED_AT: &str = "CreatedAt";
    pub const UPDATED_AT: &str = "UpdatedAt";

    /// All columns in table order.
    pub const ALL: [&str; 8] = [
        ID,
        NAME,
        DESCRIPTION,
        QUERY,
        SCOPE,
        AUTHOR_ID,
        CREATED_AT,
        UPDATED_AT,
    ];
}

//=========================================================================================
// Column Values and Rows
//=========================================================================================

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    String(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    fn describe(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::String(s) => s.clone(),
            Value::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map_or(Value::Null, Value::String)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

/// A row keyed by column name. A column that was never set is "absent",
/// which is different from a column holding [`Value::Null`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column, replacing any previous value.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.cells.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.cells.remove(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    // --- Typed readers ---

    fn required_string(&self, column: &'static str) -> RecordResult<String> {
        match self.get(column) {
            None | Some(Value::Null) => Err(RecordError::MissingField(column)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(RecordError::Decoding {
                column,
                value: other.describe(),
            }),
        }
    }

    fn optional_string(&self, column: &'static str) -> RecordResult<Option<String>> {
        match self.get(column) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(RecordError::Decoding {
                column,
                value: other.describe(),
            }),
        }
    }

    fn required_timestamp(&self, column: &'static str) -> RecordResult<DateTime<Utc>> {
        match self.get(column) {
            None | Some(Value::Null) => Err(RecordError::MissingField(column)),
            Some(Value::Timestamp(ts)) => Ok(*ts),
            Some(other) => Err(RecordError::Decoding {
                column,
                value: other.describe(),
            }),
        }
    }
}

//=========================================================================================
// SavedSearch <-> Row
//=========================================================================================

impl SavedSearch {
    /// Encodes the record as a row with every column present.
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.set(columns::ID, self.id.as_str())
            .set(columns::NAME, self.name.as_str())
            .set(columns::DESCRIPTION, self.description.clone())
            .set(columns::QUERY, self.query.as_str())
            .set(columns::SCOPE, self.scope.as_str())
            .set(columns::AUTHOR_ID, self.author_id.as_str())
            .set(columns::CREATED_AT, self.created_at)
            .set(columns::UPDATED_AT, self.updated_at);
        row
    }

    /// Decodes a row. Unknown extra columns are ignored.
    ///
    /// Fails with [`RecordError::MissingField`] when a required column is
    /// absent or NULL, and with [`RecordError::Decoding`] when the scope is
    /// unknown or a cell holds the wrong kind of value.
    pub fn from_row(row: &Row) -> RecordResult<Self> {
        let scope = row
            .required_string(columns::SCOPE)?
            .parse::<SavedSearchScope>()?;
        let search = SavedSearch {
            id: row.required_string(columns::ID)?,
            name: row.required_string(columns::NAME)?,
            description: row.optional_string(columns::DESCRIPTION)?,
            query: row.required_string(columns::QUERY)?,
            scope,
            author_id: row.required_string(columns::AUTHOR_ID)?,
            created_at: row.required_timestamp(columns::CREATED_AT)?,
            updated_at: row.required_timestamp(columns::UPDATED_AT)?,
        };
        search.validate()?;
        Ok(search)
    }
}

impl From<&SavedSearch> for Row {
    fn from(search: &SavedSearch) -> Self {
        search.to_row()
    }
}

impl TryFrom<&Row> for SavedSearch {
    type Error = RecordError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        SavedSearch::from_row(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        // Sub-microsecond part checks that nothing truncates the timestamp.
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + chrono::Duration::nanoseconds(123_456_789)
    }

    fn sample(description: Option<String>) -> SavedSearch {
        SavedSearch::new(
            "s1",
            "My Search",
            description,
            "group:css",
            SavedSearchScope::UserPublic,
            "u1",
            t0(),
            t0(),
        )
        .unwrap()
    }

    #[test]
    fn round_trips_the_reference_record() {
        let search = sample(None);
        let row = search.to_row();

        assert_eq!(row.get(columns::DESCRIPTION), Some(&Value::Null));
        assert_eq!(SavedSearch::from_row(&row).unwrap(), search);
    }

    #[test]
    fn keeps_empty_and_missing_descriptions_apart() {
        let empty = sample(Some(String::new()));
        let decoded = SavedSearch::from_row(&empty.to_row()).unwrap();
        assert_eq!(decoded.description, Some(String::new()));

        let with_text = sample(Some("frontend".to_string()));
        let decoded = SavedSearch::from_row(&with_text.to_row()).unwrap();
        assert_eq!(decoded.description.as_deref(), Some("frontend"));
    }

    #[test]
    fn absent_description_column_decodes_to_none() {
        let mut row = sample(Some("x".to_string())).to_row();
        row.remove(columns::DESCRIPTION);
        assert_eq!(SavedSearch::from_row(&row).unwrap().description, None);
    }

    #[test]
    fn encodes_every_column_with_exact_scope_string() {
        let row = sample(None).to_row();
        let present: Vec<&str> = row.columns().collect();
        let mut expected = columns::ALL.to_vec();
        expected.sort_unstable();
        assert_eq!(present, expected);
        assert_eq!(row.get(columns::SCOPE), Some(&Value::from("USER_PUBLIC")));
    }

    #[test]
    fn preserves_nanosecond_timestamps() {
        let search = sample(None);
        let decoded = SavedSearch::from_row(&search.to_row()).unwrap();
        assert_eq!(decoded.created_at.timestamp_subsec_nanos(), 123_456_789);
        assert_eq!(decoded.updated_at, search.updated_at);
    }

    #[test]
    fn unknown_scope_is_a_decoding_error() {
        let mut row = sample(None).to_row();
        row.set(columns::SCOPE, "ORG_PRIVATE");
        assert_eq!(
            SavedSearch::from_row(&row).unwrap_err(),
            RecordError::Decoding {
                column: columns::SCOPE,
                value: "ORG_PRIVATE".to_string()
            }
        );
    }

    #[test]
    fn missing_required_columns_are_reported() {
        for column in [
            columns::ID,
            columns::NAME,
            columns::QUERY,
            columns::SCOPE,
            columns::AUTHOR_ID,
            columns::CREATED_AT,
            columns::UPDATED_AT,
        ] {
            let mut row = sample(None).to_row();
            row.remove(column);
            assert_eq!(
                SavedSearch::from_row(&row).unwrap_err(),
                RecordError::MissingField(column)
            );

            let mut row = sample(None).to_row();
            row.set(column, Value::Null);
            assert_eq!(
                SavedSearch::from_row(&row).unwrap_err(),
                RecordError::MissingField(column)
            );
        }
    }

    #[test]
    fn wrong_cell_type_is_a_decoding_error() {
        let mut row = sample(None).to_row();
        row.set(columns::CREATED_AT, "yesterday");
        assert_eq!(
            SavedSearch::from_row(&row).unwrap_err(),
            RecordError::Decoding {
                column: columns::CREATED_AT,
                value: "yesterday".to_string()
            }
        );
    }

    #[test]
    fn stored_rows_must_keep_timestamp_order() {
        let mut row = sample(None).to_row();
        row.set(columns::UPDATED_AT, t0() - chrono::Duration::seconds(1));
        assert!(matches!(
            SavedSearch::from_row(&row),
            Err(RecordError::TimestampOrder { .. })
        ));
    }

    #[test]
    fn extra_columns_are_ignored() {
        let search = sample(None);
        let mut row = search.to_row();
        row.set("Unrelated", "value");
        assert_eq!(SavedSearch::try_from(&row).unwrap(), search);
    }
}

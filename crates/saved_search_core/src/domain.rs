//! crates/saved_search_core/src/domain.rs
//!
//! Defines the core data structures for saved searches.
//! The serde attributes pin each field to its column name in the
//! `SavedSearches` table, so the JSON shape and the row shape agree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RecordError, RecordResult};
use crate::row::columns;

/// Name of the table (collection) holding saved searches.
pub const SAVED_SEARCHES_TABLE: &str = "SavedSearches";

//=========================================================================================
// Scope
//=========================================================================================

/// Visibility of a saved search.
///
/// Each member is stored as a fixed string, never as an ordinal, so adding
/// members later does not change the meaning of rows already written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SavedSearchScope {
    /// Created by a user and publicly readable.
    #[serde(rename = "USER_PUBLIC")]
    UserPublic,
}

impl SavedSearchScope {
    /// Every known scope, in declaration order.
    pub const ALL: [SavedSearchScope; 1] = [SavedSearchScope::UserPublic];

    /// The exact string stored in the `Scope` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SavedSearchScope::UserPublic => "USER_PUBLIC",
        }
    }
}

impl fmt::Display for SavedSearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SavedSearchScope {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| RecordError::Decoding {
                column: columns::SCOPE,
                value: s.to_string(),
            })
    }
}

//=========================================================================================
// SavedSearch
//=========================================================================================

/// One saved search authored by a user; a single row of `SavedSearches`.
///
/// Deserializing checks the same invariants as [`SavedSearch::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SavedSearchFields")]
pub struct SavedSearch {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    /// A query expression in the search grammar; opaque here.
    #[serde(rename = "Query")]
    pub query: String,
    #[serde(rename = "Scope")]
    pub scope: SavedSearchScope,
    /// The user who created the search. Not checked against any user table.
    #[serde(rename = "AuthorID")]
    pub author_id: String,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// The unchecked JSON shape of a [`SavedSearch`].
#[derive(Deserialize)]
struct SavedSearchFields {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Query")]
    query: String,
    #[serde(rename = "Scope")]
    scope: SavedSearchScope,
    #[serde(rename = "AuthorID")]
    author_id: String,
    #[serde(rename = "CreatedAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    updated_at: DateTime<Utc>,
}

impl TryFrom<SavedSearchFields> for SavedSearch {
    type Error = RecordError;

    fn try_from(fields: SavedSearchFields) -> Result<Self, Self::Error> {
        SavedSearch::new(
            fields.id,
            fields.name,
            fields.description,
            fields.query,
            fields.scope,
            fields.author_id,
            fields.created_at,
            fields.updated_at,
        )
    }
}

impl SavedSearch {
    /// Builds a record from its field values, rejecting empty identifiers,
    /// an empty name or query, and an `updated_at` earlier than `created_at`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        query: impl Into<String>,
        scope: SavedSearchScope,
        author_id: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> RecordResult<Self> {
        let search = Self {
            id: id.into(),
            name: name.into(),
            description,
            query: query.into(),
            scope,
            author_id: author_id.into(),
            created_at,
            updated_at,
        };
        search.validate()?;
        Ok(search)
    }

    /// Checks the invariants every persisted record must hold.
    pub fn validate(&self) -> RecordResult<()> {
        non_empty(columns::ID, &self.id)?;
        non_empty(columns::NAME, &self.name)?;
        non_empty(columns::QUERY, &self.query)?;
        non_empty(columns::AUTHOR_ID, &self.author_id)?;
        if self.created_at > self.updated_at {
            return Err(RecordError::TimestampOrder {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    /// Applies an edit and moves `updated_at` to `now`.
    ///
    /// `updated_at` never goes below `created_at`, even if `now` does. Nothing
    /// is changed when the edit would leave the name or query empty.
    pub fn apply_update(&mut self, update: SavedSearchUpdate, now: DateTime<Utc>) -> RecordResult<()> {
        if let Some(name) = &update.name {
            non_empty(columns::NAME, name)?;
        }
        if let Some(query) = &update.query {
            non_empty(columns::QUERY, query)?;
        }

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(query) = update.query {
            self.query = query;
        }
        if let Some(scope) = update.scope {
            self.scope = scope;
        }
        self.updated_at = now.max(self.created_at);
        Ok(())
    }
}

fn non_empty(column: &'static str, value: &str) -> RecordResult<()> {
    if value.is_empty() {
        return Err(RecordError::EmptyField(column));
    }
    Ok(())
}

//=========================================================================================
// Write-path payloads
//=========================================================================================

/// The user-supplied part of a saved search, before it has an ID or timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSavedSearch {
    pub name: String,
    pub description: Option<String>,
    pub query: String,
    pub scope: SavedSearchScope,
    pub author_id: String,
}

impl NewSavedSearch {
    /// Turns the payload into a record created (and last updated) at `now`.
    pub fn into_record(self, id: impl Into<String>, now: DateTime<Utc>) -> RecordResult<SavedSearch> {
        SavedSearch::new(
            id,
            self.name,
            self.description,
            self.query,
            self.scope,
            self.author_id,
            now,
            now,
        )
    }
}

/// An edit to the mutable fields of a saved search. `None` leaves a field as is;
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedSearchUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub query: Option<String>,
    pub scope: Option<SavedSearchScope>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn sample() -> SavedSearch {
        SavedSearch::new(
            "s1",
            "My Search",
            None,
            "group:css",
            SavedSearchScope::UserPublic,
            "u1",
            t0(),
            t0(),
        )
        .unwrap()
    }

    #[test]
    fn new_keeps_every_field() {
        let created = t0();
        let updated = t0() + Duration::minutes(5);
        let search = SavedSearch::new(
            "s1",
            "My Search",
            Some("css things".to_string()),
            "group:css",
            SavedSearchScope::UserPublic,
            "u1",
            created,
            updated,
        )
        .unwrap();

        assert_eq!(search.id, "s1");
        assert_eq!(search.name, "My Search");
        assert_eq!(search.description.as_deref(), Some("css things"));
        assert_eq!(search.query, "group:css");
        assert_eq!(search.scope, SavedSearchScope::UserPublic);
        assert_eq!(search.author_id, "u1");
        assert_eq!(search.created_at, created);
        assert_eq!(search.updated_at, updated);
    }

    #[test]
    fn new_rejects_empty_identifiers() {
        let err = SavedSearch::new("", "n", None, "q", SavedSearchScope::UserPublic, "u1", t0(), t0())
            .unwrap_err();
        assert_eq!(err, RecordError::EmptyField(columns::ID));

        let err = SavedSearch::new("s1", "n", None, "q", SavedSearchScope::UserPublic, "", t0(), t0())
            .unwrap_err();
        assert_eq!(err, RecordError::EmptyField(columns::AUTHOR_ID));

        let err = SavedSearch::new("s1", "", None, "q", SavedSearchScope::UserPublic, "u1", t0(), t0())
            .unwrap_err();
        assert_eq!(err, RecordError::EmptyField(columns::NAME));

        let err = SavedSearch::new("s1", "n", None, "", SavedSearchScope::UserPublic, "u1", t0(), t0())
            .unwrap_err();
        assert_eq!(err, RecordError::EmptyField(columns::QUERY));
    }

    #[test]
    fn new_rejects_updated_before_created() {
        let err = SavedSearch::new(
            "s1",
            "n",
            None,
            "q",
            SavedSearchScope::UserPublic,
            "u1",
            t0(),
            t0() - Duration::seconds(1),
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::TimestampOrder { .. }));
    }

    #[test]
    fn scope_uses_its_pinned_string() {
        assert_eq!(SavedSearchScope::UserPublic.as_str(), "USER_PUBLIC");
        assert_eq!(SavedSearchScope::UserPublic.to_string(), "USER_PUBLIC");
        assert_eq!(
            "USER_PUBLIC".parse::<SavedSearchScope>().unwrap(),
            SavedSearchScope::UserPublic
        );
    }

    #[test]
    fn scope_parse_is_exact() {
        for bad in ["user_public", "UserPublic", "", "USER_PRIVATE"] {
            let err = bad.parse::<SavedSearchScope>().unwrap_err();
            assert_eq!(
                err,
                RecordError::Decoding {
                    column: columns::SCOPE,
                    value: bad.to_string()
                }
            );
        }
    }

    #[test]
    fn json_uses_column_names() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let mut expected = columns::ALL.to_vec();
        expected.sort_unstable();
        assert_eq!(keys, expected);

        assert_eq!(object["Scope"], "USER_PUBLIC");
        assert!(object["Description"].is_null());
    }

    #[test]
    fn json_rejects_unknown_scope() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["Scope"] = serde_json::Value::from("ORG_PRIVATE");
        assert!(serde_json::from_value::<SavedSearch>(value).is_err());
    }

    #[test]
    fn json_round_trips() {
        let search = sample();
        let json = serde_json::to_string(&search).unwrap();
        assert_eq!(serde_json::from_str::<SavedSearch>(&json).unwrap(), search);
    }

    #[test]
    fn json_rejects_empty_id() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["ID"] = serde_json::Value::from("");
        let err = serde_json::from_value::<SavedSearch>(value).unwrap_err();
        assert!(err.to_string().contains("ID must not be empty"));
    }

    #[test]
    fn json_rejects_updated_before_created() {
        let json = r#"{
            "ID": "s1",
            "Name": "My Search",
            "Description": null,
            "Query": "group:css",
            "Scope": "USER_PUBLIC",
            "AuthorID": "u1",
            "CreatedAt": "2024-05-02T00:00:00Z",
            "UpdatedAt": "2024-05-01T00:00:00Z"
        }"#;
        let err = serde_json::from_str::<SavedSearch>(json).unwrap_err();
        assert!(err.to_string().contains("is later than UpdatedAt"));
    }

    #[test]
    fn apply_update_bumps_updated_at() {
        let mut search = sample();
        let later = t0() + Duration::hours(1);
        search
            .apply_update(
                SavedSearchUpdate {
                    name: Some("Renamed".to_string()),
                    description: Some(Some(String::new())),
                    ..Default::default()
                },
                later,
            )
            .unwrap();

        assert_eq!(search.name, "Renamed");
        assert_eq!(search.description, Some(String::new()));
        assert_eq!(search.query, "group:css");
        assert_eq!(search.created_at, t0());
        assert_eq!(search.updated_at, later);
    }

    #[test]
    fn apply_update_never_moves_before_created_at() {
        let mut search = sample();
        search
            .apply_update(SavedSearchUpdate::default(), t0() - Duration::days(1))
            .unwrap();
        assert_eq!(search.updated_at, search.created_at);
    }

    #[test]
    fn apply_update_rejects_empty_query_without_changes() {
        let mut search = sample();
        let err = search
            .apply_update(
                SavedSearchUpdate {
                    name: Some("Renamed".to_string()),
                    query: Some(String::new()),
                    ..Default::default()
                },
                t0() + Duration::hours(1),
            )
            .unwrap_err();

        assert_eq!(err, RecordError::EmptyField(columns::QUERY));
        assert_eq!(search, sample());
    }

    #[test]
    fn description_clears_with_some_none() {
        let mut search = sample();
        search.description = Some("old".to_string());
        search
            .apply_update(
                SavedSearchUpdate {
                    description: Some(None),
                    ..Default::default()
                },
                t0(),
            )
            .unwrap();
        assert_eq!(search.description, None);
    }
}

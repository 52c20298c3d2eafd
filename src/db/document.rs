//! Document store abstraction
//!
//! Every user-owned record lives in a keyed JSON document inside one of a few
//! collections. Stores only need keyed reads and writes, equality-filtered
//! queries and a versioned compare-and-set; no joins.
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt::Display;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    UserViews,
    Watchlist,
    Favorites,
    Reviews,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::UserViews => "userViews",
            Collection::Watchlist => "watchlist",
            Collection::Favorites => "favorites",
            Collection::Reviews => "reviews",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored document with its id and write version
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    /// Starts at 1 and grows by one on every write
    pub version: u64,
    pub body: Value,
}

impl Document {
    /// Deserializes the body into a typed record
    pub fn decode<T: DeserializeOwned>(&self) -> AppResult<T> {
        serde_json::from_value(self.body.clone()).map_err(|e| {
            AppError::Internal(format!("Malformed document {}: {}", self.id, e))
        })
    }
}

/// Top-level field equality condition
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: &'static str,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// Whether a document body satisfies this condition
    pub fn matches(&self, body: &Value) -> bool {
        body.get(self.field) == Some(&self.value)
    }
}

/// Sort on a timestamp-valued top-level field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: &'static str,
    pub descending: bool,
}

impl OrderBy {
    pub fn desc(field: &'static str) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

/// Shallow-merges `patch` into `target`: top-level keys in the patch replace
/// the target's, everything else is kept.
pub fn merge_top_level(target: &mut Value, patch: Value) {
    match (target.as_object_mut(), patch) {
        (Some(existing), Value::Object(fields)) => {
            for (key, value) in fields {
                existing.insert(key, value);
            }
        }
        (_, patch) => *target = patch,
    }
}

/// Builds a JSON object from field/value pairs, dropping `None`s
pub fn object_without_nulls(fields: Vec<(&str, Option<Value>)>) -> Value {
    let map: Map<String, Value> = fields
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect();
    Value::Object(map)
}

/// Keyed JSON document storage shared by all user-library stores
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches one document by id
    async fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Document>>;

    /// Writes a document at a known id, creating it if missing.
    ///
    /// With `merge` the body is shallow-merged into any existing document,
    /// otherwise it replaces it.
    async fn set(&self, collection: Collection, id: &str, body: Value, merge: bool)
        -> AppResult<()>;

    /// Stores a new document under a generated id and returns that id
    async fn insert(&self, collection: Collection, body: Value) -> AppResult<String>;

    /// Shallow-merges `patch` into an existing document.
    ///
    /// Fails with `NotFound` when there is no document at `id`.
    async fn update(&self, collection: Collection, id: &str, patch: Value) -> AppResult<()>;

    /// Removes a document. Deleting a missing id is not an error.
    async fn delete(&self, collection: Collection, id: &str) -> AppResult<()>;

    /// Replaces a document only if its version still equals `expected_version`.
    ///
    /// `None` means the document must not exist yet. Returns `false` when
    /// another writer got there first.
    async fn compare_and_set(
        &self,
        collection: Collection,
        id: &str,
        body: Value,
        expected_version: Option<u64>,
    ) -> AppResult<bool>;

    /// Returns all documents matching every filter, optionally sorted
    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
        order: Option<OrderBy>,
    ) -> AppResult<Vec<Document>>;

    /// Counts documents matching every filter
    async fn count(&self, collection: Collection, filters: &[Filter]) -> AppResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_top_level_keeps_unpatched_fields() {
        let mut target = json!({ "status": "watching", "notes": "keep me", "rating": null });
        merge_top_level(&mut target, json!({ "status": "completed", "rating": 9 }));

        assert_eq!(
            target,
            json!({ "status": "completed", "notes": "keep me", "rating": 9 })
        );
    }

    #[test]
    fn test_object_without_nulls() {
        let value = object_without_nulls(vec![
            ("status", Some(json!("watching"))),
            ("notes", None),
        ]);
        assert_eq!(value, json!({ "status": "watching" }));
    }

    #[test]
    fn test_filter_matches_on_exact_value() {
        let body = json!({ "userId": "u1", "mediaId": 42 });

        assert!(Filter::eq("userId", "u1").matches(&body));
        assert!(Filter::eq("mediaId", 42u64).matches(&body));
        assert!(!Filter::eq("userId", "u2").matches(&body));
        assert!(!Filter::eq("missing", "x").matches(&body));
    }

    #[test]
    fn test_document_decode_reports_id_on_failure() {
        let doc = Document {
            id: "abc".to_string(),
            version: 1,
            body: json!({ "unexpected": true }),
        };

        let err = doc.decode::<crate::models::FavoriteRecord>().unwrap_err();
        assert!(err.to_string().contains("abc"));
    }
}

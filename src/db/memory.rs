use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::document::{merge_top_level, Collection, Document, DocumentStore, Filter, OrderBy};
use crate::error::{AppError, AppResult};

type Key = (Collection, String);

/// Process-local document store for development and tests
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<Key, Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(collection: Collection, id: &str) -> Key {
        (collection, id.to_string())
    }
}

/// Orders two JSON values, treating RFC 3339 strings as instants
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (
                a.parse::<DateTime<Utc>>(),
                b.parse::<DateTime<Utc>>(),
            ) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents.get(&Self::key(collection, id)).cloned())
    }

    async fn set(
        &self,
        collection: Collection,
        id: &str,
        body: Value,
        merge: bool,
    ) -> AppResult<()> {
        let mut documents = self.documents.write().await;
        match documents.get_mut(&Self::key(collection, id)) {
            Some(existing) => {
                if merge {
                    merge_top_level(&mut existing.body, body);
                } else {
                    existing.body = body;
                }
                existing.version += 1;
            }
            None => {
                documents.insert(
                    Self::key(collection, id),
                    Document {
                        id: id.to_string(),
                        version: 1,
                        body,
                    },
                );
            }
        }
        Ok(())
    }

    async fn insert(&self, collection: Collection, body: Value) -> AppResult<String> {
        let id = Uuid::new_v4().to_string();
        let mut documents = self.documents.write().await;
        documents.insert(
            Self::key(collection, &id),
            Document {
                id: id.clone(),
                version: 1,
                body,
            },
        );
        Ok(id)
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> AppResult<()> {
        let mut documents = self.documents.write().await;
        let existing = documents
            .get_mut(&Self::key(collection, id))
            .ok_or_else(|| AppError::NotFound(format!("{}/{}", collection, id)))?;
        merge_top_level(&mut existing.body, patch);
        existing.version += 1;
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> AppResult<()> {
        let mut documents = self.documents.write().await;
        documents.remove(&Self::key(collection, id));
        Ok(())
    }

    async fn compare_and_set(
        &self,
        collection: Collection,
        id: &str,
        body: Value,
        expected_version: Option<u64>,
    ) -> AppResult<bool> {
        let mut documents = self.documents.write().await;
        let key = Self::key(collection, id);
        let current_version = documents.get(&key).map(|doc| doc.version);

        if current_version != expected_version {
            return Ok(false);
        }

        documents.insert(
            key,
            Document {
                id: id.to_string(),
                version: current_version.unwrap_or(0) + 1,
                body,
            },
        );
        Ok(true)
    }

    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
        order: Option<OrderBy>,
    ) -> AppResult<Vec<Document>> {
        let documents = self.documents.read().await;
        let mut matches: Vec<Document> = documents
            .iter()
            .filter(|((c, _), doc)| {
                *c == collection && filters.iter().all(|f| f.matches(&doc.body))
            })
            .map(|(_, doc)| doc.clone())
            .collect();

        if let Some(order) = order {
            matches.sort_by(|a, b| {
                let ordering = compare_values(a.body.get(order.field), b.body.get(order.field));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        Ok(matches)
    }

    async fn count(&self, collection: Collection, filters: &[Filter]) -> AppResult<u64> {
        let documents = self.documents.read().await;
        let count = documents
            .iter()
            .filter(|((c, _), doc)| {
                *c == collection && filters.iter().all(|f| f.matches(&doc.body))
            })
            .count();
        Ok(count as u64)
    }
}

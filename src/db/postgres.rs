use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use uuid::Uuid;

use super::document::{Collection, Document, DocumentStore, Filter, OrderBy};
use crate::error::{AppError, AppResult};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse and
/// applies the embedded schema migrations.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Document store over a single `documents` table with a JSONB body
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Folds equality filters into one JSON object for `@>` containment
    fn containment(filters: &[Filter]) -> Value {
        let map: Map<String, Value> = filters
            .iter()
            .map(|f| (f.field.to_string(), f.value.clone()))
            .collect();
        Value::Object(map)
    }

    fn row_to_document(row: &sqlx::postgres::PgRow) -> AppResult<Document> {
        let version: i64 = row.try_get("version")?;
        Ok(Document {
            id: row.try_get("id")?,
            version: version as u64,
            body: row.try_get("body")?,
        })
    }
}

#[async_trait::async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Document>> {
        let row = sqlx::query(
            "SELECT id, body, version FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_document).transpose()
    }

    async fn set(
        &self,
        collection: Collection,
        id: &str,
        body: Value,
        merge: bool,
    ) -> AppResult<()> {
        let sql = if merge {
            r#"
            INSERT INTO documents (collection, id, body, version)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (collection, id)
            DO UPDATE SET body = documents.body || EXCLUDED.body, version = documents.version + 1
            "#
        } else {
            r#"
            INSERT INTO documents (collection, id, body, version)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (collection, id)
            DO UPDATE SET body = EXCLUDED.body, version = documents.version + 1
            "#
        };

        sqlx::query(sql)
            .bind(collection.as_str())
            .bind(id)
            .bind(body)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert(&self, collection: Collection, body: Value) -> AppResult<String> {
        let id = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO documents (collection, id, body, version) VALUES ($1, $2, $3, 1)")
            .bind(collection.as_str())
            .bind(&id)
            .bind(body)
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = body || $3, version = version + 1
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(patch)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{}/{}", collection, id)));
        }

        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn compare_and_set(
        &self,
        collection: Collection,
        id: &str,
        body: Value,
        expected_version: Option<u64>,
    ) -> AppResult<bool> {
        let result = match expected_version {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO documents (collection, id, body, version)
                    VALUES ($1, $2, $3, 1)
                    ON CONFLICT (collection, id) DO NOTHING
                    "#,
                )
                .bind(collection.as_str())
                .bind(id)
                .bind(body)
                .execute(&self.pool)
                .await?
            }
            Some(version) => {
                sqlx::query(
                    r#"
                    UPDATE documents
                    SET body = $3, version = version + 1
                    WHERE collection = $1 AND id = $2 AND version = $4
                    "#,
                )
                .bind(collection.as_str())
                .bind(id)
                .bind(body)
                .bind(version as i64)
                .execute(&self.pool)
                .await?
            }
        };

        Ok(result.rows_affected() == 1)
    }

    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
        order: Option<OrderBy>,
    ) -> AppResult<Vec<Document>> {
        let rows = match order {
            Some(order) => {
                let direction = if order.descending { "DESC" } else { "ASC" };
                let sql = format!(
                    "SELECT id, body, version FROM documents \
                     WHERE collection = $1 AND body @> $2 \
                     ORDER BY (body ->> $3)::timestamptz {}",
                    direction
                );
                sqlx::query(&sql)
                    .bind(collection.as_str())
                    .bind(Self::containment(filters))
                    .bind(order.field)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, body, version FROM documents WHERE collection = $1 AND body @> $2",
                )
                .bind(collection.as_str())
                .bind(Self::containment(filters))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(Self::row_to_document).collect()
    }

    async fn count(&self, collection: Collection, filters: &[Filter]) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE collection = $1 AND body @> $2",
        )
        .bind(collection.as_str())
        .bind(Self::containment(filters))
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }
}

use serde_json::Value;
use sqlx::{PgPool, Row};

use super::manager::DatabaseError;

const FIND_BY_TIME_SQL: &str = "SELECT body FROM documents WHERE collection = $1 \
     ORDER BY (body->>$2)::timestamptz ASC, id ASC OFFSET $3 LIMIT $4";

/// Schema-flexible collections kept as JSONB bodies in one `documents` table.
///
/// Each document is addressed by `(collection, id)`. Operations mirror the
/// usual document-store surface: `find_one`, `find`, `count`, `insert_one`,
/// `update_one` (full replacement) and `upsert_one`.

#[derive(Clone)]
pub struct DocumentStore {
    pool: PgPool,
}

impl DocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>, DatabaseError> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get::<Value, _>("body")))
    }

    /// First document whose top-level `field` equals `value`
    pub async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, DatabaseError> {
        let row = sqlx::query(
            "SELECT body FROM documents WHERE collection = $1 AND body->>$2 = $3 ORDER BY id LIMIT 1",
        )
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get::<Value, _>("body")))
    }

    /// Page through a collection ordered by the RFC 3339 timestamp in
    /// `time_field`, then id. The field is compared as `timestamptz`, not text,
    /// since chrono omits trailing fractional digits.
    pub async fn find(
        &self,
        collection: &str,
        time_field: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Value>, DatabaseError> {
        let rows = sqlx::query(FIND_BY_TIME_SQL)
            .bind(collection)
            .bind(time_field)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.get::<Value, _>("body")).collect())
    }

    pub async fn count(&self, collection: &str) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents WHERE collection = $1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    pub async fn insert_one(&self, collection: &str, id: &str, body: &Value) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(body)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Replace the body of an existing document. Returns false when no document matched.
    pub async fn update_one(&self, collection: &str, id: &str, body: &Value) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE documents SET body = $3, updated_at = now() WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(body)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn upsert_one(&self, collection: &str, id: &str, body: &Value) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3) \
             ON CONFLICT (collection, id) DO UPDATE SET body = EXCLUDED.body, updated_at = now()",
        )
        .bind(collection)
        .bind(id)
        .bind(body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

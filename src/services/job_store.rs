use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use crate::database::models::{JobRecord, JobRow};
use crate::database::{DatabaseError, DatabaseManager, DocumentStore};

/// Read and replace access to job/OCR records in one backend.
///
/// Pages are ordered by creation time then id so that consecutive pages
/// partition the unpaginated ordering.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn count(&self) -> Result<i64, DatabaseError>;

    async fn page(&self, offset: i64, limit: i64) -> Result<Vec<JobRecord>, DatabaseError>;

    async fn find(&self, id: &str) -> Result<Option<JobRecord>, DatabaseError>;

    /// Full-document replacement; `Ok(false)` when no record has that id.
    async fn replace(&self, record: &JobRecord) -> Result<bool, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Jobs held in the document store's `jobs` collection
#[derive(Clone)]
pub struct DocumentJobStore {
    documents: DocumentStore,
}

impl DocumentJobStore {
    pub const COLLECTION: &'static str = "jobs";

    pub fn new(documents: DocumentStore) -> Self {
        Self { documents }
    }

    fn decode(body: Value) -> Result<JobRecord, DatabaseError> {
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl JobStore for DocumentJobStore {
    async fn count(&self) -> Result<i64, DatabaseError> {
        self.documents.count(Self::COLLECTION).await
    }

    async fn page(&self, offset: i64, limit: i64) -> Result<Vec<JobRecord>, DatabaseError> {
        self.documents
            .find(Self::COLLECTION, "createdAt", offset, limit)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    async fn find(&self, id: &str) -> Result<Option<JobRecord>, DatabaseError> {
        self.documents
            .find_one(Self::COLLECTION, id)
            .await?
            .map(Self::decode)
            .transpose()
    }

    async fn replace(&self, record: &JobRecord) -> Result<bool, DatabaseError> {
        let body = serde_json::to_value(record)?;
        self.documents.update_one(Self::COLLECTION, &record.id, &body).await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::ping(self.documents.pool()).await
    }
}

/// Jobs held in the relational `xti_ocr_job_t` table
#[derive(Clone)]
pub struct RelationalJobStore {
    pool: PgPool,
}

impl RelationalJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const JOB_COLUMNS: &str = "id, file_id, file_name, status, quantity, processed_quantity, \
    stamp_required, signature_required, stamp_detected, signature_detected, extracted, \
    created_at, updated_at";

#[async_trait]
impl JobStore for RelationalJobStore {
    async fn count(&self) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM xti_ocr_job_t")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn page(&self, offset: i64, limit: i64) -> Result<Vec<JobRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM xti_ocr_job_t ORDER BY created_at ASC, id ASC OFFSET $1 LIMIT $2",
            JOB_COLUMNS
        );
        let rows: Vec<JobRow> = sqlx::query_as(&sql)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(JobRecord::from).collect())
    }

    async fn find(&self, id: &str) -> Result<Option<JobRecord>, DatabaseError> {
        let sql = format!("SELECT {} FROM xti_ocr_job_t WHERE id = $1", JOB_COLUMNS);
        let row: Option<JobRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(JobRecord::from))
    }

    async fn replace(&self, record: &JobRecord) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE xti_ocr_job_t SET
                file_id = $2, file_name = $3, status = $4, quantity = $5,
                processed_quantity = $6, stamp_required = $7, signature_required = $8,
                stamp_detected = $9, signature_detected = $10, extracted = $11,
                updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(&record.id)
        .bind(&record.file_id)
        .bind(&record.file_name)
        .bind(&record.status)
        .bind(record.quantity)
        .bind(record.processed_quantity)
        .bind(record.stamp_required)
        .bind(record.signature_required)
        .bind(record.stamp_detected)
        .bind(record.signature_detected)
        .bind(&record.extracted)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::ping(&self.pool).await
    }
}

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::database::models::{FilePod, FilePodRecord, StampRequirement};
use crate::database::DatabaseError;

/// Access to the file-POD parent/dependent tables in the relational store.
#[async_trait]
pub trait PodStore: Send + Sync {
    /// Acquire a pooled connection and open a transaction on it.
    async fn begin(&self) -> Result<Box<dyn PodTransaction>, DatabaseError>;

    async fn find(&self, file_id: &str) -> Result<Option<FilePodRecord>, DatabaseError>;
}

/// One open transaction. Consuming `commit`/`rollback` releases the
/// connection; dropping an unfinished transaction rolls it back.
#[async_trait]
pub trait PodTransaction: Send {
    async fn delete_stamp_requirements(&mut self, file_id: &str) -> Result<u64, DatabaseError>;

    async fn delete_file_pod(&mut self, file_id: &str) -> Result<u64, DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError>;
}

#[derive(Clone)]
pub struct PgPodStore {
    pool: PgPool,
}

impl PgPodStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PodStore for PgPodStore {
    async fn begin(&self) -> Result<Box<dyn PodTransaction>, DatabaseError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgPodTransaction { tx }))
    }

    async fn find(&self, file_id: &str) -> Result<Option<FilePodRecord>, DatabaseError> {
        let file_pod: Option<FilePod> = sqlx::query_as(
            "SELECT file_id, file_name, pod_status, created_at FROM xti_file_pod_t WHERE file_id = $1",
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(file_pod) = file_pod else {
            return Ok(None);
        };

        let stamp_requirements: Vec<StampRequirement> = sqlx::query_as(
            "SELECT id, file_id, stamp_type, required FROM xti_pod_stamp_reqrd_t WHERE file_id = $1 ORDER BY id",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(FilePodRecord { file_pod, stamp_requirements }))
    }
}

struct PgPodTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl PodTransaction for PgPodTransaction {
    async fn delete_stamp_requirements(&mut self, file_id: &str) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM xti_pod_stamp_reqrd_t WHERE file_id = $1")
            .bind(file_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_file_pod(&mut self, file_id: &str) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM xti_file_pod_t WHERE file_id = $1")
            .bind(file_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

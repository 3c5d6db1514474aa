use sqlx::PgPool;
use tracing::info;

use super::manager::DatabaseError;

/// DDL for the document store
pub const DOCUMENT_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        body JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (collection, id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS documents_created_at_idx ON documents (collection, (body->>'createdAt'))",
];

/// DDL for the relational store. `xti_pod_stamp_reqrd_t` references its parent,
/// so dependent rows must go first on delete.
pub const RELATIONAL_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS xti_ocr_job_t (
        id TEXT PRIMARY KEY,
        file_id TEXT NOT NULL,
        file_name TEXT,
        status TEXT,
        quantity INTEGER NOT NULL DEFAULT 0,
        processed_quantity INTEGER NOT NULL DEFAULT 0,
        stamp_required BOOLEAN NOT NULL DEFAULT false,
        signature_required BOOLEAN NOT NULL DEFAULT false,
        stamp_detected BOOLEAN NOT NULL DEFAULT false,
        signature_detected BOOLEAN NOT NULL DEFAULT false,
        extracted JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS xti_file_pod_t (
        file_id TEXT PRIMARY KEY,
        file_name TEXT,
        pod_status TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS xti_pod_stamp_reqrd_t (
        id BIGSERIAL PRIMARY KEY,
        file_id TEXT NOT NULL REFERENCES xti_file_pod_t (file_id),
        stamp_type TEXT,
        required BOOLEAN NOT NULL DEFAULT true
    )
    "#,
    "CREATE INDEX IF NOT EXISTS xti_pod_stamp_reqrd_file_idx ON xti_pod_stamp_reqrd_t (file_id)",
];

pub async fn apply(pool: &PgPool, statements: &[&str], label: &str) -> Result<(), DatabaseError> {
    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Applied {} schema ({} statements)", label, statements.len());
    Ok(())
}

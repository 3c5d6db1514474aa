use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{DatabaseError, DocumentStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub action: String,
    pub actor: String,
    pub target: String,
    pub at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(action: impl Into<String>, actor: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            actor: actor.into(),
            target: target.into(),
            at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> Result<(), DatabaseError>;
}

/// Appends entries to the document store's `logs` collection
#[derive(Clone)]
pub struct DocumentAuditLog {
    documents: DocumentStore,
}

impl DocumentAuditLog {
    pub const COLLECTION: &'static str = "logs";

    pub fn new(documents: DocumentStore) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl AuditLog for DocumentAuditLog {
    async fn record(&self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        let body = serde_json::to_value(entry)?;
        let id = Uuid::new_v4().to_string();
        self.documents.insert_one(Self::COLLECTION, &id, &body).await
    }
}

/// Write an audit entry; failures are logged and never reach the caller.
pub async fn record_best_effort(log: &dyn AuditLog, enabled: bool, entry: AuditEntry) {
    if !enabled {
        return;
    }
    if let Err(e) = log.record(&entry).await {
        tracing::warn!("Failed to write audit entry '{}' for {}: {}", entry.action, entry.target, e);
    }
}

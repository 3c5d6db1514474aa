use async_trait::async_trait;
use chrono::Utc;

use crate::database::models::ConnectionSetting;
use crate::database::{DatabaseError, DocumentStore};

/// Persistence for the Connection Setting.
#[async_trait]
pub trait SettingStore: Send + Sync {
    async fn connection(&self) -> Result<Option<ConnectionSetting>, DatabaseError>;

    async fn set_connection(&self, db_type: &str) -> Result<ConnectionSetting, DatabaseError>;
}

/// Stores the setting as `settings/connection` in the document store
#[derive(Clone)]
pub struct DocumentSettingStore {
    documents: DocumentStore,
}

impl DocumentSettingStore {
    pub const COLLECTION: &'static str = "settings";
    pub const CONNECTION_ID: &'static str = "connection";

    pub fn new(documents: DocumentStore) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl SettingStore for DocumentSettingStore {
    async fn connection(&self) -> Result<Option<ConnectionSetting>, DatabaseError> {
        match self.documents.find_one(Self::COLLECTION, Self::CONNECTION_ID).await? {
            Some(body) => Ok(Some(serde_json::from_value(body)?)),
            None => Ok(None),
        }
    }

    async fn set_connection(&self, db_type: &str) -> Result<ConnectionSetting, DatabaseError> {
        let setting = ConnectionSetting {
            data_base: db_type.to_string(),
            updated_at: Utc::now(),
        };
        let body = serde_json::to_value(&setting)?;
        self.documents
            .upsert_one(Self::COLLECTION, Self::CONNECTION_ID, &body)
            .await?;
        Ok(setting)
    }
}

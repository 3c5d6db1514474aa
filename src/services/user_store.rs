use async_trait::async_trait;

use crate::database::models::AdminUser;
use crate::database::{DatabaseError, DocumentStore};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>, DatabaseError>;

    async fn upsert(&self, user: &AdminUser) -> Result<(), DatabaseError>;
}

/// Admin users kept in the document store's `users` collection, keyed by username
#[derive(Clone)]
pub struct DocumentUserStore {
    documents: DocumentStore,
}

impl DocumentUserStore {
    pub const COLLECTION: &'static str = "users";

    pub fn new(documents: DocumentStore) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl UserStore for DocumentUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>, DatabaseError> {
        self.documents
            .find_by_field(Self::COLLECTION, "username", username)
            .await?
            .map(|body| serde_json::from_value(body).map_err(DatabaseError::from))
            .transpose()
    }

    async fn upsert(&self, user: &AdminUser) -> Result<(), DatabaseError> {
        let body = serde_json::to_value(user)?;
        self.documents.upsert_one(Self::COLLECTION, &user.username, &body).await
    }
}

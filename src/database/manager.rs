use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::Decode(err.to_string())
    }
}

/// Owns the two connection pools: the document store and the relational store.
///
/// Pools are created once at startup and cloned into request handlers. Each
/// clone shares the same underlying connections.
#[derive(Clone)]
pub struct DatabaseManager {
    document: PgPool,
    relational: PgPool,
}

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let document = Self::open_pool(&config.document_url, "DOCUMENT_DATABASE_URL", config).await?;
        let relational = Self::open_pool(&config.relational_url, "DATABASE_URL", config).await?;
        Ok(Self { document, relational })
    }

    async fn open_pool(
        url: &str,
        setting: &'static str,
        config: &DatabaseConfig,
    ) -> Result<PgPool, DatabaseError> {
        if url.is_empty() {
            return Err(DatabaseError::ConfigMissing(setting));
        }
        let shown = Self::display_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool for: {}", shown);
        Ok(pool)
    }

    pub fn document_pool(&self) -> &PgPool {
        &self.document
    }

    pub fn relational_pool(&self) -> &PgPool {
        &self.relational
    }

    /// Render a connection URL for logs with any password removed
    fn display_url(raw: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("***")).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }

    /// Pings a pool to ensure connectivity
    pub async fn ping(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Close both pools (e.g., on shutdown)
    pub async fn close(&self) {
        self.document.close().await;
        self.relational.close().await;
        info!("Closed database pools");
    }
}

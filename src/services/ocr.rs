use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::OcrConfig;
use crate::database::models::JobRecord;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR service is not configured")]
    NotConfigured,

    #[error("OCR service did not answer within {0} seconds")]
    Timeout(u64),

    #[error("OCR service returned status {0}")]
    Upstream(u16),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait OcrService: Send + Sync {
    async fn invoke(&self, job: &JobRecord) -> Result<Value, OcrError>;
}

/// Calls the external OCR service; the whole exchange races a fixed deadline.
pub struct HttpOcrClient {
    client: reqwest::Client,
    config: OcrConfig,
}

impl HttpOcrClient {
    pub fn new(client: reqwest::Client, config: OcrConfig) -> Self {
        Self { client, config }
    }

    async fn call(&self, url: &str, job: &JobRecord) -> Result<Value, OcrError> {
        let response = self
            .client
            .post(url)
            .json(&json!({
                "jobId": job.id,
                "fileId": job.file_id,
                "fileName": job.file_name,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OcrError::Upstream(response.status().as_u16()));
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl OcrService for HttpOcrClient {
    async fn invoke(&self, job: &JobRecord) -> Result<Value, OcrError> {
        let url = self.config.service_url.as_deref().ok_or(OcrError::NotConfigured)?;
        let deadline = Duration::from_secs(self.config.timeout_secs);

        match tokio::time::timeout(deadline, self.call(url, job)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("OCR for job {} timed out after {:?}", job.id, deadline);
                Err(OcrError::Timeout(self.config.timeout_secs))
            }
        }
    }
}

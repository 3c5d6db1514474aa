use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl MailMessage {
    pub fn validate(&self) -> Result<(), MailError> {
        let to = self.to.trim();
        let well_formed = match to.split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.') && !to.contains(char::is_whitespace),
            None => false,
        };
        if !well_formed {
            return Err(MailError::InvalidRecipient(self.to.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Mail relay is not configured")]
    NotConfigured,

    #[error("Mail relay rejected message with status {0}")]
    Rejected(u16),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Sends mail through an HTTP relay that accepts `{from, to, subject, text}`.
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailConfig,
}

impl HttpMailer {
    pub fn new(client: reqwest::Client, config: MailConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        message.validate()?;
        let relay_url = self.config.relay_url.as_deref().ok_or(MailError::NotConfigured)?;

        let mut request = self.client.post(relay_url).json(&json!({
            "from": self.config.from_address,
            "to": message.to.trim(),
            "subject": message.subject,
            "text": message.text,
        }));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(MailError::Rejected(response.status().as_u16()));
        }

        tracing::info!("Sent email to {} ({})", message.to.trim(), message.subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str) -> MailMessage {
        MailMessage {
            to: to.to_string(),
            subject: "POD ready".to_string(),
            text: "See attachment".to_string(),
        }
    }

    #[test]
    fn validates_recipient() {
        assert!(message("ops@example.com").validate().is_ok());
        assert!(message("ops@localhost").validate().is_err());
        assert!(message("@example.com").validate().is_err());
        assert!(message("not an address").validate().is_err());
    }

    #[tokio::test]
    async fn unconfigured_relay_is_reported() {
        let mailer = HttpMailer::new(
            reqwest::Client::new(),
            MailConfig {
                relay_url: None,
                api_key: None,
                from_address: "noreply@example.com".to_string(),
            },
        );
        assert!(matches!(
            mailer.send(&message("ops@example.com")).await,
            Err(MailError::NotConfigured)
        ));
    }
}

//! Email service
//!
//! Outbound mail over SMTP. Connection settings are read from the content
//! store at send time so staff can change them from the back office
//! without a restart. When no SMTP host is configured, sends fail with a
//! clear error and callers treat delivery as best effort.

use anyhow::{anyhow, Result};
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;

use crate::services::content::{content_keys, ContentService};

/// Email service backed by store-configured SMTP
pub struct EmailService {
    content: Arc<ContentService>,
}

impl EmailService {
    pub fn new(content: Arc<ContentService>) -> Self {
        Self { content }
    }

    /// Whether an SMTP host is configured at all.
    pub async fn is_configured(&self) -> bool {
        !self
            .content
            .get_value_or(content_keys::SMTP_HOST, "")
            .await
            .is_empty()
    }

    /// Send a plain-text email.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let host = self.content.get_value_or(content_keys::SMTP_HOST, "").await;
        if host.is_empty() {
            return Err(anyhow!("SMTP host not configured"));
        }

        let port: u16 = self
            .content
            .get_value_or(content_keys::SMTP_PORT, "587")
            .await
            .parse()
            .unwrap_or(587);
        let username = self
            .content
            .get_value_or(content_keys::SMTP_USERNAME, "")
            .await;
        let password = self
            .content
            .get_value_or(content_keys::SMTP_PASSWORD, "")
            .await;
        let from = self.content.get_value_or(content_keys::SMTP_FROM, "").await;
        if from.is_empty() {
            return Err(anyhow!("SMTP from address not configured"));
        }
        let site_name = self
            .content
            .get_value_or(content_keys::SITE_NAME, "Dahabiyat")
            .await;

        let email = Message::builder()
            .from(
                format!("{} <{}>", site_name, from)
                    .parse()
                    .map_err(|e| anyhow!("Invalid from address: {}", e))?,
            )
            .to(to
                .parse()
                .map_err(|e| anyhow!("Invalid to address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
                .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
                .credentials(Credentials::new(username, password))
                .port(port)
                .build();

        mailer
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;
        Ok(())
    }

    /// Send to the configured staff notification address, if any.
    pub async fn notify_staff(&self, subject: &str, body: &str) -> Result<()> {
        let to = self
            .content
            .get_value_or(content_keys::NOTIFY_EMAIL, "")
            .await;
        if to.is_empty() {
            return Err(anyhow!("Notification address not configured"));
        }
        self.send(&to, subject, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::db::create_test_pool;
    use crate::db::repositories::SqlxContentRepository;

    async fn service() -> EmailService {
        let pool = create_test_pool().await.unwrap();
        let content = Arc::new(ContentService::new(
            SqlxContentRepository::boxed(pool),
            Arc::new(MemoryCache::new()),
        ));
        EmailService::new(content)
    }

    #[tokio::test]
    async fn test_unconfigured_send_fails_cleanly() {
        let service = service().await;
        assert!(!service.is_configured().await);

        let result = service.send("to@example.com", "Subject", "Body").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_notify_requires_address() {
        let service = service().await;
        assert!(service.notify_staff("Subject", "Body").await.is_err());
    }
}

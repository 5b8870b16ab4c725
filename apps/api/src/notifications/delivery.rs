//! Delivery — the notification transport. Production sends email through Resend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Delivery rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Delivery timed out")]
    TimedOut,
}

/// At-least-once transport. `Ok` means the provider accepted the message.
#[async_trait]
pub trait DeliveryService: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError>;
}

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Clone)]
pub struct ResendDelivery {
    client: Client,
    api_key: String,
    from: String,
}

impl ResendDelivery {
    pub fn new(api_key: String, from: String, timeout: Duration) -> Result<Self, DeliveryError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl DeliveryService for ResendDelivery {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        let body = ResendEmail {
            from: &self.from,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Resend accepted email to {}", message.to);
        Ok(())
    }
}

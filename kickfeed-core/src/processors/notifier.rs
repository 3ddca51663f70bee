//! Outbound notification sink.

use async_trait::async_trait;
use kickfeed_sdk::client::{ClientError, SlackClient};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during notification delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The request never got an answer, or the client failed locally.
    #[error("delivery request failed: {0}")]
    Request(ClientError),

    /// The sink answered with a non-2xx status.
    #[error("delivery rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl From<ClientError> for DeliveryError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Api { status, body } => DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            },
            other => DeliveryError::Request(other),
        }
    }
}

/// Destination for rendered notifications. One call per notification.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), DeliveryError>;
}

/// Delivers notifications to a Slack incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackSink {
    client: SlackClient,
}

impl SlackSink {
    pub fn new(client: SlackClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationSink for SlackSink {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        self.client.post(text).await?;
        debug!(len = text.len(), "Notification delivered to Slack");
        Ok(())
    }
}

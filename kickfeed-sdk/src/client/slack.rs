//! Slack incoming-webhook client.

use reqwest::Client;
use url::Url;

use super::ClientError;
use crate::objects::SlackMessage;

/// Posts plain-text messages to one Slack incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackClient {
    http: Client,
    webhook_url: Url,
}

impl SlackClient {
    pub fn new(webhook_url: Url) -> Self {
        Self {
            http: Client::new(),
            webhook_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Post one message. Any non-2xx answer is reported as [`ClientError::Api`].
    pub async fn post(&self, text: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.webhook_url.clone())
            .json(&SlackMessage::new(text))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(ClientError::Api { status, body })
        }
    }
}

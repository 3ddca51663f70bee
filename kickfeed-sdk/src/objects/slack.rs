//! Slack incoming-webhook payload.

use serde::{Deserialize, Serialize};

/// Body of a Slack incoming-webhook request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackMessage {
    pub text: String,
}

impl SlackMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

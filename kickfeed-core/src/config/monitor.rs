//! Polling configuration.

use std::time::Duration;

/// How the fleet is polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Only matches of this competition are registered when set.
    pub competition_id: Option<String>,
    /// Daemon round period, also the queue-mode discovery period.
    pub poll_interval: Duration,
    /// Delivery delay of a queue continuation.
    pub continuation_delay: Duration,
}

impl MonitorConfig {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
    pub const DEFAULT_CONTINUATION_DELAY: Duration = Duration::from_secs(60);

    /// Whether a match of `competition_id` passes the competition filter.
    pub fn accepts(&self, competition_id: &str) -> bool {
        self.competition_id
            .as_deref()
            .is_none_or(|wanted| wanted == competition_id)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            competition_id: None,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            continuation_delay: Self::DEFAULT_CONTINUATION_DELAY,
        }
    }
}

//! TOML file configuration structures.
//!
//! These structs directly map to the `kickfeed-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub monitor: MonitorSection,
    #[serde(default)]
    pub slack: SlackSection,
    #[serde(default)]
    pub feed: FeedSection,
    #[serde(default)]
    pub classifier: ClassifierSection,
    #[serde(default)]
    pub storage: StorageSection,
    /// The status server only runs when this section is present.
    pub server: Option<ServerSection>,
}

/// How the polling loop is driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Timed rounds over every live match.
    #[default]
    Daemon,
    /// One poll per continuation message.
    Queue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSection {
    #[serde(default)]
    pub mode: RunMode,
    #[serde(default = "default_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub continuation_delay_secs: u64,
    /// Register only matches of this competition.
    pub competition_id: Option<String>,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            poll_interval_secs: default_interval_secs(),
            continuation_delay_secs: default_interval_secs(),
            competition_id: None,
        }
    }
}

fn default_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlackSection {
    /// Incoming webhook URL. Can also come from `SLACK_WEBHOOK_URL`.
    pub webhook_url: Option<Url>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSection {
    /// Root of the feed API; the public endpoint when unset.
    pub base_url: Option<Url>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            base_url: None,
            language: default_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Additions to the built-in classifier tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierSection {
    /// Event type codes suppressed on top of the defaults.
    #[serde(default)]
    pub extra_suppressed: Vec<u32>,
    /// Replaces the shootout-only suppression set when present.
    pub shootout_suppressed: Option<Vec<u32>>,
    /// Team abbreviation to Slack emoji, merged over the defaults.
    #[serde(default)]
    pub flags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[monitor]
mode = "queue"
poll_interval_secs = 30
competition_id = "17"

[slack]
webhook_url = "https://hooks.slack.com/services/T000/B000/XXXX"

[feed]
base_url = "https://feed.example.com/api/v3/"
language = "de"

[classifier]
extra_suppressed = [71]
shootout_suppressed = []
flags = { NED = ":tulip:" }

[storage]
backend = "postgres"

[server]
listen = "127.0.0.1:3000"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.monitor.mode, RunMode::Queue);
        assert_eq!(config.monitor.poll_interval_secs, 30);
        assert_eq!(config.monitor.continuation_delay_secs, 60);
        assert_eq!(config.monitor.competition_id.as_deref(), Some("17"));
        assert!(config.slack.webhook_url.is_some());
        assert_eq!(config.feed.language, "de");
        assert_eq!(config.feed.timeout_secs, 10);
        assert_eq!(config.classifier.extra_suppressed, [71]);
        assert_eq!(config.classifier.shootout_suppressed, Some(vec![]));
        assert_eq!(config.classifier.flags["NED"], ":tulip:");
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.server.map(|s| s.listen.port()), Some(3000));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.monitor.mode, RunMode::Daemon);
        assert_eq!(config.monitor.poll_interval_secs, 60);
        assert_eq!(config.feed.language, "en");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.slack.webhook_url.is_none());
        assert!(config.server.is_none());
    }
}

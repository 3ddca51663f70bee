//! Configuration module for kickfeed-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::{ClassifierSection, FileConfig, RunMode, StorageBackend};
use kickfeed_core::config::{ClassifierConfig, MonitorConfig};
use kickfeed_sdk::client::FeedClient;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("postgres storage selected but DATABASE_URL is not set")]
    MissingDatabaseUrl,

    #[error("no Slack webhook URL configured (set [slack].webhook_url or SLACK_WEBHOOK_URL)")]
    MissingWebhookUrl,
}

/// Values given on the command line or through the environment. They win
/// over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub listen: Option<SocketAddr>,
    pub mode: Option<RunMode>,
    pub webhook_url: Option<Url>,
    pub competition_id: Option<String>,
    pub database_url: Option<String>,
}

/// Feed client settings.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub base_url: Url,
    pub language: String,
    pub timeout: Duration,
}

/// Where match records live.
#[derive(Debug, Clone)]
pub enum StorageSettings {
    Memory,
    Postgres { database_url: String },
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub mode: RunMode,
    pub monitor: MonitorConfig,
    pub classifier: ClassifierConfig,
    pub webhook_url: Url,
    pub feed: FeedSettings,
    pub storage: StorageSettings,
    pub listen: Option<SocketAddr>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    overrides: Overrides,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, overrides: Overrides) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            overrides,
        }
    }

    /// Read the TOML file, apply overrides and validate the result.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let file_config: FileConfig = toml::from_str(&config_content)?;
        self.resolve(file_config)
    }

    /// Re-read only the classifier section (used during SIGHUP).
    ///
    /// Everything else is wired into running tasks at start and needs a
    /// restart to change.
    pub fn reload_classifier(&self) -> Result<ClassifierConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let file_config: FileConfig = toml::from_str(&config_content)?;
        Ok(build_classifier(file_config.classifier))
    }

    fn resolve(&self, file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        Self::validate(&file_config)?;
        let overrides = self.overrides.clone();

        let webhook_url = overrides
            .webhook_url
            .or(file_config.slack.webhook_url)
            .ok_or(ConfigError::MissingWebhookUrl)?;

        let storage = match file_config.storage.backend {
            StorageBackend::Memory => StorageSettings::Memory,
            StorageBackend::Postgres => StorageSettings::Postgres {
                database_url: overrides
                    .database_url
                    .ok_or(ConfigError::MissingDatabaseUrl)?,
            },
        };

        let base_url = match file_config.feed.base_url {
            Some(url) => url,
            None => Url::parse(FeedClient::DEFAULT_BASE_URL)
                .map_err(|e| ConfigError::Validation(format!("default feed url: {e}")))?,
        };

        let monitor_section = file_config.monitor;
        Ok(LoadedConfig {
            mode: overrides.mode.unwrap_or(monitor_section.mode),
            monitor: MonitorConfig {
                competition_id: overrides
                    .competition_id
                    .or(monitor_section.competition_id),
                poll_interval: Duration::from_secs(monitor_section.poll_interval_secs),
                continuation_delay: Duration::from_secs(monitor_section.continuation_delay_secs),
            },
            classifier: build_classifier(file_config.classifier),
            webhook_url,
            feed: FeedSettings {
                base_url,
                language: file_config.feed.language,
                timeout: Duration::from_secs(file_config.feed.timeout_secs),
            },
            storage,
            listen: overrides
                .listen
                .or(file_config.server.map(|server| server.listen)),
        })
    }

    fn validate(config: &FileConfig) -> Result<(), ConfigError> {
        if config.monitor.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "monitor.poll_interval_secs must be positive".into(),
            ));
        }
        if config.monitor.continuation_delay_secs == 0 {
            return Err(ConfigError::Validation(
                "monitor.continuation_delay_secs must be positive".into(),
            ));
        }
        if config.feed.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "feed.timeout_secs must be positive".into(),
            ));
        }
        if config.feed.language.trim().is_empty() {
            return Err(ConfigError::Validation("feed.language is empty".into()));
        }
        Ok(())
    }
}

fn build_classifier(section: ClassifierSection) -> ClassifierConfig {
    ClassifierConfig::with_overrides(
        section.extra_suppressed,
        section.shootout_suppressed,
        section.flags,
    )
}

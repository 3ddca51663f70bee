//! Configuration types for kickfeed.
//!
//! These types represent the validated runtime configuration shared by the
//! core processors. Loading and parsing the config file is handled by the
//! server crate.

mod classifier;
mod config_store;
mod monitor;

pub use classifier::{
    ClassifierConfig, DEFAULT_FLAGS, DEFAULT_SHOOTOUT_SUPPRESSED, DEFAULT_SUPPRESSED,
};
pub use config_store::ConfigStore;
pub use monitor::MonitorConfig;

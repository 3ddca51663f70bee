//! Work items and in-process channels.
//!
//! # Flow
//!
//! 1. `FleetScanner` registers a match and schedules its first poll
//! 2. The scheduler delivers a `MatchWorkItem` to `MatchMonitor`
//! 3. `MatchMonitor` polls and, while the match is live, schedules the next
//!
//! Items are idempotent: they carry identifiers and the monitor re-reads
//! state from the registry.

pub mod channels;
pub mod types;

pub use channels::{
    ContinuationReceiver, ContinuationSender, DEFAULT_CHANNEL_BUFFER, continuation_channel,
};
pub use types::MatchWorkItem;

//! Processors of the polling pipeline.
//!
//! - `FleetScanner`: discovers live matches, registers them, schedules the first poll
//! - `MatchMonitor`: polls one match, persists progress, delivers notifications
//! - `DaemonRunner`: drives scanner and monitor in timed rounds
//! - `QueueWorker`: drives the monitor from a continuation queue
//!
//! `cursor_engine` and `classifier` are the pure parts the monitor is built
//! on; `timeline_fetcher`, `notifier` and `continuation` are its seams.

pub mod classifier;
pub mod continuation;
pub mod cursor_engine;
pub mod daemon;
pub mod fleet_scanner;
pub mod match_monitor;
pub mod notifier;
pub mod queue_worker;
pub mod timeline_fetcher;

pub use classifier::{Classified, MatchContext};
pub use continuation::{ContinuationScheduler, DaemonScheduler, QueueScheduler, ScheduleError};
pub use cursor_engine::Advance;
pub use daemon::{DaemonRunner, RoundError};
pub use fleet_scanner::{FleetScanner, ScanError};
pub use match_monitor::{MatchMonitor, MonitorError, PollOutcome, PollReport};
pub use notifier::{DeliveryError, NotificationSink, SlackSink};
pub use queue_worker::QueueWorker;
pub use timeline_fetcher::{FeedError, TimelineFetcher};

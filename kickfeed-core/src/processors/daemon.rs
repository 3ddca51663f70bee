//! DaemonRunner: the single-process polling loop.
//!
//! Every round:
//! 1. Discovers newly live matches
//! 2. Polls all live registry records concurrently, one task per match
//! 3. Waits for the whole round, then sleeps out the rest of the interval
//!
//! A round always completes before the next one starts, so two polls of the
//! same match never overlap.

use crate::processors::fleet_scanner::FleetScanner;
use crate::processors::match_monitor::{MatchMonitor, MonitorError, PollOutcome};
use crate::registry::{MatchRegistry, RegistryError};
use crate::utils::poll_interval::remaining_interval;
use itertools::Itertools;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// One match whose poll failed during a round.
#[derive(Debug, Error)]
pub enum PollFailure {
    #[error("match {match_id}: {source}")]
    Monitor {
        match_id: String,
        source: MonitorError,
    },

    #[error("match {match_id}: poll task panicked")]
    Panicked { match_id: String },
}

/// Errors of one daemon round.
#[derive(Debug, Error)]
pub enum RoundError {
    /// The live records could not be listed; nothing was polled.
    #[error("listing live matches failed: {0}")]
    Registry(#[from] RegistryError),

    /// Some polls failed. The others completed normally.
    #[error("{} of {total} polls failed: {}", .failures.len(), .failures.iter().join("; "))]
    Polls {
        total: usize,
        failures: Vec<PollFailure>,
    },
}

/// Counts of one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub polled: usize,
    pub finished: usize,
    pub notified: usize,
}

pub struct DaemonRunner {
    scanner: FleetScanner,
    monitor: MatchMonitor,
    registry: Arc<dyn MatchRegistry>,
    interval: Duration,
    shutdown_rx: watch::Receiver<bool>,
}

impl DaemonRunner {
    pub fn new(
        scanner: FleetScanner,
        monitor: MatchMonitor,
        registry: Arc<dyn MatchRegistry>,
        interval: Duration,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            scanner,
            monitor,
            registry,
            interval,
            shutdown_rx,
        }
    }

    /// Run rounds until shutdown. An in-flight round is allowed to finish.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "DaemonRunner started");

        loop {
            if *self.shutdown_rx.borrow() {
                break;
            }
            let started = tokio::time::Instant::now();
            match self.run_round().await {
                Ok(summary) => debug!(?summary, "Round complete"),
                Err(e) => error!(error = %e, "Round completed with failures"),
            }

            let wait = remaining_interval(self.interval, started.elapsed());
            tokio::select! {
                biased;

                stopped = self.shutdown_rx.wait_for(|stop| *stop) => {
                    if stopped.is_err() {
                        warn!("Shutdown sender dropped, stopping");
                    }
                    info!("DaemonRunner received shutdown signal");
                    break;
                }

                _ = tokio::time::sleep(wait) => {}
            }
        }

        info!("DaemonRunner stopped");
    }

    /// Discover, then poll every live match once.
    pub async fn run_round(&self) -> Result<RoundSummary, RoundError> {
        if let Err(e) = self.scanner.discover().await {
            // Matches already registered still get polled.
            error!(error = %e, "Discovery failed");
        }

        let records = self.registry.list_live().await?;
        let total = records.len();
        let mut tasks = JoinSet::new();
        let mut task_matches = HashMap::new();
        for record in records {
            let monitor = self.monitor.clone();
            let match_id = record.identity.match_id.clone();
            let handle = tasks.spawn(async move { monitor.poll(&record.identity).await });
            task_matches.insert(handle.id(), match_id);
        }

        let mut summary = RoundSummary::default();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, Ok(report))) => {
                    let match_id = task_matches.remove(&id).unwrap_or_default();
                    summary.polled += 1;
                    summary.notified += report.notified;
                    if report.outcome == PollOutcome::Finished {
                        summary.finished += 1;
                    }
                    if let Some(source) = report.delivery_error() {
                        failures.push(PollFailure::Monitor { match_id, source });
                    }
                }
                Ok((id, Err(source))) => {
                    let match_id = task_matches.remove(&id).unwrap_or_default();
                    if matches!(source, MonitorError::Persistence(RegistryError::Conflict { .. })) {
                        warn!(%match_id, error = %source, "Concurrent poll detected");
                    }
                    failures.push(PollFailure::Monitor { match_id, source });
                }
                Err(join_error) => {
                    let match_id = task_matches.remove(&join_error.id()).unwrap_or_default();
                    failures.push(PollFailure::Panicked { match_id });
                }
            }
        }

        if failures.is_empty() {
            Ok(summary)
        } else {
            Err(RoundError::Polls { total, failures })
        }
    }
}

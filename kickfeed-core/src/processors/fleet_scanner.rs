//! FleetScanner processor.
//!
//! Discovers matches that just went live and hands each one to the
//! continuation scheduler for its first poll. Already registered matches are
//! left alone, so discovery can run as often as needed.

use crate::config::MonitorConfig;
use crate::entities::MatchRecord;
use crate::processors::continuation::{ContinuationScheduler, ScheduleError};
use crate::processors::timeline_fetcher::{FeedError, TimelineFetcher};
use crate::registry::{MatchRegistry, RegistryError};
use itertools::Itertools;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Errors that can occur during discovery.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The live match list could not be fetched.
    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(#[from] FeedError),

    /// Some matches could not be registered or scheduled.
    #[error("{} of {total} matches failed: {}", .failures.len(), .failures.iter().join("; "))]
    Partial {
        total: usize,
        failures: Vec<MatchScanFailure>,
    },
}

/// Why one discovered match could not be handed off.
#[derive(Debug, Error)]
pub enum MatchScanFailure {
    #[error("match {match_id}: {source}")]
    Registry {
        match_id: String,
        source: RegistryError,
    },

    #[error("match {match_id}: {source}")]
    Schedule {
        match_id: String,
        source: ScheduleError,
    },
}

/// Counts of one discovery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub live: usize,
    pub filtered: usize,
    pub registered: usize,
}

pub struct FleetScanner {
    registry: Arc<dyn MatchRegistry>,
    fetcher: Arc<dyn TimelineFetcher>,
    scheduler: Arc<dyn ContinuationScheduler>,
    config: MonitorConfig,
}

impl FleetScanner {
    pub fn new(
        registry: Arc<dyn MatchRegistry>,
        fetcher: Arc<dyn TimelineFetcher>,
        scheduler: Arc<dyn ContinuationScheduler>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            registry,
            fetcher,
            scheduler,
            config,
        }
    }

    /// Register every new live match and schedule its first poll.
    ///
    /// Matches are handled one after another. A failing match does not stop
    /// the others; all failures come back together as
    /// [`ScanError::Partial`].
    pub async fn discover(&self) -> Result<ScanSummary, ScanError> {
        let live = self.fetcher.fetch_live_matches().await?;
        let mut summary = ScanSummary {
            live: live.len(),
            ..Default::default()
        };
        let mut failures = Vec::new();

        for found in live {
            let match_id = found.identity.match_id.clone();
            if !self.config.accepts(&found.identity.competition_id) {
                summary.filtered += 1;
                continue;
            }
            match self.registry.exists(&match_id).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(source) => {
                    failures.push(MatchScanFailure::Registry { match_id, source });
                    continue;
                }
            }

            let identity = found.identity.clone();
            match self.registry.create(MatchRecord::register(found)).await {
                // Someone else registered it in the meantime and owns the hand-off.
                Ok(false) => continue,
                Ok(true) => {}
                Err(source) => {
                    failures.push(MatchScanFailure::Registry { match_id, source });
                    continue;
                }
            }
            if let Err(source) = self.scheduler.schedule_first(&identity).await {
                // Unregister so the next pass retries the hand-off.
                if let Err(e) = self.registry.delete(&match_id).await {
                    warn!(%match_id, error = %e, "Failed to roll back registration");
                }
                failures.push(MatchScanFailure::Schedule { match_id, source });
                continue;
            }
            info!(%identity, "New live match registered");
            summary.registered += 1;
        }

        if failures.is_empty() {
            Ok(summary)
        } else {
            Err(ScanError::Partial {
                total: summary.live,
                failures,
            })
        }
    }

    /// Run discovery every `interval` until shutdown.
    pub async fn run(self, interval: Duration, mut shutdown_rx: watch::Receiver<bool>) {
        info!(interval_secs = interval.as_secs(), "FleetScanner started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("FleetScanner received shutdown signal");
                        break;
                    }
                }

                _ = ticker.tick() => {
                    match self.discover().await {
                        Ok(summary) => debug!(?summary, "Discovery pass complete"),
                        Err(e) => error!(error = %e, "Discovery pass failed"),
                    }
                }
            }
        }

        info!("FleetScanner stopped");
    }
}

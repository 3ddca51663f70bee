//! MatchMonitor processor.
//!
//! One poll of one match:
//! - Read the registry record (cursor, seen-set, version)
//! - Fetch the timeline and advance the cursor over it
//! - Classify entries not seen before
//! - Persist progress, conditional on the version read
//! - Deliver notifications
//! - Remove the record once the match is over
//!
//! Progress is persisted before anything is delivered, so a crash between
//! the two loses notifications instead of duplicating them.

use crate::config::{ClassifierConfig, ConfigStore};
use crate::entities::{MatchIdentity, MatchLifecycle, MatchProgress};
use crate::events::MatchWorkItem;
use crate::processors::classifier::{Classified, MatchContext, classify};
use crate::processors::cursor_engine::advance;
use crate::processors::notifier::{DeliveryError, NotificationSink};
use crate::processors::timeline_fetcher::{FeedError, TimelineFetcher};
use crate::registry::{MatchRegistry, RegistryError};
use itertools::Itertools;
use kanau::processor::Processor;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during a poll.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The feed could not be read. Nothing was changed.
    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(#[from] FeedError),

    /// The registry could not be read or written. Nothing was delivered.
    #[error("persistence failed: {0}")]
    Persistence(#[from] RegistryError),

    /// Some notifications could not be delivered. Progress was kept.
    #[error("{failed} of {total} notifications failed: {details}")]
    Delivery {
        failed: usize,
        total: usize,
        details: String,
    },
}

impl MonitorError {
    /// Whether polling again later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MonitorError::UpstreamFetch(_) | MonitorError::Persistence(_)
        )
    }
}

/// What should happen to the match after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Still live: poll again.
    Continue,
    /// Match over, record removed.
    Finished,
    /// No record for the match.
    Gone,
}

#[derive(Debug)]
pub struct PollReport {
    pub outcome: PollOutcome,
    /// Notifications delivered successfully.
    pub notified: usize,
    pub delivery_failures: Vec<DeliveryError>,
}

impl PollReport {
    fn gone() -> Self {
        Self {
            outcome: PollOutcome::Gone,
            notified: 0,
            delivery_failures: Vec::new(),
        }
    }

    /// Aggregate delivery failures into one error, if there were any.
    pub fn delivery_error(&self) -> Option<MonitorError> {
        if self.delivery_failures.is_empty() {
            return None;
        }
        Some(MonitorError::Delivery {
            failed: self.delivery_failures.len(),
            total: self.notified + self.delivery_failures.len(),
            details: self.delivery_failures.iter().join("; "),
        })
    }
}

/// Polls one match per call.
///
/// Callers guarantee that two polls of the same match never overlap; if they
/// do anyway, the version check makes the slower one fail with
/// [`RegistryError::Conflict`] before it delivers anything.
#[derive(Clone)]
pub struct MatchMonitor {
    registry: Arc<dyn MatchRegistry>,
    fetcher: Arc<dyn TimelineFetcher>,
    sink: Arc<dyn NotificationSink>,
    classifier: ConfigStore<ClassifierConfig>,
}

impl MatchMonitor {
    pub fn new(
        registry: Arc<dyn MatchRegistry>,
        fetcher: Arc<dyn TimelineFetcher>,
        sink: Arc<dyn NotificationSink>,
        classifier: ConfigStore<ClassifierConfig>,
    ) -> Self {
        Self {
            registry,
            fetcher,
            sink,
            classifier,
        }
    }

    pub async fn poll(&self, identity: &MatchIdentity) -> Result<PollReport, MonitorError> {
        let match_id = identity.match_id.as_str();
        let record = match self.registry.read(match_id).await {
            Ok(record) => record,
            Err(RegistryError::NotFound(_)) => {
                debug!(%match_id, "Match no longer registered");
                return Ok(PollReport::gone());
            }
            Err(e) => return Err(e.into()),
        };

        if record.lifecycle == MatchLifecycle::Done {
            // Everything was delivered already; only the removal is left.
            self.registry.delete(match_id).await?;
            info!(%match_id, "Finished match removed on retry");
            return Ok(PollReport {
                outcome: PollOutcome::Finished,
                notified: 0,
                delivery_failures: Vec::new(),
            });
        }

        let entries = self.fetcher.fetch_timeline(&record.identity).await?;
        let walked = advance(&record.cursor, entries);

        let config = self.classifier.snapshot().await;
        let ctx = MatchContext {
            identity: &record.identity,
            teams: &record.teams,
        };
        let mut seen = record.seen.clone();
        let mut notifications = Vec::new();
        for entry in &walked.new_entries {
            if !seen.insert(&entry.id) {
                continue;
            }
            match classify(entry, ctx, &config, self.fetcher.as_ref()).await {
                Classified::Suppressed => {
                    debug!(%match_id, event_id = %entry.id, kind = %entry.kind, "Suppressed");
                }
                Classified::Diagnostic(text) => {
                    warn!(%match_id, event_id = %entry.id, kind = %entry.kind, "Unrecognized event type");
                    notifications.push(text);
                }
                Classified::Notification(text) => notifications.push(text),
            }
        }

        let finished = walked.done && !walked.pending_found;
        let lifecycle = if finished {
            MatchLifecycle::Done
        } else if walked.pending_found {
            MatchLifecycle::PendingHold
        } else {
            MatchLifecycle::Live
        };

        if seen != record.seen || walked.next_cursor != record.cursor || lifecycle != record.lifecycle
        {
            let progress = MatchProgress {
                cursor: walked.next_cursor.clone(),
                seen,
                lifecycle,
                expected_version: record.version,
            };
            match self.registry.write_cursor_and_seen(match_id, &progress).await {
                Ok(()) => {}
                Err(RegistryError::NotFound(_)) => {
                    debug!(%match_id, "Match removed while polling");
                    return Ok(PollReport::gone());
                }
                Err(e) => return Err(e.into()),
            }
            debug!(%match_id, cursor = %progress.cursor, ?lifecycle, "Progress persisted");
        }

        let mut notified = 0;
        let mut delivery_failures = Vec::new();
        for text in &notifications {
            match self.sink.send(text).await {
                Ok(()) => notified += 1,
                Err(e) => {
                    warn!(%match_id, error = %e, "Failed to deliver notification");
                    delivery_failures.push(e);
                }
            }
        }

        let outcome = if finished {
            self.registry.delete(match_id).await?;
            info!(%match_id, "Match finished, record removed");
            PollOutcome::Finished
        } else {
            PollOutcome::Continue
        };

        Ok(PollReport {
            outcome,
            notified,
            delivery_failures,
        })
    }
}

impl Processor<MatchWorkItem> for MatchMonitor {
    type Output = PollReport;
    type Error = MonitorError;
    #[tracing::instrument(skip_all, err, fields(match_id = %item.identity.match_id, trace_id = ?item.trace_id))]
    async fn process(&self, item: MatchWorkItem) -> Result<PollReport, MonitorError> {
        self.poll(&item.identity).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Cursor, MatchRecord, Score, TimelineEntry};
    use crate::registry::InMemoryRegistry;
    use crate::testing::{FlakyDeleteRegistry, RecordingSink, StaticFetcher, identity, summary};
    use kickfeed_sdk::objects::MatchEventType;

    struct Harness {
        registry: Arc<InMemoryRegistry>,
        fetcher: Arc<StaticFetcher>,
        sink: Arc<RecordingSink>,
        monitor: MatchMonitor,
    }

    async fn harness(fetcher: StaticFetcher, sink: RecordingSink) -> Harness {
        let registry = Arc::new(InMemoryRegistry::new());
        registry
            .create(MatchRecord::register(summary("400")))
            .await
            .unwrap();
        let fetcher = Arc::new(fetcher);
        let sink = Arc::new(sink);
        let mut config = ClassifierConfig::default();
        config.flags.clear();
        let monitor = MatchMonitor::new(
            registry.clone(),
            fetcher.clone(),
            sink.clone(),
            ConfigStore::new(config),
        );
        Harness {
            registry,
            fetcher,
            sink,
            monitor,
        }
    }

    fn goal(id: &str, home: u32, away: u32) -> TimelineEntry {
        let mut entry = TimelineEntry::new(id, MatchEventType::GoalScore);
        entry.home_goals = home;
        entry.away_goals = away;
        entry.match_minute = Some("10'".into());
        entry.description.push("Goal!".into());
        entry
    }

    #[tokio::test]
    async fn test_goal_then_match_end() {
        let mut end = TimelineEntry::new("2", MatchEventType::MatchEnd);
        end.match_minute = Some("90'".into());
        let fetcher = StaticFetcher::default()
            .with_timeline("400", vec![end, goal("1", 1, 0)])
            .with_score(Score {
                home: 1,
                away: 0,
                ..Default::default()
            });
        let h = harness(fetcher, RecordingSink::default()).await;

        let report = h.monitor.poll(&identity("400")).await.unwrap();

        assert_eq!(report.outcome, PollOutcome::Finished);
        assert_eq!(report.notified, 2);
        let sent = h.sink.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], "10' :soccer: Goal! 1 NED : ARG 0");
        assert!(sent[1].contains("1 NED : ARG 0"));
        assert!(!h.registry.exists("400").await.unwrap());
    }

    #[tokio::test]
    async fn test_repoll_sends_nothing_new() {
        let fetcher = StaticFetcher::default().with_timeline("400", vec![goal("1", 1, 0)]);
        let h = harness(fetcher, RecordingSink::default()).await;

        let first = h.monitor.poll(&identity("400")).await.unwrap();
        let version = h.registry.read("400").await.unwrap().version;
        let second = h.monitor.poll(&identity("400")).await.unwrap();

        assert_eq!(first.notified, 1);
        assert_eq!(second.notified, 0);
        assert_eq!(second.outcome, PollOutcome::Continue);
        assert_eq!(h.sink.sent().await.len(), 1);
        // Nothing changed, nothing written.
        assert_eq!(h.registry.read("400").await.unwrap().version, version);
    }

    #[tokio::test]
    async fn test_pending_entry_holds_then_resumes() {
        let pending = TimelineEntry::new("2", MatchEventType::Pending);
        let fetcher = StaticFetcher::default()
            .with_timeline("400", vec![goal("1", 1, 0), pending, goal("3", 2, 0)]);
        let h = harness(fetcher, RecordingSink::default()).await;

        let report = h.monitor.poll(&identity("400")).await.unwrap();
        assert_eq!(report.notified, 1);
        assert_eq!(report.outcome, PollOutcome::Continue);
        let record = h.registry.read("400").await.unwrap();
        assert_eq!(record.lifecycle, MatchLifecycle::PendingHold);
        assert_eq!(record.cursor, Cursor::After("1".into()));

        let mut populated = TimelineEntry::new("2", MatchEventType::Substitution);
        populated.description.push("Weghorst on".into());
        h.fetcher
            .set_timeline("400", vec![goal("1", 1, 0), populated, goal("3", 2, 0)])
            .await;

        let report = h.monitor.poll(&identity("400")).await.unwrap();
        assert_eq!(report.notified, 2);
        let record = h.registry.read("400").await.unwrap();
        assert_eq!(record.lifecycle, MatchLifecycle::Live);
        assert_eq!(record.cursor.as_str(), "3");
        assert_eq!(record.seen.as_slice(), ["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_suppressed_entries_still_advance() {
        let foul = TimelineEntry::new("1", MatchEventType::Foul);
        let fetcher = StaticFetcher::default().with_timeline("400", vec![foul]);
        let h = harness(fetcher, RecordingSink::default()).await;

        let report = h.monitor.poll(&identity("400")).await.unwrap();
        assert_eq!(report.notified, 0);
        let record = h.registry.read("400").await.unwrap();
        assert_eq!(record.cursor.as_str(), "1");
        assert!(record.seen.contains("1"));
    }

    #[tokio::test]
    async fn test_fetch_failure_changes_nothing() {
        let h = harness(StaticFetcher::default(), RecordingSink::default()).await;

        let err = h.monitor.poll(&identity("400")).await.unwrap_err();

        assert!(matches!(err, MonitorError::UpstreamFetch(_)));
        assert!(err.is_retryable());
        let record = h.registry.read("400").await.unwrap();
        assert_eq!(record.version, 0);
        assert_eq!(record.cursor, Cursor::Replay);
    }

    #[tokio::test]
    async fn test_delivery_failure_keeps_progress() {
        let fetcher = StaticFetcher::default()
            .with_timeline("400", vec![goal("1", 1, 0), goal("2", 2, 0)]);
        let sink = RecordingSink::default().failing_on("1 NED");
        let h = harness(fetcher, sink).await;

        let report = h.monitor.poll(&identity("400")).await.unwrap();

        assert_eq!(report.notified, 1);
        assert_eq!(report.delivery_failures.len(), 1);
        let err = report.delivery_error().unwrap();
        assert!(matches!(err, MonitorError::Delivery { failed: 1, total: 2, .. }));
        assert!(!err.is_retryable());
        assert_eq!(h.registry.read("400").await.unwrap().cursor.as_str(), "2");
    }

    #[tokio::test]
    async fn test_unregistered_match_is_gone() {
        let h = harness(StaticFetcher::default(), RecordingSink::default()).await;
        let report = h.monitor.poll(&identity("999")).await.unwrap();
        assert_eq!(report.outcome, PollOutcome::Gone);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_polls_notify_once() {
        let barrier = Arc::new(tokio::sync::Barrier::new(2));
        let fetcher = StaticFetcher::default()
            .with_timeline("400", vec![goal("1", 1, 0)])
            .with_barrier(barrier);
        let h = harness(fetcher, RecordingSink::default()).await;

        let id = identity("400");
        let (a, b) = tokio::join!(h.monitor.poll(&id), h.monitor.poll(&id));

        let conflicts = [&a, &b]
            .into_iter()
            .filter(|r| matches!(r, Err(MonitorError::Persistence(RegistryError::Conflict { .. }))))
            .count();
        assert_eq!(conflicts, 1);
        assert_eq!(h.sink.sent().await.len(), 1);
        assert_eq!(h.registry.read("400").await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_failed_removal_is_retried() {
        let registry = Arc::new(FlakyDeleteRegistry::new(1));
        registry
            .create(MatchRecord::register(summary("400")))
            .await
            .unwrap();
        let mut end = TimelineEntry::new("2", MatchEventType::MatchEnd);
        end.match_minute = Some("90'".into());
        let fetcher = Arc::new(
            StaticFetcher::default().with_timeline("400", vec![goal("1", 1, 0), end]),
        );
        let sink = Arc::new(RecordingSink::default());
        let monitor = MatchMonitor::new(
            registry.clone(),
            fetcher,
            sink.clone(),
            ConfigStore::new(ClassifierConfig::default()),
        );

        let err = monitor.poll(&identity("400")).await.unwrap_err();
        assert!(matches!(err, MonitorError::Persistence(_)));
        assert!(err.is_retryable());
        assert_eq!(
            registry.read("400").await.unwrap().lifecycle,
            MatchLifecycle::Done
        );
        assert_eq!(sink.sent().await.len(), 2);

        let report = monitor.poll(&identity("400")).await.unwrap();
        assert_eq!(report.outcome, PollOutcome::Finished);
        assert_eq!(report.notified, 0);
        assert!(!registry.exists("400").await.unwrap());
        assert_eq!(sink.sent().await.len(), 2);
    }

    #[tokio::test]
    async fn test_processor_entrypoint() {
        let fetcher = StaticFetcher::default().with_timeline("400", vec![goal("1", 1, 0)]);
        let h = harness(fetcher, RecordingSink::default()).await;

        let report = h
            .monitor
            .process(MatchWorkItem::new(identity("400")))
            .await
            .unwrap();
        assert_eq!(report.outcome, PollOutcome::Continue);
        assert_eq!(report.notified, 1);
    }
}

//! Test doubles shared by the unit tests.

use crate::entities::{
    MatchIdentity, MatchProgress, MatchRecord, MatchSummary, Score, TeamDisplay, TimelineEntry,
};
use crate::processors::continuation::{ContinuationScheduler, ScheduleError};
use crate::processors::notifier::{DeliveryError, NotificationSink};
use crate::processors::timeline_fetcher::{FeedError, TimelineFetcher};
use crate::registry::{InMemoryRegistry, MatchRegistry, RegistryError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Barrier, Mutex};
use uuid::Uuid;

pub fn identity(match_id: &str) -> MatchIdentity {
    MatchIdentity {
        competition_id: "17".into(),
        season_id: "255711".into(),
        stage_id: "285063".into(),
        match_id: match_id.into(),
    }
}

pub fn teams() -> TeamDisplay {
    TeamDisplay {
        home_team_name: "Netherlands".into(),
        away_team_name: "Argentina".into(),
        home_team_abbrev: "NED".into(),
        away_team_abbrev: "ARG".into(),
    }
}

pub fn summary(match_id: &str) -> MatchSummary {
    MatchSummary {
        identity: identity(match_id),
        teams: teams(),
    }
}

/// Feed double serving canned data.
#[derive(Default)]
pub struct StaticFetcher {
    live: Mutex<Option<Vec<MatchSummary>>>,
    timelines: Mutex<HashMap<String, Vec<TimelineEntry>>>,
    score: Option<Score>,
    barrier: Option<Arc<Barrier>>,
    timeline_fetches: AtomicUsize,
}

impl StaticFetcher {
    pub fn with_live(self, live: Vec<MatchSummary>) -> Self {
        Self {
            live: Mutex::new(Some(live)),
            ..self
        }
    }

    pub fn with_timeline(self, match_id: &str, entries: Vec<TimelineEntry>) -> Self {
        let mut timelines = self.timelines.into_inner();
        timelines.insert(match_id.to_owned(), entries);
        Self {
            timelines: Mutex::new(timelines),
            ..self
        }
    }

    /// Number of timeline fetches answered or failed so far.
    pub fn timeline_fetches(&self) -> usize {
        self.timeline_fetches.load(Ordering::SeqCst)
    }

    pub async fn set_live(&self, live: Vec<MatchSummary>) {
        *self.live.lock().await = Some(live);
    }

    pub async fn set_timeline(&self, match_id: &str, entries: Vec<TimelineEntry>) {
        self.timelines
            .lock()
            .await
            .insert(match_id.to_owned(), entries);
    }

    pub fn with_score(self, score: Score) -> Self {
        Self {
            score: Some(score),
            ..self
        }
    }

    pub fn failing_score(self) -> Self {
        Self {
            score: None,
            ..self
        }
    }

    /// Every timeline fetch waits on `barrier` before answering.
    pub fn with_barrier(self, barrier: Arc<Barrier>) -> Self {
        Self {
            barrier: Some(barrier),
            ..self
        }
    }
}

#[async_trait]
impl TimelineFetcher for StaticFetcher {
    async fn fetch_live_matches(&self) -> Result<Vec<MatchSummary>, FeedError> {
        self.live
            .lock()
            .await
            .clone()
            .ok_or_else(|| FeedError::MissingMatch("live".into()))
    }

    async fn fetch_timeline(
        &self,
        identity: &MatchIdentity,
    ) -> Result<Vec<TimelineEntry>, FeedError> {
        self.timeline_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        self.timelines
            .lock()
            .await
            .get(&identity.match_id)
            .cloned()
            .ok_or_else(|| FeedError::MissingMatch(identity.match_id.clone()))
    }

    async fn fetch_score(&self, identity: &MatchIdentity) -> Result<Score, FeedError> {
        self.score
            .ok_or_else(|| FeedError::MissingMatch(identity.match_id.clone()))
    }
}

/// Sink double recording every delivered text.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingSink {
    /// Reject every text containing `needle`.
    pub fn failing_on(self, needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_owned()),
            ..self
        }
    }

    pub async fn sent(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        if self.fail_on.as_deref().is_some_and(|needle| text.contains(needle)) {
            return Err(DeliveryError::Rejected {
                status: 500,
                body: "rejected".into(),
            });
        }
        self.sent.lock().await.push(text.to_owned());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheduled {
    First(String),
    Next(String, Option<Uuid>),
}

/// Scheduler double recording every request.
#[derive(Default)]
pub struct RecordingScheduler {
    scheduled: Mutex<Vec<Scheduled>>,
}

impl RecordingScheduler {
    pub async fn scheduled(&self) -> Vec<Scheduled> {
        self.scheduled.lock().await.clone()
    }
}

#[async_trait]
impl ContinuationScheduler for RecordingScheduler {
    async fn schedule_first(&self, identity: &MatchIdentity) -> Result<(), ScheduleError> {
        self.scheduled
            .lock()
            .await
            .push(Scheduled::First(identity.match_id.clone()));
        Ok(())
    }

    async fn schedule_next(
        &self,
        identity: &MatchIdentity,
        trace_id: Option<Uuid>,
    ) -> Result<(), ScheduleError> {
        self.scheduled
            .lock()
            .await
            .push(Scheduled::Next(identity.match_id.clone(), trace_id));
        Ok(())
    }
}

/// In-memory registry whose first `failures` deletes fail.
pub struct FlakyDeleteRegistry {
    inner: InMemoryRegistry,
    failures: AtomicUsize,
}

impl FlakyDeleteRegistry {
    pub fn new(failures: usize) -> Self {
        Self {
            inner: InMemoryRegistry::new(),
            failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl MatchRegistry for FlakyDeleteRegistry {
    async fn exists(&self, match_id: &str) -> Result<bool, RegistryError> {
        self.inner.exists(match_id).await
    }

    async fn create(&self, record: MatchRecord) -> Result<bool, RegistryError> {
        self.inner.create(record).await
    }

    async fn read(&self, match_id: &str) -> Result<MatchRecord, RegistryError> {
        self.inner.read(match_id).await
    }

    async fn write_cursor_and_seen(
        &self,
        match_id: &str,
        progress: &MatchProgress,
    ) -> Result<(), RegistryError> {
        self.inner.write_cursor_and_seen(match_id, progress).await
    }

    async fn delete(&self, match_id: &str) -> Result<(), RegistryError> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(RegistryError::Serialization("connection reset".into()));
        }
        self.inner.delete(match_id).await
    }

    async fn list_live(&self) -> Result<Vec<MatchRecord>, RegistryError> {
        self.inner.list_live().await
    }
}

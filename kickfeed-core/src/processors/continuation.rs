//! Continuation scheduling: how a live match gets its next poll.

use crate::entities::MatchIdentity;
use crate::events::MatchWorkItem;
use crate::queue::{QueueError, WorkQueue};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Errors that can occur while scheduling a poll.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
}

/// Arranges future polls of a live match.
#[async_trait]
pub trait ContinuationScheduler: Send + Sync {
    /// First poll of a newly registered match, as soon as possible.
    async fn schedule_first(&self, identity: &MatchIdentity) -> Result<(), ScheduleError>;

    /// Next poll of a match that is still live after a poll.
    async fn schedule_next(
        &self,
        identity: &MatchIdentity,
        trace_id: Option<Uuid>,
    ) -> Result<(), ScheduleError>;
}

/// Scheduler of the daemon loop.
///
/// Every round polls all live registry records, so there is nothing to
/// emit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DaemonScheduler;

#[async_trait]
impl ContinuationScheduler for DaemonScheduler {
    async fn schedule_first(&self, identity: &MatchIdentity) -> Result<(), ScheduleError> {
        debug!(match_id = %identity.match_id, "Match picked up by the next round");
        Ok(())
    }

    async fn schedule_next(
        &self,
        _identity: &MatchIdentity,
        _trace_id: Option<Uuid>,
    ) -> Result<(), ScheduleError> {
        Ok(())
    }
}

/// Scheduler that re-submits a continuation message to a work queue.
#[derive(Clone)]
pub struct QueueScheduler {
    queue: Arc<dyn WorkQueue>,
    delay: Duration,
}

impl QueueScheduler {
    /// * `delay` – delivery delay of every continuation after the first.
    pub fn new(queue: Arc<dyn WorkQueue>, delay: Duration) -> Self {
        Self { queue, delay }
    }
}

#[async_trait]
impl ContinuationScheduler for QueueScheduler {
    async fn schedule_first(&self, identity: &MatchIdentity) -> Result<(), ScheduleError> {
        let item = MatchWorkItem {
            identity: identity.clone(),
            trace_id: Some(Uuid::now_v7()),
        };
        debug!(match_id = %identity.match_id, trace_id = ?item.trace_id, "Scheduling first poll");
        self.queue.push(item.into(), Duration::ZERO).await?;
        Ok(())
    }

    async fn schedule_next(
        &self,
        identity: &MatchIdentity,
        trace_id: Option<Uuid>,
    ) -> Result<(), ScheduleError> {
        let item = MatchWorkItem {
            identity: identity.clone(),
            trace_id,
        };
        self.queue.push(item.into(), self.delay).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::ChannelQueue;
    use crate::testing::identity;

    #[tokio::test]
    async fn test_first_poll_is_immediate_with_trace() {
        let queue = Arc::new(ChannelQueue::new());
        let scheduler = QueueScheduler::new(queue.clone(), Duration::from_secs(60));

        scheduler.schedule_first(&identity("400")).await.unwrap();

        let item = queue.pop().await.unwrap().unwrap();
        assert_eq!(item.message.match_id, "400");
        assert_eq!(item.message.stage_id, identity("400").stage_id);
        assert!(item.message.trace_id.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_poll_keeps_trace_and_waits() {
        let queue = Arc::new(ChannelQueue::new());
        let scheduler = QueueScheduler::new(queue.clone(), Duration::from_secs(60));
        let trace = Uuid::now_v7();

        let started = tokio::time::Instant::now();
        scheduler
            .schedule_next(&identity("400"), Some(trace))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(58)).await;
        assert!(queue.pop().await.unwrap().is_none());

        let item = queue.pop().await.unwrap().unwrap();
        assert_eq!(item.message.trace_id, Some(trace));
        assert!(started.elapsed() >= Duration::from_secs(60));
    }
}

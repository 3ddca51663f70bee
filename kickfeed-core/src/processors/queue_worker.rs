//! QueueWorker: consumes continuation messages from a [`WorkQueue`].
//!
//! Each message runs one poll in its own task. A match that is still live
//! afterwards gets its continuation re-emitted; a finished or unknown match
//! gets nothing, which ends its chain.

use crate::events::MatchWorkItem;
use crate::processors::continuation::ContinuationScheduler;
use crate::processors::match_monitor::{MatchMonitor, PollOutcome};
use crate::queue::{QueuedItem, WorkQueue};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Pause after a queue error before popping again.
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Polls started recently, per match.
#[derive(Default)]
struct PollLog {
    in_flight: HashSet<String>,
    started: HashMap<String, Instant>,
}

pub struct QueueWorker {
    queue: Arc<dyn WorkQueue>,
    monitor: MatchMonitor,
    scheduler: Arc<dyn ContinuationScheduler>,
    min_spacing: Duration,
    shutdown_rx: watch::Receiver<bool>,
    polls: Arc<Mutex<PollLog>>,
}

impl QueueWorker {
    /// * `scheduler` – re-emits continuations; normally a
    ///   [`QueueScheduler`](crate::processors::continuation::QueueScheduler)
    ///   over the same queue.
    /// * `continuation_delay` – the delay `scheduler` pushes with. An item
    ///   for a match that is in flight, or whose poll started less than half
    ///   of it ago, is a duplicate and gets dropped: the earlier poll owns
    ///   the chain.
    pub fn new(
        queue: Arc<dyn WorkQueue>,
        monitor: MatchMonitor,
        scheduler: Arc<dyn ContinuationScheduler>,
        continuation_delay: Duration,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            queue,
            monitor,
            scheduler,
            min_spacing: continuation_delay / 2,
            shutdown_rx,
            polls: Arc::new(Mutex::new(PollLog::default())),
        }
    }

    /// Consume until shutdown, then wait for running polls to finish.
    ///
    /// `pop` is never raced against anything: a leased item that got
    /// dropped mid-flight would stay hidden until its lease ran out. Queues
    /// return `Ok(None)` after a short wait, which bounds shutdown latency.
    pub async fn run(self) {
        info!("QueueWorker started");
        let mut tasks = JoinSet::new();

        loop {
            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = joined {
                    error!(error = %e, "Poll task panicked");
                }
            }
            if *self.shutdown_rx.borrow() {
                info!("QueueWorker received shutdown signal");
                break;
            }

            match self.queue.pop().await {
                Ok(Some(item)) => self.dispatch(item, &mut tasks).await,
                Ok(None) => {}
                Err(e) => {
                    error!(error = %e, "Failed to pop work item");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Poll task panicked");
            }
        }
        info!("QueueWorker stopped");
    }

    async fn dispatch(&self, item: QueuedItem, tasks: &mut JoinSet<()>) {
        let work = MatchWorkItem::from(item.message.clone());
        let match_id = work.match_id().to_owned();

        let now = Instant::now();
        let duplicate = {
            let mut polls = self.polls.lock().await;
            let min_spacing = self.min_spacing;
            polls
                .started
                .retain(|_, at| now.duration_since(*at) < min_spacing);
            if polls.in_flight.contains(&match_id) || polls.started.contains_key(&match_id) {
                true
            } else {
                polls.in_flight.insert(match_id.clone());
                polls.started.insert(match_id.clone(), now);
                false
            }
        };
        if duplicate {
            debug!(%match_id, "Duplicate continuation, dropping");
            ack(self.queue.as_ref(), &item).await;
            return;
        }

        let queue = Arc::clone(&self.queue);
        let monitor = self.monitor.clone();
        let scheduler = Arc::clone(&self.scheduler);
        let polls = Arc::clone(&self.polls);
        tasks.spawn(async move {
            let reschedule = match monitor.poll(&work.identity).await {
                Ok(report) => {
                    if let Some(e) = report.delivery_error() {
                        warn!(%match_id, error = %e, "Some notifications were not delivered");
                    }
                    report.outcome == PollOutcome::Continue
                }
                Err(e) => {
                    warn!(%match_id, error = %e, retryable = e.is_retryable(), "Poll failed");
                    e.is_retryable()
                }
            };

            let handed_on = if reschedule {
                match scheduler.schedule_next(&work.identity, work.trace_id).await {
                    Ok(()) => true,
                    Err(e) => {
                        error!(%match_id, error = %e, "Failed to schedule next poll");
                        false
                    }
                }
            } else {
                debug!(%match_id, "Polling chain ended");
                true
            };

            polls.lock().await.in_flight.remove(&match_id);
            // Without a successor the lease is left to expire so the item
            // comes back.
            if handed_on {
                ack(queue.as_ref(), &item).await;
            }
        });
    }
}

async fn ack(queue: &dyn WorkQueue, item: &QueuedItem) {
    if let Err(e) = queue.ack(item).await {
        warn!(match_id = %item.message.match_id, error = %e, "Failed to ack work item");
    }
}

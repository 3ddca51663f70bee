use super::{QueueError, QueuedItem, WorkQueue};
use crate::entities::continuation_queue::{
    AckContinuation, EnqueueContinuation, LeaseContinuation,
};
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;
use kickfeed_sdk::objects::ContinuationMessage;
use std::time::Duration;
use tracing::debug;

/// Durable queue on the `continuation_queue` table.
///
/// A popped row stays hidden for the lease duration. If the worker dies
/// before acking, the row becomes visible again and is redelivered.
#[derive(Debug, Clone)]
pub struct PgWorkQueue {
    db: DatabaseProcessor,
    lease: Duration,
    poll_wait: Duration,
}

impl PgWorkQueue {
    pub const DEFAULT_LEASE: Duration = Duration::from_secs(300);
    pub const DEFAULT_POLL_WAIT: Duration = Duration::from_secs(1);

    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            db: DatabaseProcessor { pool },
            lease: Self::DEFAULT_LEASE,
            poll_wait: Self::DEFAULT_POLL_WAIT,
        }
    }

    /// How long a popped item stays hidden before redelivery.
    pub fn with_lease(mut self, lease: Duration) -> Self {
        self.lease = lease;
        self
    }
}

#[async_trait]
impl WorkQueue for PgWorkQueue {
    async fn push(&self, message: ContinuationMessage, delay: Duration) -> Result<(), QueueError> {
        let id = self
            .db
            .process(EnqueueContinuation {
                message,
                delay_secs: delay.as_secs_f64(),
            })
            .await?;
        debug!(queue_id = id, delay_secs = delay.as_secs(), "Continuation enqueued");
        Ok(())
    }

    async fn pop(&self) -> Result<Option<QueuedItem>, QueueError> {
        let leased = self
            .db
            .process(LeaseContinuation {
                lease_secs: self.lease.as_secs_f64(),
            })
            .await?;
        match leased {
            Some(row) => {
                if row.attempts > 1 {
                    debug!(queue_id = row.id, attempts = row.attempts, "Redelivering continuation");
                }
                Ok(Some(QueuedItem {
                    receipt: row.id,
                    message: row.payload.0,
                }))
            }
            None => {
                tokio::time::sleep(self.poll_wait).await;
                Ok(None)
            }
        }
    }

    async fn ack(&self, item: &QueuedItem) -> Result<(), QueueError> {
        self.db.process(AckContinuation { id: item.receipt }).await?;
        Ok(())
    }
}

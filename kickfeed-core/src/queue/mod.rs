//! Delayed work queues carrying continuation messages.
//!
//! Delivery is at-least-once. A popped item must be acked once its poll has
//! been handled and its successor, if any, pushed.

mod channel;
mod postgres;

pub use channel::ChannelQueue;
pub use postgres::PgWorkQueue;

use async_trait::async_trait;
use kickfeed_sdk::objects::ContinuationMessage;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to a work queue.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The queue no longer accepts or yields items.
    #[error("queue closed")]
    Closed,
}

/// One leased message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedItem {
    /// Transport-specific handle passed back to [`WorkQueue::ack`].
    pub receipt: i64,
    pub message: ContinuationMessage,
}

#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Enqueue `message`, visible to consumers after `delay`.
    async fn push(&self, message: ContinuationMessage, delay: Duration) -> Result<(), QueueError>;

    /// Take the next visible message.
    ///
    /// Waits a short, bounded time and returns `Ok(None)` if nothing became
    /// ready. Callers must not cancel a pending pop: a leasing transport may
    /// already have hidden the item.
    async fn pop(&self) -> Result<Option<QueuedItem>, QueueError>;

    /// Acknowledge a popped message so it is never delivered again.
    async fn ack(&self, item: &QueuedItem) -> Result<(), QueueError>;
}

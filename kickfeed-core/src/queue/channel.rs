use super::{QueueError, QueuedItem, WorkQueue};
use crate::events::{ContinuationReceiver, ContinuationSender, continuation_channel};
use async_trait::async_trait;
use kickfeed_sdk::objects::ContinuationMessage;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::warn;

/// In-process queue over a tokio mpsc channel.
///
/// Delayed pushes park on a sleeping task. Nothing survives a restart, and
/// acking is a no-op: an item is gone once popped.
pub struct ChannelQueue {
    tx: ContinuationSender,
    rx: Mutex<ContinuationReceiver>,
    poll_wait: Duration,
}

impl ChannelQueue {
    pub const DEFAULT_POLL_WAIT: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        let (tx, rx) = continuation_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            poll_wait: Self::DEFAULT_POLL_WAIT,
        }
    }
}

impl Default for ChannelQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkQueue for ChannelQueue {
    async fn push(&self, message: ContinuationMessage, delay: Duration) -> Result<(), QueueError> {
        if delay.is_zero() {
            return self.tx.send(message).await.map_err(|_| QueueError::Closed);
        }
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let match_id = message.match_id.clone();
            if tx.send(message).await.is_err() {
                warn!(%match_id, "Continuation dropped, queue receiver gone");
            }
        });
        Ok(())
    }

    async fn pop(&self) -> Result<Option<QueuedItem>, QueueError> {
        let mut rx = self.rx.lock().await;
        match tokio::time::timeout(self.poll_wait, rx.recv()).await {
            Ok(Some(message)) => Ok(Some(QueuedItem { receipt: 0, message })),
            Ok(None) => Err(QueueError::Closed),
            Err(_) => Ok(None),
        }
    }

    async fn ack(&self, _item: &QueuedItem) -> Result<(), QueueError> {
        Ok(())
    }
}

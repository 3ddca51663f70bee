//! In-process channel factories.

use kickfeed_sdk::objects::ContinuationMessage;
use tokio::sync::mpsc;

/// Default buffer size for in-process channels.
///
/// Large enough to absorb a discovery burst while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for continuation messages.
pub type ContinuationSender = mpsc::Sender<ContinuationMessage>;
/// Receiver handle for continuation messages.
pub type ContinuationReceiver = mpsc::Receiver<ContinuationMessage>;

/// Create a new continuation channel.
pub fn continuation_channel() -> (ContinuationSender, ContinuationReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

//! Work item types.
//!
//! Work items only carry identifiers. The monitor re-reads cursor and
//! seen-set from the registry on every poll.

use crate::entities::MatchIdentity;
use kickfeed_sdk::objects::ContinuationMessage;
use uuid::Uuid;

/// Request to poll one match once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchWorkItem {
    pub identity: MatchIdentity,
    /// Correlation token of the match's polling chain, when queued.
    pub trace_id: Option<Uuid>,
}

impl MatchWorkItem {
    pub fn new(identity: MatchIdentity) -> Self {
        Self {
            identity,
            trace_id: None,
        }
    }

    pub fn match_id(&self) -> &str {
        &self.identity.match_id
    }
}

impl From<ContinuationMessage> for MatchWorkItem {
    fn from(message: ContinuationMessage) -> Self {
        Self {
            identity: MatchIdentity {
                competition_id: message.competition_id,
                season_id: message.season_id,
                stage_id: message.stage_id,
                match_id: message.match_id,
            },
            trace_id: message.trace_id,
        }
    }
}

impl From<MatchWorkItem> for ContinuationMessage {
    fn from(item: MatchWorkItem) -> Self {
        Self {
            competition_id: item.identity.competition_id,
            season_id: item.identity.season_id,
            stage_id: item.identity.stage_id,
            match_id: item.identity.match_id,
            trace_id: item.trace_id,
        }
    }
}

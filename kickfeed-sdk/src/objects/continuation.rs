//! Continuation message wire format.
//!
//! A continuation message only identifies a match. The resume cursor is
//! absent: the receiver reads it from the registry, which is
//! the source of truth.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of a self-addressed continuation work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationMessage {
    pub competition_id: String,
    pub season_id: String,
    pub stage_id: String,
    pub match_id: String,
    /// Correlation token carried across the whole polling chain of a match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Uuid>,
}

//! Upstream football feed, seen from the core.

use crate::entities::{MatchIdentity, MatchSummary, Score, TimelineEntry};
use async_trait::async_trait;
use kickfeed_sdk::client::{ClientError, FeedClient};
use thiserror::Error;

/// Errors raised while talking to the football feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP or decoding failure in the feed client.
    #[error("feed client error: {0}")]
    Client(#[from] ClientError),

    /// The feed answered but carried no usable data for the match.
    #[error("feed has no data for match {0}")]
    MissingMatch(String),
}

/// Source of live matches, timelines and running scores.
///
/// No retry policy lives behind this trait. Callers decide what a failed
/// fetch means.
#[async_trait]
pub trait TimelineFetcher: Send + Sync {
    /// Matches currently in play.
    async fn fetch_live_matches(&self) -> Result<Vec<MatchSummary>, FeedError>;

    /// Full, unordered timeline of one match.
    async fn fetch_timeline(
        &self,
        identity: &MatchIdentity,
    ) -> Result<Vec<TimelineEntry>, FeedError>;

    /// Running score, including shootout tallies when present.
    async fn fetch_score(&self, identity: &MatchIdentity) -> Result<Score, FeedError>;
}

#[async_trait]
impl TimelineFetcher for FeedClient {
    async fn fetch_live_matches(&self) -> Result<Vec<MatchSummary>, FeedError> {
        let matches = self.live_matches().await?;
        Ok(matches.into_iter().map(MatchSummary::from).collect())
    }

    async fn fetch_timeline(
        &self,
        identity: &MatchIdentity,
    ) -> Result<Vec<TimelineEntry>, FeedError> {
        let timeline = self
            .timeline(
                &identity.competition_id,
                &identity.season_id,
                &identity.stage_id,
                &identity.match_id,
            )
            .await?;
        Ok(timeline
            .events
            .into_iter()
            .map(TimelineEntry::from)
            .collect())
    }

    async fn fetch_score(&self, identity: &MatchIdentity) -> Result<Score, FeedError> {
        let live = self
            .live_match(
                &identity.competition_id,
                &identity.season_id,
                &identity.stage_id,
                &identity.match_id,
            )
            .await?;
        if live.home.is_none() && live.away.is_none() {
            return Err(FeedError::MissingMatch(identity.match_id.clone()));
        }
        Ok(Score::from(&live))
    }
}

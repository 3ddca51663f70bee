//! Response types of the upstream football feed.
//!
//! Field names follow the feed's PascalCase JSON. Everything the monitor
//! does not strictly need is `#[serde(default)]` so partially populated
//! live payloads still parse.

use serde::{Deserialize, Serialize};

use super::event_type::{MatchEventType, Period};

/// A localized string as the feed returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocalizedText {
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub description: String,
}

/// Response of `GET /live/football/now`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LiveMatchesResponse {
    #[serde(default)]
    pub results: Vec<FeedMatch>,
}

/// One match as listed by the live endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMatch {
    #[serde(rename = "IdCompetition")]
    pub competition_id: String,
    #[serde(rename = "IdSeason")]
    pub season_id: String,
    #[serde(rename = "IdStage")]
    pub stage_id: String,
    #[serde(rename = "IdMatch")]
    pub match_id: String,
    #[serde(rename = "Home", default)]
    pub home: Option<FeedTeam>,
    #[serde(rename = "Away", default)]
    pub away: Option<FeedTeam>,
    #[serde(rename = "HomeTeamPenaltyScore", default)]
    pub home_penalty_score: Option<u32>,
    #[serde(rename = "AwayTeamPenaltyScore", default)]
    pub away_penalty_score: Option<u32>,
    #[serde(rename = "Period", default)]
    pub period: Option<Period>,
}

/// Team block of a [`FeedMatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeedTeam {
    #[serde(default)]
    pub team_name: Vec<LocalizedText>,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub score: Option<u32>,
}

impl FeedTeam {
    /// First localized name, or an empty string.
    pub fn display_name(&self) -> &str {
        self.team_name
            .first()
            .map(|name| name.description.as_str())
            .unwrap_or_default()
    }
}

/// Response of `GET /timelines/{competition}/{season}/{stage}/{match}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineResponse {
    #[serde(rename = "IdCompetition", default)]
    pub competition_id: String,
    #[serde(rename = "IdSeason", default)]
    pub season_id: String,
    #[serde(rename = "IdStage", default)]
    pub stage_id: String,
    #[serde(rename = "IdMatch", default)]
    pub match_id: String,
    #[serde(rename = "Event", default)]
    pub events: Vec<TimelineEvent>,
}

/// One raw timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimelineEvent {
    pub event_id: String,
    #[serde(rename = "Type")]
    pub event_type: MatchEventType,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub match_minute: Option<String>,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub home_goals: u32,
    #[serde(default)]
    pub away_goals: u32,
    #[serde(default)]
    pub home_penalty_goals: u32,
    #[serde(default)]
    pub away_penalty_goals: u32,
    #[serde(default)]
    pub event_description: Vec<LocalizedText>,
}

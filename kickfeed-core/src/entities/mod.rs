pub mod continuation_queue;
pub mod cursor;
pub mod match_records;
pub mod seen;

pub use cursor::Cursor;
pub use seen::SeenEventIds;

use kickfeed_sdk::objects::{FeedMatch, MatchEventType, Period, TimelineEvent};
use serde::{Deserialize, Serialize};

/// Immutable coordinates of a match in the upstream feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchIdentity {
    pub competition_id: String,
    pub season_id: String,
    pub stage_id: String,
    pub match_id: String,
}

impl std::fmt::Display for MatchIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.competition_id, self.season_id, self.stage_id, self.match_id
        )
    }
}

/// Display fields captured at discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDisplay {
    pub home_team_name: String,
    pub away_team_name: String,
    pub home_team_abbrev: String,
    pub away_team_abbrev: String,
}

/// A live match as reported by the feed's live list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSummary {
    pub identity: MatchIdentity,
    pub teams: TeamDisplay,
}

impl From<FeedMatch> for MatchSummary {
    fn from(m: FeedMatch) -> Self {
        let name = |team: &Option<kickfeed_sdk::objects::FeedTeam>| {
            team.as_ref()
                .map(|t| t.display_name().to_owned())
                .unwrap_or_default()
        };
        let abbrev = |team: &Option<kickfeed_sdk::objects::FeedTeam>| {
            team.as_ref()
                .and_then(|t| t.abbreviation.clone())
                .unwrap_or_default()
        };
        let teams = TeamDisplay {
            home_team_name: name(&m.home),
            away_team_name: name(&m.away),
            home_team_abbrev: abbrev(&m.home),
            away_team_abbrev: abbrev(&m.away),
        };
        Self {
            identity: MatchIdentity {
                competition_id: m.competition_id,
                season_id: m.season_id,
                stage_id: m.stage_id,
                match_id: m.match_id,
            },
            teams,
        }
    }
}

/// Lifecycle of a registry record.
///
/// `Deleted` is never stored: reaching it removes the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "match_lifecycle")]
#[serde(rename_all = "snake_case")]
pub enum MatchLifecycle {
    Live,
    /// Last poll stopped at an entry the feed has not finished populating.
    PendingHold,
    Done,
    Deleted,
}

impl MatchLifecycle {
    /// Whether the match still needs a poll. A `Done` record gets one more
    /// so a failed removal is retried.
    pub fn needs_poll(self) -> bool {
        self != MatchLifecycle::Deleted
    }
}

/// Running score of a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub home: u32,
    pub away: u32,
    /// Shootout tallies, present once a shootout has started.
    pub home_penalties: Option<u32>,
    pub away_penalties: Option<u32>,
}

impl From<&FeedMatch> for Score {
    fn from(m: &FeedMatch) -> Self {
        Self {
            home: m.home.as_ref().and_then(|t| t.score).unwrap_or_default(),
            away: m.away.as_ref().and_then(|t| t.score).unwrap_or_default(),
            home_penalties: m.home_penalty_score,
            away_penalties: m.away_penalty_score,
        }
    }
}

/// One entry of a match timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub id: String,
    pub kind: MatchEventType,
    pub timestamp: Option<String>,
    pub match_minute: Option<String>,
    pub period: Period,
    pub home_goals: u32,
    pub away_goals: u32,
    pub home_penalty_goals: u32,
    pub away_penalty_goals: u32,
    pub description: Vec<String>,
}

impl TimelineEntry {
    /// Minimal entry, mostly useful for building timelines by hand.
    pub fn new(id: impl Into<String>, kind: MatchEventType) -> Self {
        Self {
            id: id.into(),
            kind,
            timestamp: None,
            match_minute: None,
            period: Period::default(),
            home_goals: 0,
            away_goals: 0,
            home_penalty_goals: 0,
            away_penalty_goals: 0,
            description: Vec::new(),
        }
    }
}

impl From<TimelineEvent> for TimelineEntry {
    fn from(e: TimelineEvent) -> Self {
        Self {
            id: e.event_id,
            kind: e.event_type,
            timestamp: e.timestamp,
            match_minute: e.match_minute,
            period: e.period,
            home_goals: e.home_goals,
            away_goals: e.away_goals,
            home_penalty_goals: e.home_penalty_goals,
            away_penalty_goals: e.away_penalty_goals,
            description: e
                .event_description
                .into_iter()
                .map(|text| text.description)
                .collect(),
        }
    }
}

/// A registry record: identity, display fields and polling progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub identity: MatchIdentity,
    pub teams: TeamDisplay,
    pub cursor: Cursor,
    pub seen: SeenEventIds,
    pub lifecycle: MatchLifecycle,
    /// Bumped on every progress write.
    pub version: i64,
    pub registered_at: time::PrimitiveDateTime,
}

impl MatchRecord {
    /// Fresh record for a match found by discovery.
    pub fn register(summary: MatchSummary) -> Self {
        let now = time::OffsetDateTime::now_utc();
        Self {
            identity: summary.identity,
            teams: summary.teams,
            cursor: Cursor::Replay,
            seen: SeenEventIds::new(),
            lifecycle: MatchLifecycle::Live,
            version: 0,
            registered_at: time::PrimitiveDateTime::new(now.date(), now.time()),
        }
    }

    pub fn match_id(&self) -> &str {
        &self.identity.match_id
    }
}

/// State written back by the monitor after a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchProgress {
    pub cursor: Cursor,
    pub seen: SeenEventIds,
    pub lifecycle: MatchLifecycle,
    /// Version observed when the record was read; the write is refused if
    /// the stored version moved on since.
    pub expected_version: i64,
}

//! Turns timeline entries into Slack-ready text.

use crate::config::ClassifierConfig;
use crate::entities::{MatchIdentity, Score, TeamDisplay, TimelineEntry};
use crate::processors::timeline_fetcher::TimelineFetcher;
use kickfeed_sdk::objects::{MatchEventType, Period};
use tracing::warn;

/// Outcome of classifying one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Notification(String),
    /// Placeholder for an entry type nobody has taught the classifier yet.
    Diagnostic(String),
    Suppressed,
}

/// The match an entry belongs to.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub identity: &'a MatchIdentity,
    pub teams: &'a TeamDisplay,
}

/// Classify one entry.
///
/// Period-boundary entries look up the running score through `fetcher`; a
/// failed lookup renders as `0 : 0` rather than failing the poll.
pub async fn classify(
    entry: &TimelineEntry,
    ctx: MatchContext<'_>,
    config: &ClassifierConfig,
    fetcher: &dyn TimelineFetcher,
) -> Classified {
    if config.is_suppressed(entry.kind, entry.period) {
        return Classified::Suppressed;
    }
    let score = if needs_running_score(entry.kind) {
        match fetcher.fetch_score(ctx.identity).await {
            Ok(score) => Some(score),
            Err(e) => {
                warn!(
                    match_id = %ctx.identity.match_id,
                    event_id = %entry.id,
                    error = %e,
                    "Failed to fetch running score, rendering 0 : 0"
                );
                Some(Score::default())
            }
        }
    } else {
        None
    };
    render(entry, ctx.teams, config, score)
}

fn needs_running_score(kind: MatchEventType) -> bool {
    matches!(kind, MatchEventType::MatchEnd | MatchEventType::HalfEnd)
}

/// Render an entry that passed the suppression check. `score` is the
/// running score for period-boundary types.
pub fn render(
    entry: &TimelineEntry,
    teams: &TeamDisplay,
    config: &ClassifierConfig,
    score: Option<Score>,
) -> Classified {
    let home_flag = config.flag(&teams.home_team_abbrev);
    let away_flag = config.flag(&teams.away_team_abbrev);
    let shootout = entry.period == Period::PenaltyShootout;
    let fetched = score.unwrap_or_default();

    let (prefix, suffix) = match entry.kind {
        MatchEventType::GoalScore | MatchEventType::OwnGoal | MatchEventType::PenaltyGoal => {
            let line = ScoreLine {
                home_label: &teams.home_team_abbrev,
                away_label: &teams.away_team_abbrev,
                home_flag,
                away_flag,
                home: entry.home_goals,
                away: entry.away_goals,
                penalties: shootout.then_some((entry.home_penalty_goals, entry.away_penalty_goals)),
            };
            (":soccer:", line.to_string())
        }
        MatchEventType::YellowCard | MatchEventType::DoubleYellow => {
            (":large_yellow_square:", String::new())
        }
        MatchEventType::RedCard => (":large_red_square:", String::new()),
        MatchEventType::Substitution => (":arrows_counterclockwise:", String::new()),
        MatchEventType::MatchStart => (
            ":clock12:",
            join_words([
                teams.home_team_name.as_str(),
                home_flag.unwrap_or_default(),
                "vs",
                away_flag.unwrap_or_default(),
                teams.away_team_name.as_str(),
            ]),
        ),
        MatchEventType::MatchEnd => {
            let line = ScoreLine {
                home_label: &teams.home_team_abbrev,
                away_label: &teams.away_team_abbrev,
                home_flag,
                away_flag,
                home: fetched.home,
                away: fetched.away,
                penalties: shootout.then(|| shootout_tallies(entry, &fetched)),
            };
            (":clock12:", line.to_string())
        }
        MatchEventType::HalfEnd => {
            let line = ScoreLine {
                home_label: &teams.home_team_name,
                away_label: &teams.away_team_name,
                home_flag,
                away_flag,
                home: fetched.home,
                away: fetched.away,
                penalties: shootout.then(|| shootout_tallies(entry, &fetched)),
            };
            (":clock1230:", line.to_string())
        }
        MatchEventType::PenaltyMissed | MatchEventType::PenaltyMissed2 => {
            (":no_entry_sign:", String::new())
        }
        MatchEventType::PenaltyAwarded => ("Penalty awarded!", String::new()),
        _ => ("", String::new()),
    };

    let description = entry.description.first().map(String::as_str).unwrap_or_default();
    let body = join_words([prefix, description, suffix.as_str()]);

    if body.is_empty() {
        if entry.kind.is_unrecognized() {
            return Classified::Diagnostic(format!(
                "[EVENTINFO] Need info for event type: {}",
                entry.kind.code()
            ));
        }
        return Classified::Suppressed;
    }

    match entry.match_minute.as_deref().map(str::trim) {
        Some(minute) if !minute.is_empty() => {
            Classified::Notification(format!("{minute} {body}"))
        }
        _ => Classified::Notification(body),
    }
}

fn shootout_tallies(entry: &TimelineEntry, score: &Score) -> (u32, u32) {
    (
        score.home_penalties.unwrap_or(entry.home_penalty_goals),
        score.away_penalties.unwrap_or(entry.away_penalty_goals),
    )
}

/// Join the non-empty, trimmed parts with single spaces.
fn join_words<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `1 NED :flag-nl: : :flag-ar: ARG 0`, or `1 (4) NED : ARG (3) 1` in a
/// shootout.
struct ScoreLine<'a> {
    home_label: &'a str,
    away_label: &'a str,
    home_flag: Option<&'a str>,
    away_flag: Option<&'a str>,
    home: u32,
    away: u32,
    penalties: Option<(u32, u32)>,
}

impl std::fmt::Display for ScoreLine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (home_score, away_score) = match self.penalties {
            Some((home_pens, away_pens)) => (
                format!("{} ({home_pens})", self.home),
                format!("({away_pens}) {}", self.away),
            ),
            None => (self.home.to_string(), self.away.to_string()),
        };
        let home = join_words([
            home_score.as_str(),
            self.home_label,
            self.home_flag.unwrap_or_default(),
        ]);
        let away = join_words([
            self.away_flag.unwrap_or_default(),
            self.away_label,
            away_score.as_str(),
        ]);
        write!(f, "{home} : {away}")
    }
}

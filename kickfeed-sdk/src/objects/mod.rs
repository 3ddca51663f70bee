pub mod continuation;
pub mod event_type;
pub mod feed;
pub mod slack;

pub use continuation::ContinuationMessage;
pub use event_type::{MatchEventType, Period};
pub use feed::{
    FeedMatch, FeedTeam, LiveMatchesResponse, LocalizedText, TimelineEvent, TimelineResponse,
};
pub use slack::SlackMessage;

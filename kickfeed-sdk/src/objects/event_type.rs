//! Timeline event type and match period codes.
//!
//! The feed encodes both as bare integers. Unknown codes are preserved
//! rather than rejected, so a new upstream type never breaks parsing.

use serde::{Deserialize, Serialize};

/// Kind of a timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum MatchEventType {
    GoalScore,
    Assist,
    YellowCard,
    RedCard,
    DoubleYellow,
    Substitution,
    IgnoreEvent,
    MatchStart,
    HalfEnd,
    RefereePause,
    RefereeResume,
    GoalAttempt,
    Offside,
    CornerKick,
    BlockedShot,
    Foul,
    CoinToss,
    ThrowIn,
    MatchEnd,
    Crossbar,
    OwnGoal,
    PenaltyGoal,
    FreeKickPost,
    GoalieSave,
    PenaltyMissed,
    PenaltyMissed2,
    VarReview,
    PenaltyAwarded,
    /// The feed reserved the slot but has not populated it yet.
    Pending,
    Other(u32),
}

impl From<u32> for MatchEventType {
    fn from(code: u32) -> Self {
        match code {
            0 => MatchEventType::GoalScore,
            1 => MatchEventType::Assist,
            2 => MatchEventType::YellowCard,
            3 => MatchEventType::RedCard,
            4 => MatchEventType::DoubleYellow,
            5 => MatchEventType::Substitution,
            6 => MatchEventType::IgnoreEvent,
            7 => MatchEventType::MatchStart,
            8 => MatchEventType::HalfEnd,
            9 => MatchEventType::RefereePause,
            10 => MatchEventType::RefereeResume,
            12 => MatchEventType::GoalAttempt,
            15 => MatchEventType::Offside,
            16 => MatchEventType::CornerKick,
            17 => MatchEventType::BlockedShot,
            18 => MatchEventType::Foul,
            19 => MatchEventType::CoinToss,
            22 => MatchEventType::ThrowIn,
            26 => MatchEventType::MatchEnd,
            33 => MatchEventType::Crossbar,
            34 => MatchEventType::OwnGoal,
            41 => MatchEventType::PenaltyGoal,
            49 => MatchEventType::FreeKickPost,
            57 => MatchEventType::GoalieSave,
            60 => MatchEventType::PenaltyMissed,
            65 => MatchEventType::PenaltyMissed2,
            71 => MatchEventType::VarReview,
            72 => MatchEventType::PenaltyAwarded,
            9999 => MatchEventType::Pending,
            other => MatchEventType::Other(other),
        }
    }
}

impl From<MatchEventType> for u32 {
    fn from(value: MatchEventType) -> Self {
        match value {
            MatchEventType::GoalScore => 0,
            MatchEventType::Assist => 1,
            MatchEventType::YellowCard => 2,
            MatchEventType::RedCard => 3,
            MatchEventType::DoubleYellow => 4,
            MatchEventType::Substitution => 5,
            MatchEventType::IgnoreEvent => 6,
            MatchEventType::MatchStart => 7,
            MatchEventType::HalfEnd => 8,
            MatchEventType::RefereePause => 9,
            MatchEventType::RefereeResume => 10,
            MatchEventType::GoalAttempt => 12,
            MatchEventType::Offside => 15,
            MatchEventType::CornerKick => 16,
            MatchEventType::BlockedShot => 17,
            MatchEventType::Foul => 18,
            MatchEventType::CoinToss => 19,
            MatchEventType::ThrowIn => 22,
            MatchEventType::MatchEnd => 26,
            MatchEventType::Crossbar => 33,
            MatchEventType::OwnGoal => 34,
            MatchEventType::PenaltyGoal => 41,
            MatchEventType::FreeKickPost => 49,
            MatchEventType::GoalieSave => 57,
            MatchEventType::PenaltyMissed => 60,
            MatchEventType::PenaltyMissed2 => 65,
            MatchEventType::VarReview => 71,
            MatchEventType::PenaltyAwarded => 72,
            MatchEventType::Pending => 9999,
            MatchEventType::Other(code) => code,
        }
    }
}

impl MatchEventType {
    /// Numeric code as the feed sends it.
    pub fn code(self) -> u32 {
        self.into()
    }

    /// Whether this type has no mapping in the table above.
    pub fn is_unrecognized(self) -> bool {
        matches!(self, MatchEventType::Other(_))
    }
}

impl std::fmt::Display for MatchEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchEventType::Other(code) => write!(f, "other:{code}"),
            known => write!(f, "{:?}", known),
        }
    }
}

/// Period of play a timeline entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum Period {
    FirstHalf,
    SecondHalf,
    ExtraTimeFirstHalf,
    ExtraTimeSecondHalf,
    PenaltyShootout,
    Other(u32),
}

impl From<u32> for Period {
    fn from(code: u32) -> Self {
        match code {
            3 => Period::FirstHalf,
            5 => Period::SecondHalf,
            7 => Period::ExtraTimeFirstHalf,
            9 => Period::ExtraTimeSecondHalf,
            11 => Period::PenaltyShootout,
            other => Period::Other(other),
        }
    }
}

impl From<Period> for u32 {
    fn from(value: Period) -> Self {
        match value {
            Period::FirstHalf => 3,
            Period::SecondHalf => 5,
            Period::ExtraTimeFirstHalf => 7,
            Period::ExtraTimeSecondHalf => 9,
            Period::PenaltyShootout => 11,
            Period::Other(code) => code,
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::Other(0)
    }
}

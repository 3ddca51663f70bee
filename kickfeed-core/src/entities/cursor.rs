//! Resume cursor of a monitored match.

use serde::{Deserialize, Serialize};

/// Marker of the last timeline entry already reported for a match.
///
/// Stored and transported as a plain string: `"0"` means "never polled",
/// `"-1"` means "just handed off by discovery", anything else is the id of
/// the last reported entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Cursor {
    /// Never polled. Every entry of the timeline is new.
    #[default]
    Replay,
    /// Handed off by discovery. Behaves exactly like [`Cursor::Replay`]
    /// once normalized.
    HandedOff,
    /// Id of the last reported entry.
    After(String),
}

impl Cursor {
    pub const REPLAY: &'static str = "0";
    pub const HANDED_OFF: &'static str = "-1";

    /// Parse a stored cursor. An empty string is treated as never polled.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | Self::REPLAY => Cursor::Replay,
            Self::HANDED_OFF => Cursor::HandedOff,
            id => Cursor::After(id.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Cursor::Replay => Self::REPLAY,
            Cursor::HandedOff => Self::HANDED_OFF,
            Cursor::After(id) => id,
        }
    }

    /// Collapse the hand-off sentinel into [`Cursor::Replay`].
    pub fn normalized(self) -> Self {
        match self {
            Cursor::HandedOff => Cursor::Replay,
            other => other,
        }
    }

    /// The event id this cursor points at, if any.
    pub fn anchor(&self) -> Option<&str> {
        match self {
            Cursor::After(id) => Some(id),
            _ => None,
        }
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Cursor::parse(&value)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Cursor::parse(value)
    }
}

impl From<Cursor> for String {
    fn from(value: Cursor) -> Self {
        match value {
            Cursor::After(id) => id,
            sentinel => sentinel.as_str().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert_eq!(Cursor::parse("0"), Cursor::Replay);
        assert_eq!(Cursor::parse(""), Cursor::Replay);
        assert_eq!(Cursor::parse("-1"), Cursor::HandedOff);
        assert_eq!(Cursor::parse("E5"), Cursor::After("E5".to_string()));
    }

    #[test]
    fn test_normalized() {
        assert_eq!(Cursor::HandedOff.normalized(), Cursor::Replay);
        assert_eq!(
            Cursor::After("7".to_string()).normalized().as_str(),
            "7"
        );
    }

    #[test]
    fn test_string_form_is_stable() {
        for raw in ["0", "-1", "18185700000871"] {
            assert_eq!(String::from(Cursor::parse(raw)), raw);
        }
    }
}

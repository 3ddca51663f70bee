//! Event classifier configuration.

use kickfeed_sdk::objects::{MatchEventType, Period};
use std::collections::{HashMap, HashSet};

/// Noise types never worth a notification.
pub const DEFAULT_SUPPRESSED: [MatchEventType; 11] = [
    MatchEventType::RefereePause,
    MatchEventType::RefereeResume,
    MatchEventType::GoalAttempt,
    MatchEventType::Offside,
    MatchEventType::CornerKick,
    MatchEventType::BlockedShot,
    MatchEventType::Foul,
    MatchEventType::ThrowIn,
    MatchEventType::Crossbar,
    MatchEventType::FreeKickPost,
    MatchEventType::GoalieSave,
];

/// Types that are noise only while the penalty shootout is on: every kick
/// is "awarded" there.
pub const DEFAULT_SHOOTOUT_SUPPRESSED: [MatchEventType; 1] = [MatchEventType::PenaltyAwarded];

/// Team abbreviation to Slack flag emoji.
pub const DEFAULT_FLAGS: [(&str, &str); 45] = [
    ("ARG", ":flag-ar:"),
    ("AUS", ":flag-au:"),
    ("BEL", ":flag-be:"),
    ("BRA", ":flag-br:"),
    ("CAN", ":flag-ca:"),
    ("CHI", ":flag-cl:"),
    ("CHN", ":flag-cn:"),
    ("CMR", ":flag-cm:"),
    ("COL", ":flag-co:"),
    ("CRC", ":flag-cr:"),
    ("CRO", ":flag-hr:"),
    ("DEN", ":flag-dk:"),
    ("EGY", ":flag-eg:"),
    ("ENG", ":flag-england:"),
    ("ESP", ":flag-es:"),
    ("FRA", ":flag-fr:"),
    ("GER", ":flag-de:"),
    ("IRN", ":flag-ir:"),
    ("ISL", ":flag-is:"),
    ("ITA", ":flag-it:"),
    ("JAM", ":flag-jm:"),
    ("JPN", ":flag-jp:"),
    ("KOR", ":flag-kr:"),
    ("KSA", ":flag-sa:"),
    ("MAR", ":flag-ma:"),
    ("MEX", ":flag-mx:"),
    ("NED", ":flag-nl:"),
    ("NGA", ":flag-ng:"),
    ("NOR", ":flag-no:"),
    ("NZL", ":flag-nz:"),
    ("PAN", ":flag-pa:"),
    ("PER", ":flag-pe:"),
    ("POL", ":flag-pl:"),
    ("POR", ":flag-pt:"),
    ("RSA", ":flag-za:"),
    ("RUS", ":flag-ru:"),
    ("SCO", ":flag-scotland:"),
    ("SEN", ":flag-sn:"),
    ("SRB", ":flag-rs:"),
    ("SUI", ":flag-ch:"),
    ("SWE", ":flag-se:"),
    ("THA", ":flag-th:"),
    ("TUN", ":flag-tn:"),
    ("URU", ":flag-uy:"),
    ("ZAF", ":flag-za:"),
];

/// Immutable tables consulted by the event classifier.
///
/// Swapped as a whole through [`super::ConfigStore`] on reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub suppressed: HashSet<MatchEventType>,
    pub shootout_suppressed: HashSet<MatchEventType>,
    pub flags: HashMap<String, String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            suppressed: DEFAULT_SUPPRESSED.into_iter().collect(),
            shootout_suppressed: DEFAULT_SHOOTOUT_SUPPRESSED.into_iter().collect(),
            flags: DEFAULT_FLAGS
                .into_iter()
                .map(|(abbrev, flag)| (abbrev.to_owned(), flag.to_owned()))
                .collect(),
        }
    }
}

impl ClassifierConfig {
    /// Defaults unioned with per-deployment overrides.
    ///
    /// * `extra_suppressed` – type codes added to the noise set.
    /// * `shootout_suppressed` – replaces the shootout-only set when given.
    /// * `flags` – added to, or replacing entries of, the flag table.
    pub fn with_overrides(
        extra_suppressed: impl IntoIterator<Item = u32>,
        shootout_suppressed: Option<Vec<u32>>,
        flags: HashMap<String, String>,
    ) -> Self {
        let mut config = Self::default();
        config
            .suppressed
            .extend(extra_suppressed.into_iter().map(MatchEventType::from));
        if let Some(codes) = shootout_suppressed {
            config.shootout_suppressed = codes.into_iter().map(MatchEventType::from).collect();
        }
        config.flags.extend(flags);
        config
    }

    /// Whether an entry of `kind` in `period` is noise.
    pub fn is_suppressed(&self, kind: MatchEventType, period: Period) -> bool {
        self.suppressed.contains(&kind)
            || (period == Period::PenaltyShootout && self.shootout_suppressed.contains(&kind))
    }

    pub fn flag(&self, abbrev: &str) -> Option<&str> {
        self.flags.get(abbrev).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::default();
        assert!(config.is_suppressed(MatchEventType::Foul, Period::FirstHalf));
        assert!(!config.is_suppressed(MatchEventType::GoalScore, Period::FirstHalf));
        assert_eq!(config.flag("NED"), Some(":flag-nl:"));
        assert_eq!(config.flag("XXX"), None);
    }

    #[test]
    fn test_throw_in_is_suppressed_by_default() {
        let config = ClassifierConfig::default();
        assert!(config.is_suppressed(MatchEventType::ThrowIn, Period::FirstHalf));
        assert!(config.is_suppressed(MatchEventType::ThrowIn, Period::SecondHalf));
    }

    #[test]
    fn test_penalty_awarded_only_suppressed_in_shootout() {
        let config = ClassifierConfig::default();
        assert!(!config.is_suppressed(MatchEventType::PenaltyAwarded, Period::SecondHalf));
        assert!(config.is_suppressed(MatchEventType::PenaltyAwarded, Period::PenaltyShootout));
    }

    #[test]
    fn test_overrides_extend_defaults() {
        let flags = HashMap::from([("USA".to_string(), ":flag-us:".to_string())]);
        let config = ClassifierConfig::with_overrides([19], Some(Vec::new()), flags);
        assert!(config.is_suppressed(MatchEventType::CoinToss, Period::FirstHalf));
        assert!(config.is_suppressed(MatchEventType::Offside, Period::FirstHalf));
        assert!(!config.is_suppressed(MatchEventType::PenaltyAwarded, Period::PenaltyShootout));
        assert_eq!(config.flag("USA"), Some(":flag-us:"));
        assert_eq!(config.flag("ARG"), Some(":flag-ar:"));
    }
}

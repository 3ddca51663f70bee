//! Resume-cursor arithmetic over a freshly fetched timeline.
//!
//! [`advance`] is pure: it never fails and never touches storage. Given the
//! cursor stored for a match and the timeline as the feed returned it, it
//! works out which entries have not been reported yet and where the cursor
//! should point afterwards.

use crate::entities::{Cursor, TimelineEntry};
use kickfeed_sdk::objects::MatchEventType;
use std::cmp::Ordering;

/// Result of walking one timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// Entries after the cursor, in canonical order.
    pub new_entries: Vec<TimelineEntry>,
    pub next_cursor: Cursor,
    /// A match-end entry was part of the walked prefix.
    pub done: bool,
    /// The walk stopped at an entry the feed has not populated yet.
    pub pending_found: bool,
}

/// Canonical ordering of timeline entry ids.
///
/// Ids made of digits compare numerically. Any other id sorts after every
/// numeric one and compares lexicographically with its peers.
pub fn compare_entry_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u128>(), b.parse::<u128>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Work out the new entries of a timeline relative to `previous`.
pub fn advance(previous: &Cursor, mut entries: Vec<TimelineEntry>) -> Advance {
    let previous = previous.clone().normalized();
    // `sort_by` is stable, so entries sharing an id keep feed order.
    entries.sort_by(|a, b| compare_entry_ids(&a.id, &b.id));
    let last_id = entries.last().map(|entry| entry.id.clone());

    let anchor = previous.anchor();
    let mut anchor_found = anchor.is_none();
    let mut next_cursor = previous.clone();
    let mut new_entries = Vec::new();
    let mut done = false;
    let mut pending_found = false;

    for entry in entries {
        if entry.kind == MatchEventType::Pending {
            pending_found = true;
            break;
        }
        if entry.kind == MatchEventType::MatchEnd {
            done = true;
        }
        if !anchor_found {
            anchor_found = anchor == Some(entry.id.as_str());
            continue;
        }
        next_cursor = Cursor::After(entry.id.clone());
        new_entries.push(entry);
    }

    // The anchored entry vanished upstream: resync on the newest entry
    // instead of replaying the whole match.
    if !anchor_found && !pending_found {
        if let Some(last_id) = last_id {
            next_cursor = Cursor::After(last_id);
        }
    }

    Advance {
        new_entries,
        next_cursor,
        done,
        pending_found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MatchEventType::*;

    fn timeline(entries: &[(&str, MatchEventType)]) -> Vec<TimelineEntry> {
        entries
            .iter()
            .map(|(id, kind)| TimelineEntry::new(*id, *kind))
            .collect()
    }

    fn ids(advance: &Advance) -> Vec<&str> {
        advance.new_entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_first_poll_backfills_everything() {
        let entries = timeline(&[("3", YellowCard), ("1", MatchStart), ("2", GoalScore)]);
        let result = advance(&Cursor::Replay, entries);
        assert_eq!(ids(&result), ["1", "2", "3"]);
        assert_eq!(result.next_cursor, Cursor::After("3".into()));
        assert!(!result.done);
        assert!(!result.pending_found);
    }

    #[test]
    fn test_handed_off_behaves_like_replay() {
        let entries = timeline(&[("1", MatchStart), ("2", GoalScore)]);
        let from_replay = advance(&Cursor::Replay, entries.clone());
        let from_hand_off = advance(&Cursor::HandedOff, entries);
        assert_eq!(from_replay, from_hand_off);
    }

    #[test]
    fn test_entries_after_anchor_only() {
        let entries = timeline(&[("1", MatchStart), ("2", GoalScore), ("3", Substitution)]);
        let result = advance(&Cursor::After("2".into()), entries);
        assert_eq!(ids(&result), ["3"]);
        assert_eq!(result.next_cursor.as_str(), "3");
    }

    #[test]
    fn test_repoll_is_a_no_op() {
        let entries = timeline(&[("1", MatchStart), ("2", GoalScore)]);
        let result = advance(&Cursor::After("2".into()), entries);
        assert!(result.new_entries.is_empty());
        assert_eq!(result.next_cursor.as_str(), "2");
    }

    #[test]
    fn test_pending_entry_defers_the_rest() {
        let entries = timeline(&[("1", GoalScore), ("2", YellowCard), ("3", Pending), ("4", RedCard)]);
        let result = advance(&Cursor::Replay, entries);
        assert_eq!(ids(&result), ["1", "2"]);
        assert_eq!(result.next_cursor.as_str(), "2");
        assert!(result.pending_found);

        let populated = timeline(&[("1", GoalScore), ("2", YellowCard), ("3", Foul), ("4", RedCard)]);
        let result = advance(&result.next_cursor, populated);
        assert_eq!(ids(&result), ["3", "4"]);
        assert!(!result.pending_found);
    }

    #[test]
    fn test_deleted_anchor_resyncs_on_last_entry() {
        let entries = timeline(&[("1", MatchStart), ("2", GoalScore), ("6", Substitution)]);
        let result = advance(&Cursor::After("5".into()), entries);
        assert!(result.new_entries.is_empty());
        assert_eq!(result.next_cursor.as_str(), "6");
    }

    #[test]
    fn test_deleted_anchor_with_pending_keeps_cursor() {
        let entries = timeline(&[("1", MatchStart), ("2", Pending)]);
        let result = advance(&Cursor::After("5".into()), entries);
        assert!(result.pending_found);
        assert_eq!(result.next_cursor.as_str(), "5");
    }

    #[test]
    fn test_match_end_keeps_walking() {
        let entries = timeline(&[("1", GoalScore), ("2", MatchEnd), ("3", PenaltyGoal)]);
        let result = advance(&Cursor::Replay, entries);
        assert!(result.done);
        assert_eq!(ids(&result), ["1", "2", "3"]);
    }

    #[test]
    fn test_match_end_before_anchor_still_counts() {
        let entries = timeline(&[("1", MatchEnd), ("2", PenaltyGoal)]);
        let result = advance(&Cursor::After("2".into()), entries);
        assert!(result.done);
        assert!(result.new_entries.is_empty());
    }

    #[test]
    fn test_numeric_ids_order_numerically() {
        let entries = timeline(&[("10", Foul), ("9", Foul), ("b", Foul), ("100", Foul), ("a", Foul)]);
        let result = advance(&Cursor::Replay, entries);
        assert_eq!(ids(&result), ["9", "10", "100", "a", "b"]);
    }

    #[test]
    fn test_empty_timeline_keeps_cursor() {
        let result = advance(&Cursor::After("7".into()), Vec::new());
        assert!(result.new_entries.is_empty());
        assert_eq!(result.next_cursor.as_str(), "7");

        let result = advance(&Cursor::HandedOff, Vec::new());
        assert_eq!(result.next_cursor, Cursor::Replay);
    }
}

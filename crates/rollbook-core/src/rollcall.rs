//! Roll call
//!
//! A presence snapshot: who is at a console right now versus the roster.
//! Pure set difference; no time-window logic.

use std::collections::BTreeSet;

use crate::RosterEntry;

/// Result of a roll-call snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollCall {
    /// Roster entries currently at a console, in roster order, plus any
    /// live logins not on the roster (unresolved, appended after)
    pub here: Vec<RosterEntry>,

    /// Roster entries neither present nor excluded
    pub absent: Vec<RosterEntry>,
}

/// Compute the here/absent split from a live login set and the roster.
///
/// `excluded` logins never appear in the absent list; they may still show
/// up as present if they are at a console.
pub fn roll_call(
    live_logins: &[String],
    roster: &[RosterEntry],
    excluded: &BTreeSet<String>,
) -> RollCall {
    let live: BTreeSet<&str> = live_logins.iter().map(String::as_str).collect();

    let mut here = Vec::new();
    let mut absent = Vec::new();
    let mut matched: BTreeSet<&str> = BTreeSet::new();

    for entry in roster {
        if live.contains(entry.login.as_str()) {
            matched.insert(entry.login.as_str());
            here.push(entry.clone());
        } else if !excluded.contains(&entry.login) {
            absent.push(entry.clone());
        }
    }

    // Live logins with no roster entry still belong in the snapshot
    for login in &live {
        if !matched.contains(login) {
            here.push(RosterEntry::new(None, login));
        }
    }

    RollCall { here, absent }
}

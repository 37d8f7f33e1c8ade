//! Attendance aggregation
//!
//! Walks the semester one calendar day at a time, matching the session set
//! against each scheduled meeting window and tallying per-person presence
//! and absence. Deterministic: running it twice over the same inputs yields
//! identical reports.

use chrono::{DateTime, Datelike, Local};
use rollbook_config::Schedule;
use rollbook_util::format_meeting_day;
use std::collections::BTreeSet;
use tracing::debug;

use crate::{session_in_window, DateRange, MeetingWindow, Session, StillActiveRegistry};

/// One enrolled identity, as reported by the system account directory
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RosterEntry {
    /// Display name from the directory, `None` when the entry has no name
    pub display_name: Option<String>,

    /// Account login
    pub login: String,
}

impl RosterEntry {
    pub fn new(display_name: Option<&str>, login: &str) -> Self {
        Self {
            display_name: display_name.map(str::to_string),
            login: login.to_string(),
        }
    }

    /// Label used in report output
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.login)
    }
}

/// Per-person attendance tally
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceRecord {
    /// Meetings this person was present for
    pub attended: u32,

    /// Labels of meeting days missed, in chronological order
    pub missed_dates: Vec<String>,
}

impl AttendanceRecord {
    /// Attendance percentage; `None` when no meetings have been held.
    pub fn percentage(&self, total: u32) -> Option<f64> {
        if total == 0 {
            None
        } else {
            Some(self.attended as f64 / total as f64 * 100.0)
        }
    }
}

/// Result of an attendance run
#[derive(Debug, Clone, Default)]
pub struct AttendanceReport {
    /// Per-roster-entry tallies, in roster order
    pub records: Vec<(RosterEntry, AttendanceRecord)>,

    /// Number of meetings actually held in range
    pub total: u32,

    /// People whose sessions never ended, found during matching
    pub still_active: StillActiveRegistry,
}

/// Tally attendance for every non-ignored roster entry.
///
/// Iterates day by day from the schedule's first meeting day until the
/// meeting end for a day reaches `today`; a class that has not yet concluded
/// is never counted. Days off-schedule, outside `range`, or in the excluded
/// set hold no meeting.
pub fn take_attendance(
    sessions: &[Session],
    schedule: &Schedule,
    roster: &[RosterEntry],
    today: DateTime<Local>,
    range: DateRange,
) -> AttendanceReport {
    let mut records: Vec<(RosterEntry, AttendanceRecord)> = roster
        .iter()
        .filter(|entry| !schedule.ignored_logins.contains(&entry.login))
        .map(|entry| (entry.clone(), AttendanceRecord::default()))
        .collect();

    let mut still_active = StillActiveRegistry::new();
    let mut total = 0u32;
    let mut day = schedule.first_day;

    loop {
        let window = MeetingWindow::for_date(day, schedule.start, schedule.end);
        if window.end >= today {
            break;
        }

        let held = schedule.days.contains(day.weekday())
            && range.contains(day)
            && !schedule.excluded_dates.contains(&day);

        if held {
            total += 1;

            let mut present: BTreeSet<(Option<String>, String)> = BTreeSet::new();
            for session in sessions {
                if session_in_window(session, &window, &mut still_active) {
                    present.insert((session.display_name.clone(), session.login.clone()));
                }
            }

            debug!(
                day = %day,
                present = present.len(),
                "Counted meeting"
            );

            let label = format_meeting_day(day);
            for (entry, record) in &mut records {
                let key = (entry.display_name.clone(), entry.login.clone());
                if present.contains(&key) {
                    record.attended += 1;
                } else {
                    record.missed_dates.push(label.clone());
                }
            }
        }

        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    AttendanceReport {
        records,
        total,
        still_active,
    }
}

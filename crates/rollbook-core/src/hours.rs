//! Lab-hour aggregation
//!
//! Sums logged-in time and login counts per account over a date range,
//! reusing the meeting-window matcher (and its grace semantics) for range
//! membership.

use std::collections::{BTreeMap, BTreeSet};

use crate::{session_in_window, MeetingWindow, Session, StillActiveRegistry};

/// Per-login usage totals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LabHours {
    /// Sessions observed in range
    pub login_count: u32,

    /// Total logged-in time in hours. Open-ended sessions contribute
    /// nothing here; there is no end timestamp to measure against.
    pub total_hours: f64,
}

/// Result of a lab-hour run
#[derive(Debug, Clone, Default)]
pub struct LabHourReport {
    /// Totals keyed by login
    pub per_login: BTreeMap<String, LabHours>,

    /// Open sessions found while matching
    pub still_active: StillActiveRegistry,
}

/// Tally login counts and logged-in hours over `range_window`.
///
/// `targets` limits the tally to those logins; `None` means every login in
/// the session set. Targeted logins always appear in the result, with zero
/// totals when nothing matched.
pub fn tally_lab_hours(
    sessions: &[Session],
    targets: Option<&BTreeSet<String>>,
    range_window: &MeetingWindow,
) -> LabHourReport {
    let mut report = LabHourReport::default();

    if let Some(targets) = targets {
        for login in targets {
            report.per_login.insert(login.clone(), LabHours::default());
        }
    }

    for session in sessions {
        if let Some(targets) = targets {
            if !targets.contains(&session.login) {
                continue;
            }
        }
        if !session_in_window(session, range_window, &mut report.still_active) {
            continue;
        }

        let entry = report.per_login.entry(session.login.clone()).or_default();
        entry.login_count += 1;
        if let Some(end) = session.end {
            entry.total_hours += (end - session.start).num_seconds() as f64 / 3600.0;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, NaiveDate, TimeZone};

    fn dt(day: u32, hour: u32, minute: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 9, day, hour, minute, 0)
            .unwrap()
    }

    fn session(login: &str, start: DateTime<Local>, end: Option<DateTime<Local>>) -> Session {
        Session {
            login: login.into(),
            display_name: None,
            start,
            end,
            machine: "lab-04".into(),
            raw: String::new(),
        }
    }

    fn september() -> MeetingWindow {
        MeetingWindow::for_date_span(
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
        )
    }

    #[test]
    fn sums_hours_and_counts() {
        let sessions = vec![
            session("u1", dt(2, 10, 0), Some(dt(2, 11, 30))),
            session("u1", dt(3, 14, 0), Some(dt(3, 16, 0))),
        ];

        let report = tally_lab_hours(&sessions, None, &september());
        let u1 = &report.per_login["u1"];
        assert_eq!(u1.login_count, 2);
        assert!((u1.total_hours - 3.5).abs() < 1e-9);
    }

    #[test]
    fn open_session_counted_but_not_summed() {
        let sessions = vec![
            session("u1", dt(2, 10, 0), Some(dt(2, 11, 30))),
            session("u1", dt(4, 9, 0), None),
        ];

        let report = tally_lab_hours(&sessions, None, &september());
        let u1 = &report.per_login["u1"];
        assert_eq!(u1.login_count, 2);
        assert!((u1.total_hours - 1.5).abs() < 1e-9);
        assert_eq!(report.still_active.len(), 1);
    }

    #[test]
    fn target_set_filters_logins() {
        let sessions = vec![
            session("u1", dt(2, 10, 0), Some(dt(2, 11, 0))),
            session("u2", dt(2, 10, 0), Some(dt(2, 12, 0))),
        ];
        let targets: BTreeSet<String> = ["u1".to_string()].into();

        let report = tally_lab_hours(&sessions, Some(&targets), &september());
        assert!(report.per_login.contains_key("u1"));
        assert!(!report.per_login.contains_key("u2"));
    }

    #[test]
    fn targets_seeded_with_zero_totals() {
        let targets: BTreeSet<String> = ["u1".to_string(), "u2".to_string()].into();
        let report = tally_lab_hours(&[], Some(&targets), &september());

        assert_eq!(report.per_login.len(), 2);
        assert_eq!(report.per_login["u2"].login_count, 0);
        assert_eq!(report.per_login["u2"].total_hours, 0.0);
    }

    #[test]
    fn out_of_range_sessions_excluded() {
        let out_of_range = Local.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap();
        let sessions = vec![session("u1", out_of_range, Some(out_of_range + chrono::Duration::hours(1)))];

        let report = tally_lab_hours(&sessions, None, &september());
        assert!(report.per_login.is_empty());
    }
}

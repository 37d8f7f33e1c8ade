//! Report rendering
//!
//! Plain-text report bodies, built as strings so they can be asserted on in
//! tests. The binary just prints them.

use chrono::{DateTime, Local};
use rollbook_core::{AttendanceReport, LabHourReport, RollCall, RosterEntry, StillActiveRegistry};

const RULE: &str = "**************************************************";

fn name_column(entry: &RosterEntry) -> String {
    match &entry.display_name {
        Some(name) => name.clone(),
        // Unresolved directory entries are worth flagging to the instructor
        None => format!("(unresolved) {}", entry.login),
    }
}

fn still_active_section(out: &mut String, still_active: &StillActiveRegistry) {
    if still_active.is_empty() {
        return;
    }
    out.push_str("\nStill logged in:\n");
    for session in still_active.iter() {
        out.push_str(&format!(
            "{} ({}) logged in at {} on {}\n",
            session.person_label(),
            session.login,
            session.start.format("%Y-%m-%d %H:%M"),
            session.machine
        ));
    }
}

/// Attendance totals: one row per person with an attendance percentage
pub fn render_totals(report: &AttendanceReport, today: DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(
        "Attendance Report as of {}\n",
        today.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(RULE);
    out.push('\n');

    for (entry, record) in &report.records {
        let pct = match record.percentage(report.total) {
            Some(pct) => format!("{:6.2}%", pct),
            None => "   n/a".to_string(),
        };
        out.push_str(&format!(
            "{:30} {:10} {}\n",
            name_column(entry),
            entry.login,
            pct
        ));
    }

    still_active_section(&mut out, &report.still_active);
    out
}

/// Absence report: missed meeting days per person; people with a perfect
/// record are omitted
pub fn render_absent(report: &AttendanceReport, today: DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(
        "Absence Report as of {}\n",
        today.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(RULE);
    out.push('\n');

    for (entry, record) in &report.records {
        if record.missed_dates.is_empty() {
            continue;
        }
        out.push_str(&format!("{} ({}):\n", name_column(entry), entry.login));
        for date in &record.missed_dates {
            out.push_str(&format!("- {}\n", date));
        }
        out.push('\n');
    }

    out
}

/// Lab hours: sessions and logged-in hours per login
pub fn render_hours(report: &LabHourReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<12} {:>8} {:>10}\n", "login", "sessions", "hours"));

    for (login, hours) in &report.per_login {
        out.push_str(&format!(
            "{:<12} {:>8} {:>10.2}\n",
            login, hours.login_count, hours.total_hours
        ));
    }

    still_active_section(&mut out, &report.still_active);
    out
}

/// Roll call: who is at a console right now versus the roster
pub fn render_rollcall(rollcall: &RollCall) -> String {
    let mut out = String::new();

    out.push_str(&format!("Here ({}):\n", rollcall.here.len()));
    for entry in &rollcall.here {
        out.push_str(&format!("  {} ({})\n", name_column(entry), entry.login));
    }

    out.push_str(&format!("\nAbsent ({}):\n", rollcall.absent.len()));
    for entry in &rollcall.absent {
        out.push_str(&format!("  {} ({})\n", name_column(entry), entry.login));
    }

    out
}

//! rollbook - attendance and lab-usage reports from machine login sessions
//!
//! Wires the collaborators together for one report run:
//! - Configuration loading (class, schedule, fan-out settings)
//! - Session collection over dsh and parsing
//! - Name resolution against the system directory, memoized per run
//! - One of the aggregations (attendance, absence, hours, roll call)
//! - Plain-text rendering

mod report;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use rollbook_config::{load_config, Schedule};
use rollbook_core::{
    parse_sessions, roll_call, take_attendance, tally_lab_hours, DateRange, MeetingWindow,
    ParseOutcome, RosterEntry, Session,
};
use rollbook_host::{
    CachingResolver, DshLab, PasswdDirectory, PresenceSource, RosterSource, SessionSource,
};
use rollbook_util::parse_month_day;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// rollbook - attendance and lab-usage reports for a course
#[derive(Parser, Debug)]
#[command(name = "rollbook")]
#[command(about = "Attendance and lab-usage reports from machine login sessions", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "ROLLBOOK_CONFIG", default_value = "rollbook.toml")]
    config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Report,
}

#[derive(Subcommand, Debug)]
enum Report {
    /// Attendance totals with percentages
    Attendance {
        /// Start of the date range checked (month-day, e.g. "Sep 01")
        #[arg(short, long)]
        start: Option<String>,

        /// End of the date range checked
        #[arg(short, long)]
        end: Option<String>,
    },

    /// Missed meeting days per student
    Absent {
        /// Start of the date range checked
        #[arg(short, long)]
        start: Option<String>,

        /// End of the date range checked
        #[arg(short, long)]
        end: Option<String>,
    },

    /// Logged-in hours per account
    Hours {
        /// Restrict to these logins (comma separated); default is the roster
        #[arg(long, value_delimiter = ',')]
        logins: Option<Vec<String>>,

        /// Start of the date range checked; default is the first meeting day
        #[arg(short, long)]
        start: Option<String>,

        /// End of the date range checked; default is today
        #[arg(short, long)]
        end: Option<String>,
    },

    /// Who is at a console right now
    Rollcall,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let today = rollbook_util::now();

    let schedule = load_config(&args.config, today.year())
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    info!(
        class = %schedule.class_prefix,
        machines = %schedule.machine_prefix,
        "Configuration loaded"
    );

    let lab = DshLab::new(schedule.max_procs);
    let directory = PasswdDirectory::new();

    let text = match &args.command {
        Report::Attendance { start, end } => {
            let range = parse_range(start.as_deref(), end.as_deref(), today.year())?;
            let report = run_attendance(&lab, &directory, &schedule, today, range)?;
            report::render_totals(&report, today)
        }
        Report::Absent { start, end } => {
            let range = parse_range(start.as_deref(), end.as_deref(), today.year())?;
            let report = run_attendance(&lab, &directory, &schedule, today, range)?;
            report::render_absent(&report, today)
        }
        Report::Hours { logins, start, end } => {
            let sessions = collect_sessions(&lab, &directory, &schedule, today.year())?;
            let first = parse_range_date(start.as_deref(), today.year())?
                .unwrap_or(schedule.first_day);
            let last =
                parse_range_date(end.as_deref(), today.year())?.unwrap_or(today.date_naive());
            let window = MeetingWindow::for_date_span(first, last);

            let targets: BTreeSet<String> = match logins {
                Some(logins) => logins.iter().cloned().collect(),
                None => {
                    let roster = directory
                        .roster(&schedule.class_prefix, schedule.everyone)
                        .context("Failed to read the class roster")?;
                    roster.into_iter().map(|entry| entry.login).collect()
                }
            };

            let report = tally_lab_hours(&sessions, Some(&targets), &window);
            report::render_hours(&report)
        }
        Report::Rollcall => {
            let live = lab
                .fetch_active_logins(&schedule.machine_prefix, &schedule.class_prefix)
                .context("Failed to collect active logins")?;
            let roster = directory
                .roster(&schedule.class_prefix, schedule.everyone)
                .context("Failed to read the class roster")?;
            let result = roll_call(&live, &roster, &schedule.ignored_logins);
            report::render_rollcall(&result)
        }
    };

    print!("{}", text);
    Ok(())
}

fn run_attendance(
    lab: &DshLab,
    directory: &PasswdDirectory,
    schedule: &Schedule,
    today: DateTime<Local>,
    range: DateRange,
) -> Result<rollbook_core::AttendanceReport> {
    let sessions = collect_sessions(lab, directory, schedule, today.year())?;
    let roster: Vec<RosterEntry> = directory
        .roster(&schedule.class_prefix, schedule.everyone)
        .context("Failed to read the class roster")?;

    Ok(take_attendance(&sessions, schedule, &roster, today, range))
}

/// Fetch, parse, and triage the session lines for the machine group.
/// Malformed lines are warned about and the run continues.
fn collect_sessions(
    lab: &DshLab,
    directory: &PasswdDirectory,
    schedule: &Schedule,
    year: i32,
) -> Result<Vec<Session>> {
    let lines = lab
        .fetch_sessions(&schedule.machine_prefix, &schedule.class_prefix)
        .context("Failed to collect session logs")?;

    let mut resolver = CachingResolver::new(directory.clone());
    let ParseOutcome { sessions, failures } = parse_sessions(&lines, year, &mut resolver);

    for failure in &failures {
        warn!(line = %failure.line, error = %failure.error, "Skipped malformed session line");
    }
    info!(
        sessions = sessions.len(),
        skipped = failures.len(),
        "Parsed session logs"
    );

    Ok(sessions)
}

fn parse_range(
    start: Option<&str>,
    end: Option<&str>,
    year: i32,
) -> Result<DateRange> {
    Ok(DateRange {
        start: parse_range_date(start, year)?,
        end: parse_range_date(end, year)?,
    })
}

fn parse_range_date(value: Option<&str>, year: i32) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            parse_month_day(s, year)
                .with_context(|| format!("Invalid date '{}': expected month-day like 'Sep 01'", s))
        })
        .transpose()
}

//! Validated schedule, ready for use by the core aggregators

use crate::schema::RawConfig;
use chrono::NaiveDate;
use rollbook_util::{parse_month_day, DaysOfWeek, WallClock};
use std::collections::BTreeSet;

/// Default cap on the dsh subprocess fan-out
pub const DEFAULT_MAX_PROCS: u64 = 100;

/// Validated schedule and class settings
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Meeting weekdays
    pub days: DaysOfWeek,

    /// First meeting day of the semester
    pub first_day: NaiveDate,

    /// Meeting start time-of-day
    pub start: WallClock,

    /// Meeting end time-of-day
    pub end: WallClock,

    /// Holidays and other non-meeting dates
    pub excluded_dates: BTreeSet<NaiveDate>,

    /// Login prefix shared by the class accounts
    pub class_prefix: String,

    /// Hostname prefix of the lab machine group
    pub machine_prefix: String,

    /// Logins excluded from attendance and roll call
    pub ignored_logins: BTreeSet<String>,

    /// Include accounts with no resolvable display name
    pub everyone: bool,

    /// Subprocess cap handed to the session-source collaborator
    pub max_procs: u64,
}

impl Schedule {
    /// Convert from raw config (after validation) against the run year.
    pub fn from_raw(raw: RawConfig, year: i32) -> Self {
        // Validation guarantees these parses succeed
        let days = DaysOfWeek::parse_day_letters(&raw.schedule.days).unwrap_or(DaysOfWeek::NONE);
        let first_day = parse_month_day(&raw.schedule.start_day, year)
            .expect("start_day validated before conversion");
        let start = WallClock::parse(&raw.schedule.start_time)
            .expect("start_time validated before conversion");
        let end = WallClock::parse(&raw.schedule.end_time)
            .expect("end_time validated before conversion");
        let excluded_dates = raw
            .schedule
            .excluded_dates
            .iter()
            .filter_map(|d| parse_month_day(d, year))
            .collect();

        Self {
            days,
            first_day,
            start,
            end,
            excluded_dates,
            class_prefix: raw.class.class_prefix,
            machine_prefix: raw.class.machine_prefix,
            ignored_logins: raw.class.ignore.into_iter().collect(),
            everyone: raw.class.everyone,
            max_procs: raw.command.max_procs.unwrap_or(DEFAULT_MAX_PROCS),
        }
    }
}

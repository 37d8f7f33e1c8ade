//! Configuration validation

use crate::schema::RawConfig;
use rollbook_util::{parse_month_day, DaysOfWeek, WallClock};
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid day letters '{0}': expected letters from m t w r f s u")]
    InvalidDayLetters(String),

    #[error("Schedule has no meeting days")]
    EmptyDays,

    #[error("Invalid time '{field}' = '{value}': expected HH:MM")]
    InvalidTime { field: String, value: String },

    #[error("Meeting end {end} is not after start {start}")]
    EndBeforeStart { start: String, end: String },

    #[error("Invalid date '{field}' = '{value}': expected month-day like 'Aug 24'")]
    InvalidDate { field: String, value: String },

    #[error("Class setting '{0}' cannot be empty")]
    EmptyPrefix(String),

    #[error("command.max_procs must be at least 1")]
    ZeroMaxProcs,
}

/// Validate a raw configuration against the given run year
pub fn validate_config(config: &RawConfig, year: i32) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.class.class_prefix.is_empty() {
        errors.push(ValidationError::EmptyPrefix("class_prefix".into()));
    }
    if config.class.machine_prefix.is_empty() {
        errors.push(ValidationError::EmptyPrefix("machine_prefix".into()));
    }

    match DaysOfWeek::parse_day_letters(&config.schedule.days) {
        None => errors.push(ValidationError::InvalidDayLetters(
            config.schedule.days.clone(),
        )),
        Some(days) if days.is_empty() => errors.push(ValidationError::EmptyDays),
        Some(_) => {}
    }

    let start = check_time(&mut errors, "start_time", &config.schedule.start_time);
    let end = check_time(&mut errors, "end_time", &config.schedule.end_time);
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            errors.push(ValidationError::EndBeforeStart {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
    }

    if parse_month_day(&config.schedule.start_day, year).is_none() {
        errors.push(ValidationError::InvalidDate {
            field: "start_day".into(),
            value: config.schedule.start_day.clone(),
        });
    }

    for date in &config.schedule.excluded_dates {
        if parse_month_day(date, year).is_none() {
            errors.push(ValidationError::InvalidDate {
                field: "excluded_dates".into(),
                value: date.clone(),
            });
        }
    }

    if config.command.max_procs == Some(0) {
        errors.push(ValidationError::ZeroMaxProcs);
    }

    errors
}

fn check_time(errors: &mut Vec<ValidationError>, field: &str, value: &str) -> Option<WallClock> {
    let parsed = WallClock::parse(value);
    if parsed.is_none() {
        errors.push(ValidationError::InvalidTime {
            field: field.into(),
            value: value.into(),
        });
    }
    parsed
}

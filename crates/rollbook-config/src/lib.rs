//! Configuration parsing and validation for rollbook
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Class roster settings (login prefix, ignored accounts)
//! - Weekly meeting schedule (day letters, start/end times, excluded dates)
//! - Validation with clear error messages
//!
//! Month-day fields (`start_day`, `excluded_dates`) carry no year; they are
//! resolved against the report's run year, since a semester never spans a
//! year boundary.

mod schedule;
mod schema;
mod validation;

pub use schedule::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate configuration from a TOML file.
///
/// `year` is the run year used to resolve month-day fields into dates.
pub fn load_config(path: impl AsRef<Path>, year: i32) -> ConfigResult<Schedule> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, year)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str, year: i32) -> ConfigResult<Schedule> {
    let raw: RawConfig = toml::from_str(content)?;

    // Check version
    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    // Validate
    let errors = validate_config(&raw, year);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    // Convert to the validated schedule
    let schedule = Schedule::from_raw(raw, year);
    tracing::debug!(
        class = %schedule.class_prefix,
        first_day = %schedule.first_day,
        meeting_days = schedule.days.count(),
        "Schedule loaded"
    );
    Ok(schedule)
}

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    const YEAR: i32 = 2026;

    #[test]
    fn parse_minimal_config() {
        let config = r#"
            config_version = 1

            [class]
            class_prefix = "cs2413"
            machine_prefix = "lab-"

            [schedule]
            days = "mwf"
            start_day = "Aug 24"
            start_time = "10:00"
            end_time = "10:50"
        "#;

        let schedule = parse_config(config, YEAR).unwrap();
        assert_eq!(schedule.class_prefix, "cs2413");
        assert_eq!(schedule.machine_prefix, "lab-");
        assert!(schedule.days.contains(Weekday::Mon));
        assert!(!schedule.days.contains(Weekday::Tue));
        assert_eq!(schedule.start.to_string(), "10:00");
        assert_eq!(schedule.end.to_string(), "10:50");
        assert!(schedule.excluded_dates.is_empty());
        assert!(schedule.ignored_logins.is_empty());
        assert!(!schedule.everyone);
    }

    #[test]
    fn parse_full_config() {
        let config = r#"
            config_version = 1

            [class]
            class_prefix = "cs2413"
            machine_prefix = "lab-"
            everyone = true
            ignore = ["cs2413ta", "cs2413grader"]

            [schedule]
            days = "tr"
            start_day = "Aug 25"
            start_time = "13:30"
            end_time = "14:45"
            excluded_dates = ["Nov 26", "Nov 27"]

            [command]
            max_procs = 250
        "#;

        let schedule = parse_config(config, YEAR).unwrap();
        assert!(schedule.everyone);
        assert!(schedule.ignored_logins.contains("cs2413ta"));
        assert_eq!(schedule.excluded_dates.len(), 2);
        assert_eq!(schedule.max_procs, 250);
    }

    #[test]
    fn reject_wrong_version() {
        let config = r#"
            config_version = 99

            [class]
            class_prefix = "cs2413"
            machine_prefix = "lab-"

            [schedule]
            days = "mwf"
            start_day = "Aug 24"
            start_time = "10:00"
            end_time = "10:50"
        "#;

        let result = parse_config(config, YEAR);
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_missing_schedule() {
        let config = r#"
            config_version = 1

            [class]
            class_prefix = "cs2413"
            machine_prefix = "lab-"
        "#;

        assert!(matches!(
            parse_config(config, YEAR),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
                config_version = 1

                [class]
                class_prefix = "cs2413"
                machine_prefix = "lab-"

                [schedule]
                days = "f"
                start_day = "Aug 28"
                start_time = "09:00"
                end_time = "09:50"
            "#
        )
        .unwrap();

        let schedule = load_config(file.path(), YEAR).unwrap();
        assert!(schedule.days.contains(Weekday::Fri));
    }
}

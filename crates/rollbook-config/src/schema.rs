//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Class and roster settings
    pub class: RawClassConfig,

    /// Weekly meeting schedule
    pub schedule: RawScheduleConfig,

    /// External command settings
    #[serde(default)]
    pub command: RawCommandConfig,
}

/// Class and roster settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawClassConfig {
    /// Login prefix shared by every account in the class (e.g. "cs2413")
    pub class_prefix: String,

    /// Hostname prefix of the lab machine group queried for sessions
    pub machine_prefix: String,

    /// Include accounts whose directory entry has no display name
    #[serde(default)]
    pub everyone: bool,

    /// Logins excluded from attendance and roll call (TAs, graders)
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Weekly meeting schedule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawScheduleConfig {
    /// Day letters: m t w r f s u (registrar convention, r = Thursday)
    pub days: String,

    /// First meeting day of the semester (month-day, e.g. "Aug 24")
    pub start_day: String,

    /// Meeting start time-of-day (HH:MM)
    pub start_time: String,

    /// Meeting end time-of-day (HH:MM)
    pub end_time: String,

    /// Calendar dates with no meeting (holidays), month-day strings
    #[serde(default)]
    pub excluded_dates: Vec<String>,
}

/// External command settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawCommandConfig {
    /// Cap on concurrently spawned subprocesses during the dsh fan-out
    pub max_procs: Option<u64>,
}

impl Default for RawCommandConfig {
    fn default() -> Self {
        Self { max_procs: None }
    }
}

//! Elapsed-time token parsing
//!
//! `last` reports how long a closed session lasted as a bracketed token at
//! the end of the line: `(HH:MM)`, or `(D+HH:MM)` for sessions spanning
//! days.

use crate::ParseError;

/// Parsed elapsed-time token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
}

impl Elapsed {
    pub fn to_duration(self) -> chrono::Duration {
        chrono::Duration::days(self.days as i64)
            + chrono::Duration::hours(self.hours as i64)
            + chrono::Duration::minutes(self.minutes as i64)
    }
}

/// Parse an elapsed-time token of the form `(HH:MM)` or `(D+HH:MM)`.
///
/// The days component defaults to 0 when no `+` is present. Fails when the
/// token is not parenthesized, has no `:`, or any component is not an
/// unsigned integer.
pub fn parse_elapsed(token: &str) -> Result<Elapsed, ParseError> {
    let bad = || ParseError::Format(token.to_string());

    let inner = token
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(bad)?;

    let (days, clock) = match inner.split_once('+') {
        Some((d, rest)) => (d.parse::<u32>().map_err(|_| bad())?, rest),
        None => (0, inner),
    };

    let (hours, minutes) = clock.split_once(':').ok_or_else(bad)?;
    let hours = hours.parse::<u32>().map_err(|_| bad())?;
    let minutes = minutes.parse::<u32>().map_err(|_| bad())?;

    Ok(Elapsed {
        days,
        hours,
        minutes,
    })
}

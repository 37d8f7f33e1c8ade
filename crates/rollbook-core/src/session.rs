//! Session records and session-line parsing
//!
//! Input lines come from the session-source collaborator: `last` output with
//! the originating hostname moved to the end of each line and any leading
//! banner lines already stripped. Two shapes survive that reshaping, e.g.:
//!
//! ```text
//! cs2413x07 :0 Mon Aug 24 10:02 - 10:48 (00:46) lab-04
//! cs2413x07 :0 Mon Aug 24 10:02 still logged in lab-04
//! ```
//!
//! Lines whose tty field does not begin with `:` are remote connections and
//! are dropped without comment; that filter is a design rule, not an error
//! path. Structurally broken lines are skipped and reported back to the
//! caller in `ParseOutcome::failures`.

use chrono::{DateTime, Local, TimeZone};
use thiserror::Error;
use tracing::debug;

use crate::parse_elapsed;

/// Per-line parse errors. None of these abort a run; the offending line is
/// skipped and surfaced in `ParseOutcome::failures`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Malformed elapsed-time token '{0}'")]
    Format(String),

    #[error("Too few fields in session line")]
    TooFewFields,

    #[error("Unparseable login date '{0}'")]
    BadDate(String),
}

/// Resolves a login to a display name, or `None` when the system directory
/// has no name for it. Implementations are expected to memoize per run.
pub trait NameResolver {
    fn resolve(&mut self, login: &str) -> Option<String>;
}

/// One observed login occurrence. Immutable after parsing; the aggregators
/// never write back into these records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Account login, unique per account (not per session)
    pub login: String,

    /// Resolved display name, `None` when the directory entry has no name
    pub display_name: Option<String>,

    /// When the session began
    pub start: DateTime<Local>,

    /// When the session ended; `None` while still active
    pub end: Option<DateTime<Local>>,

    /// Originating host
    pub machine: String,

    /// Original line, retained for diagnostics
    pub raw: String,
}

impl Session {
    /// Label used to identify the person in reports and the still-active
    /// registry: the display name, or the login when unresolved.
    pub fn person_label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.login)
    }
}

/// A session line that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub line: String,
    pub error: ParseError,
}

/// Result of parsing a batch of session lines
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub sessions: Vec<Session>,
    pub failures: Vec<ParseFailure>,
}

/// Parse raw session lines into `Session` records.
///
/// `year` is the run year; `last` prints no year, and a semester never spans
/// a year boundary. Remote lines are silently filtered; malformed lines are
/// collected into `failures` and the rest of the batch still parses.
pub fn parse_sessions<R: NameResolver>(
    lines: &[String],
    year: i32,
    resolver: &mut R,
) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for line in lines {
        match parse_line(line, year, resolver) {
            Ok(Some(session)) => outcome.sessions.push(session),
            Ok(None) => {} // remote connection, dropped by design
            Err(error) => {
                debug!(line = %line, %error, "Skipping malformed session line");
                outcome.failures.push(ParseFailure {
                    line: line.clone(),
                    error,
                });
            }
        }
    }

    outcome
}

fn parse_line<R: NameResolver>(
    line: &str,
    year: i32,
    resolver: &mut R,
) -> Result<Option<Session>, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    if fields.len() < 2 {
        return Err(ParseError::TooFewFields);
    }

    // Only local console logins count; a tty of ":0" or similar marks one
    if !fields[1].starts_with(':') {
        return Ok(None);
    }

    // login tty wday mon day hh:mm (still|-) ... machine
    if fields.len() < 8 {
        return Err(ParseError::TooFewFields);
    }

    let start = parse_login_date(&fields[3..6], year)?;

    let end = if fields[6] == "still" {
        None
    } else {
        let elapsed = parse_elapsed(fields[fields.len() - 2])?;
        Some(start + elapsed.to_duration())
    };

    let login = fields[0].to_string();
    let display_name = resolver.resolve(&login);

    Ok(Some(Session {
        login,
        display_name,
        start,
        end,
        machine: fields[fields.len() - 1].to_string(),
        raw: line.to_string(),
    }))
}

fn parse_login_date(fields: &[&str], year: i32) -> Result<DateTime<Local>, ParseError> {
    let text = fields.join(" ");
    let naive = chrono::NaiveDateTime::parse_from_str(
        &format!("{} {}", year, text),
        "%Y %b %d %H:%M",
    )
    .map_err(|_| ParseError::BadDate(text.clone()))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or(ParseError::BadDate(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::collections::BTreeMap;

    struct StubResolver {
        names: BTreeMap<String, String>,
        lookups: u32,
    }

    impl StubResolver {
        fn new(pairs: &[(&str, &str)]) -> Self {
            Self {
                names: pairs
                    .iter()
                    .map(|(l, n)| (l.to_string(), n.to_string()))
                    .collect(),
                lookups: 0,
            }
        }
    }

    impl NameResolver for StubResolver {
        fn resolve(&mut self, login: &str) -> Option<String> {
            self.lookups += 1;
            self.names.get(login).cloned()
        }
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_closed_session() {
        let mut resolver = StubResolver::new(&[("cs2413x07", "Ada Lovelace")]);
        let outcome = parse_sessions(
            &lines(&["cs2413x07 :0 Mon Aug 24 10:02 - 10:48 (00:46) lab-04"]),
            2026,
            &mut resolver,
        );

        assert!(outcome.failures.is_empty());
        let s = &outcome.sessions[0];
        assert_eq!(s.login, "cs2413x07");
        assert_eq!(s.display_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(s.machine, "lab-04");
        assert_eq!((s.start.month(), s.start.day()), (8, 24));
        assert_eq!((s.start.hour(), s.start.minute()), (10, 2));
        let end = s.end.unwrap();
        assert_eq!((end.hour(), end.minute()), (10, 48));
    }

    #[test]
    fn parses_still_active_session() {
        let mut resolver = StubResolver::new(&[]);
        let outcome = parse_sessions(
            &lines(&["cs2413x07 :0 Mon Aug 24 10:02 still logged in lab-04"]),
            2026,
            &mut resolver,
        );

        let s = &outcome.sessions[0];
        assert_eq!(s.end, None);
        assert_eq!(s.display_name, None);
        assert_eq!(s.person_label(), "cs2413x07");
        assert_eq!(s.machine, "lab-04");
    }

    #[test]
    fn session_spanning_days() {
        let mut resolver = StubResolver::new(&[]);
        let outcome = parse_sessions(
            &lines(&["cs2413x07 :0 Fri Aug 28 23:50 - 00:20 (1+00:30) lab-04"]),
            2026,
            &mut resolver,
        );

        let s = &outcome.sessions[0];
        let end = s.end.unwrap();
        assert_eq!((end.month(), end.day()), (8, 30));
        assert_eq!((end.hour(), end.minute()), (0, 20));
    }

    #[test]
    fn remote_lines_silently_dropped() {
        let mut resolver = StubResolver::new(&[]);
        let outcome = parse_sessions(
            &lines(&[
                "cs2413x07 pts/3 Mon Aug 24 10:02 - 10:48 (00:46) lab-04",
                "cs2413x08 :0 Mon Aug 24 10:05 - 10:40 (00:35) lab-05",
            ]),
            2026,
            &mut resolver,
        );

        assert_eq!(outcome.sessions.len(), 1);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.sessions[0].login, "cs2413x08");
        // No directory lookup for the dropped remote line
        assert_eq!(resolver.lookups, 1);
    }

    #[test]
    fn short_line_reported_not_fatal() {
        let mut resolver = StubResolver::new(&[]);
        let outcome = parse_sessions(
            &lines(&[
                "cs2413x07 :0 Mon Aug 24",
                "cs2413x08 :0 Mon Aug 24 10:05 - 10:40 (00:35) lab-05",
            ]),
            2026,
            &mut resolver,
        );

        assert_eq!(outcome.sessions.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].error, ParseError::TooFewFields);
    }

    #[test]
    fn bad_elapsed_token_reported() {
        let mut resolver = StubResolver::new(&[]);
        let outcome = parse_sessions(
            &lines(&["cs2413x07 :0 Mon Aug 24 10:02 - 10:48 00:46 lab-04"]),
            2026,
            &mut resolver,
        );

        assert!(outcome.sessions.is_empty());
        assert!(matches!(outcome.failures[0].error, ParseError::Format(_)));
    }

    #[test]
    fn bad_date_reported() {
        let mut resolver = StubResolver::new(&[]);
        let outcome = parse_sessions(
            &lines(&["cs2413x07 :0 Mon Frogtober 24 10:02 - 10:48 (00:46) lab-04"]),
            2026,
            &mut resolver,
        );

        assert!(matches!(outcome.failures[0].error, ParseError::BadDate(_)));
    }

    #[test]
    fn empty_line_reported() {
        let mut resolver = StubResolver::new(&[]);
        let outcome = parse_sessions(&lines(&[""]), 2026, &mut resolver);
        assert_eq!(outcome.failures.len(), 1);
    }
}

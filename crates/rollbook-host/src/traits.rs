//! Collaborator traits and errors

use rollbook_core::{NameResolver, RosterEntry};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from external collaborators. All of these are fatal to the run;
/// there are no retries on the fan-out commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("Command '{command}' failed: {detail}")]
    Failed { command: String, detail: String },

    #[error("Unexpected command output: {0}")]
    MalformedOutput(String),

    #[error("Failed to set process resource limit: {0}")]
    ResourceLimit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Supplies raw session lines for a machine group and class prefix.
///
/// Lines arrive with any leading banner stripped and the originating
/// hostname moved to the end of each line, ready for the session parser.
pub trait SessionSource {
    fn fetch_sessions(&self, machine_prefix: &str, class_prefix: &str)
        -> CommandResult<Vec<String>>;
}

/// Supplies the set of logins currently at a console.
pub trait PresenceSource {
    fn fetch_active_logins(
        &self,
        machine_prefix: &str,
        class_prefix: &str,
    ) -> CommandResult<Vec<String>>;
}

/// Supplies every account known to the system directory for a class prefix.
/// Entries with no display name are included only when `everyone` is set.
pub trait RosterSource {
    fn roster(&self, class_prefix: &str, everyone: bool) -> CommandResult<Vec<RosterEntry>>;
}

/// Per-run memoization wrapper around any `NameResolver`.
///
/// Directory lookups hit the filesystem (or worse); a report resolves the
/// same handful of logins over and over, so misses are cached too.
pub struct CachingResolver<R> {
    inner: R,
    cache: BTreeMap<String, Option<String>>,
}

impl<R: NameResolver> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: BTreeMap::new(),
        }
    }
}

impl<R: NameResolver> NameResolver for CachingResolver<R> {
    fn resolve(&mut self, login: &str) -> Option<String> {
        if let Some(cached) = self.cache.get(login) {
            return cached.clone();
        }
        let resolved = self.inner.resolve(login);
        self.cache.insert(login.to_string(), resolved.clone());
        resolved
    }
}

//! Mock collaborators for unit/integration testing

use rollbook_core::{NameResolver, RosterEntry};
use std::collections::BTreeMap;

use crate::{CommandError, CommandResult, PresenceSource, RosterSource, SessionSource};

/// In-memory lab: canned session lines, live logins, and a directory
#[derive(Debug, Clone, Default)]
pub struct MockLab {
    /// Session lines returned by `fetch_sessions`, already reshaped
    pub session_lines: Vec<String>,

    /// Logins returned by `fetch_active_logins`
    pub active_logins: Vec<String>,

    /// login -> display name (None models a blank directory entry)
    pub directory: BTreeMap<String, Option<String>>,

    /// Make every command fail, for error-path tests
    pub fail_commands: bool,
}

impl MockLab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_lines(mut self, lines: &[&str]) -> Self {
        self.session_lines = lines.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_active_logins(mut self, logins: &[&str]) -> Self {
        self.active_logins = logins.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_account(mut self, login: &str, name: Option<&str>) -> Self {
        self.directory
            .insert(login.to_string(), name.map(str::to_string));
        self
    }

    fn check(&self) -> CommandResult<()> {
        if self.fail_commands {
            Err(CommandError::Failed {
                command: "mock".into(),
                detail: "configured to fail".into(),
            })
        } else {
            Ok(())
        }
    }
}

impl SessionSource for MockLab {
    fn fetch_sessions(
        &self,
        _machine_prefix: &str,
        class_prefix: &str,
    ) -> CommandResult<Vec<String>> {
        self.check()?;
        Ok(self
            .session_lines
            .iter()
            .filter(|l| l.starts_with(class_prefix))
            .cloned()
            .collect())
    }
}

impl PresenceSource for MockLab {
    fn fetch_active_logins(
        &self,
        _machine_prefix: &str,
        class_prefix: &str,
    ) -> CommandResult<Vec<String>> {
        self.check()?;
        Ok(self
            .active_logins
            .iter()
            .filter(|l| l.starts_with(class_prefix))
            .cloned()
            .collect())
    }
}

impl RosterSource for MockLab {
    fn roster(&self, class_prefix: &str, everyone: bool) -> CommandResult<Vec<RosterEntry>> {
        self.check()?;
        Ok(self
            .directory
            .iter()
            .filter(|(login, name)| {
                login.starts_with(class_prefix) && (name.is_some() || everyone)
            })
            .map(|(login, name)| RosterEntry {
                display_name: name.clone(),
                login: login.clone(),
            })
            .collect())
    }
}

impl NameResolver for MockLab {
    fn resolve(&mut self, login: &str) -> Option<String> {
        self.directory.get(login).cloned().flatten()
    }
}

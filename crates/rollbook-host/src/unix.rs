//! Unix collaborators: dsh fan-out and the passwd directory
//!
//! Session and presence data come from running `last`/`who` on every
//! machine in the lab group via `dsh`. Each payload line comes back
//! prefixed `hostname: ...`; the hostname is moved to the end of the line
//! so the session parser sees a fixed field layout. dsh prints a banner
//! before the payload; everything before its "executing" line is noise.

use rollbook_core::{NameResolver, RosterEntry};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info, warn};

use crate::{CommandError, CommandResult, PresenceSource, RosterSource, SessionSource};

/// Session and presence source backed by `dsh` across the machine group
#[derive(Debug, Clone)]
pub struct DshLab {
    /// Cap on concurrently spawned subprocesses. dsh forks once per
    /// machine; without a limit a large group can hang the host.
    max_procs: u64,
}

impl DshLab {
    pub fn new(max_procs: u64) -> Self {
        Self { max_procs }
    }

    fn run_dsh(&self, machine_prefix: &str, remote_command: &str) -> CommandResult<Vec<String>> {
        self.limit_processes()?;

        let mut cmd = Command::new("dsh");
        cmd.args(["-f", "-N", machine_prefix, "-e", remote_command]);

        debug!(machine_prefix, remote_command, "Running dsh fan-out");

        let output = cmd.output().map_err(|source| CommandError::Spawn {
            command: format!("dsh -f -N {} -e '{}'", machine_prefix, remote_command),
            source,
        })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                command: format!("dsh -f -N {}", machine_prefix),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        strip_banner(text.lines())
    }

    #[cfg(unix)]
    fn limit_processes(&self) -> CommandResult<()> {
        use nix::sys::resource::{setrlimit, Resource};

        setrlimit(Resource::RLIMIT_NPROC, self.max_procs, self.max_procs)
            .map_err(|e| CommandError::ResourceLimit(e.to_string()))
    }
}

/// Drop dsh's banner, then reshape each payload line.
///
/// The banner ends at the first line starting with "executing"; seeing none
/// at all means dsh never ran the remote command.
fn strip_banner<'a>(mut lines: impl Iterator<Item = &'a str>) -> CommandResult<Vec<String>> {
    loop {
        match lines.next() {
            Some(line) if line.starts_with("executing") => break,
            Some(line) => {
                warn!(line, "Skipping dsh banner line");
            }
            None => {
                return Err(CommandError::MalformedOutput(
                    "dsh output ended before its 'executing' line".into(),
                ));
            }
        }
    }

    Ok(lines
        .filter(|l| !l.trim().is_empty())
        .map(reshape_line)
        .collect())
}

/// Move the `hostname:` prefix of a payload line to the end of the line.
/// A line with no colon passes through untouched and will be reported by
/// the session parser instead.
fn reshape_line(line: &str) -> String {
    match line.split_once(':') {
        Some((host, rest)) => format!("{} {}", rest.trim_start(), host),
        None => line.to_string(),
    }
}

impl SessionSource for DshLab {
    fn fetch_sessions(
        &self,
        machine_prefix: &str,
        class_prefix: &str,
    ) -> CommandResult<Vec<String>> {
        let remote = format!("last | grep ^{}", escape_for_grep(class_prefix));
        let lines = self.run_dsh(machine_prefix, &remote)?;
        info!(count = lines.len(), "Collected session lines");
        Ok(lines)
    }
}

impl PresenceSource for DshLab {
    fn fetch_active_logins(
        &self,
        machine_prefix: &str,
        class_prefix: &str,
    ) -> CommandResult<Vec<String>> {
        let remote = format!("who | grep ^{}", escape_for_grep(class_prefix));
        let lines = self.run_dsh(machine_prefix, &remote)?;

        let mut logins: Vec<String> = lines
            .iter()
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                let login = fields.next()?;
                let tty = fields.next()?;
                // Console logins only, same rule as the session parser
                tty.starts_with(':').then(|| login.to_string())
            })
            .collect();
        logins.sort();
        logins.dedup();

        info!(count = logins.len(), "Collected active logins");
        Ok(logins)
    }
}

/// Class prefixes may contain character classes like `[0-9]`; brackets must
/// survive the remote shell to reach grep.
fn escape_for_grep(prefix: &str) -> String {
    prefix.replace('[', "\\[").replace(']', "\\]")
}

/// Name resolution and roster listing from a passwd-style directory file
#[derive(Debug, Clone)]
pub struct PasswdDirectory {
    path: PathBuf,
}

impl PasswdDirectory {
    pub fn new() -> Self {
        Self {
            path: PathBuf::from("/etc/passwd"),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> std::io::Result<String> {
        std::fs::read_to_string(&self.path)
    }
}

impl Default for PasswdDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// First comma-separated field of the GECOS column, or `None` when blank
fn gecos_name(line: &str) -> Option<String> {
    let gecos = line.split(':').nth(4)?;
    let name = gecos.split(',').next()?.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

impl NameResolver for PasswdDirectory {
    fn resolve(&mut self, login: &str) -> Option<String> {
        let content = self.read().ok()?;
        content
            .lines()
            .find(|line| line.split(':').next() == Some(login))
            .and_then(gecos_name)
    }
}

impl RosterSource for PasswdDirectory {
    fn roster(&self, class_prefix: &str, everyone: bool) -> CommandResult<Vec<RosterEntry>> {
        let content = self.read()?;
        let mut entries = Vec::new();

        for line in content.lines() {
            if !line.starts_with(class_prefix) {
                continue;
            }
            let Some(login) = line.split(':').next() else {
                continue;
            };
            let name = gecos_name(line);
            if name.is_some() || everyone {
                entries.push(RosterEntry {
                    display_name: name,
                    login: login.to_string(),
                });
            }
        }

        Ok(entries)
    }
}

//! Supervised external-command execution with marker-based success
//! detection.
//!
//! The wrapped solver can exit 0 after a non-fatal abort, so a zero exit
//! code alone is never treated as success: the combined output must also
//! contain a caller-specified marker string.

use crate::error::{HarnessError, Result};
use crate::result::CheckResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

/// Configuration for one supervised command invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Executable to invoke; receives the target file path as its only
    /// argument.
    pub command: String,

    /// Literal substring whose presence in the combined output signals
    /// success.
    pub marker: String,

    /// Hard wall-clock timeout in seconds.
    pub timeout_secs: u64,
}

impl CommandConfig {
    pub fn new(command: impl Into<String>, marker: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            command: command.into(),
            marker: marker.into(),
            timeout_secs,
        }
    }
}

/// Classification of a finished (or killed) command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandStatus {
    /// Exit 0 and the success marker was found in the combined output.
    Success,

    /// Exit 0 but the marker is absent. Reported as a failure, never as a
    /// silent pass.
    MarkerMissing,

    /// Non-zero exit code (death by signal maps to -1).
    NonZeroExit(i32),

    /// The command exceeded its timeout and was killed.
    Timeout,
}

/// Outcome of one supervised command. The captured output is retained for
/// diagnostics regardless of classification.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub status: CommandStatus,

    /// Combined stdout/stderr text, lossily decoded. Partial on timeout.
    pub output: String,
}

impl CommandOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == CommandStatus::Success
    }

    /// Fold this outcome into a check result for the given suite.
    pub fn into_check(self, package: &str, name: impl Into<String>) -> CheckResult {
        match self.status {
            CommandStatus::Success => CheckResult::ok(package, name),
            CommandStatus::MarkerMissing => CheckResult::fail(
                package,
                name,
                format!("success marker not found in output\n{}", self.output),
            ),
            CommandStatus::NonZeroExit(code) => CheckResult::fail(
                package,
                name,
                format!("exit code {code}\n{}", self.output),
            ),
            CommandStatus::Timeout => CheckResult::fail(
                package,
                name,
                format!("timed out\n{}", self.output),
            ),
        }
    }
}

/// File-selection rules for [`run_command_tree`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeSweep {
    /// Extension (without dot) of the files to run on.
    pub extension: String,

    /// Directory names pruned before descent.
    pub exclude_dirs: Vec<String>,

    /// File names skipped.
    pub exclude_files: Vec<String>,
}

/// Run `config.command <target>` in the target's parent directory under a
/// hard timeout.
///
/// On timeout the child is killed and whatever output was captured so far
/// is returned with the `Timeout` status; the child is never left running.
/// A spawn failure (missing executable) is a harness error and propagates.
pub async fn run_command(config: &CommandConfig, target: &Path) -> Result<CommandOutcome> {
    let workdir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    debug!(command = %config.command, target = %target.display(), "spawning");
    let mut child = Command::new(&config.command)
        .arg(target)
        .current_dir(&workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let mut out_buf = Vec::new();
    let mut err_buf = Vec::new();

    // Both pipes must drain while waiting, or the child blocks once a
    // pipe buffer fills.
    let supervise = async {
        let drain_out = async {
            match stdout.as_mut() {
                Some(out) => out.read_to_end(&mut out_buf).await.map(|_| ()),
                None => Ok(()),
            }
        };
        let drain_err = async {
            match stderr.as_mut() {
                Some(err) => err.read_to_end(&mut err_buf).await.map(|_| ()),
                None => Ok(()),
            }
        };
        let (out, err, status) = tokio::join!(drain_out, drain_err, child.wait());
        out?;
        err?;
        status
    };

    let limit = Duration::from_secs(config.timeout_secs);
    let status = match tokio::time::timeout(limit, supervise).await {
        Ok(status) => Some(status?),
        Err(_) => {
            child.kill().await.ok();
            None
        }
    };

    let output = format!(
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&out_buf),
        String::from_utf8_lossy(&err_buf)
    );

    let status = match status {
        None => CommandStatus::Timeout,
        Some(status) if status.success() => {
            if output.contains(&config.marker) {
                CommandStatus::Success
            } else {
                CommandStatus::MarkerMissing
            }
        }
        Some(status) => CommandStatus::NonZeroExit(status.code().unwrap_or(-1)),
    };

    Ok(CommandOutcome { status, output })
}

/// Apply [`run_command`] to every matching file under `root`, recursively,
/// in lexicographic order. Returns the outcomes in traversal order.
pub async fn run_command_tree(
    config: &CommandConfig,
    root: &Path,
    sweep: &TreeSweep,
) -> Result<Vec<(PathBuf, CommandOutcome)>> {
    let targets = collect_targets(root, sweep)?;
    let mut outcomes = Vec::with_capacity(targets.len());
    for target in targets {
        let outcome = run_command(config, &target).await?;
        outcomes.push((target, outcome));
    }
    Ok(outcomes)
}

/// Collect the files a tree sweep selects, in lexicographic order.
pub(crate) fn collect_targets(root: &Path, sweep: &TreeSweep) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(HarnessError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    let mut targets = Vec::new();
    collect_into(root, sweep, &mut targets)?;
    Ok(targets)
}

fn collect_into(dir: &Path, sweep: &TreeSweep, targets: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if path.is_dir() {
            if sweep.exclude_dirs.iter().any(|d| *d == name) {
                continue;
            }
            collect_into(&path, sweep, targets)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(sweep.extension.as_str()) {
            if sweep.exclude_files.iter().any(|f| *f == name) {
                continue;
            }
            targets.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_config_new() {
        let config = CommandConfig::new("fds", "STOP: FDS completed successfully", 3600);
        assert_eq!(config.command, "fds");
        assert_eq!(config.timeout_secs, 3600);
    }

    #[test]
    fn test_outcome_into_check_success() {
        let outcome = CommandOutcome {
            status: CommandStatus::Success,
            output: "stdout:\nok\nstderr:\n".to_string(),
        };
        let r = outcome.into_check("p", "fds <case.fds>");
        assert!(r.is_ok());
    }

    #[test]
    fn test_outcome_into_check_retains_output() {
        let outcome = CommandOutcome {
            status: CommandStatus::NonZeroExit(2),
            output: "stdout:\nboom\nstderr:\n".to_string(),
        };
        let r = outcome.into_check("p", "fds <case.fds>");
        assert!(!r.is_ok());
        let log = r.log.unwrap();
        assert!(log.contains("exit code 2"));
        assert!(log.contains("boom"));
    }

    #[test]
    fn test_marker_missing_is_not_success() {
        let outcome = CommandOutcome {
            status: CommandStatus::MarkerMissing,
            output: String::new(),
        };
        assert!(!outcome.succeeded());
        assert!(!outcome.into_check("p", "n").is_ok());
    }

    #[test]
    fn test_collect_targets_rejects_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("case.fds");
        std::fs::write(&file, "&HEAD /\n").unwrap();
        let sweep = TreeSweep {
            extension: "fds".to_string(),
            ..Default::default()
        };
        match collect_targets(&file, &sweep) {
            Err(HarnessError::NotADirectory { path }) => assert_eq!(path, file),
            other => panic!("expected NotADirectory, got {other:?}"),
        }
    }

    #[test]
    fn test_collect_targets_order_and_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::create_dir(dir.path().join("skip")).unwrap();
        std::fs::write(dir.path().join("b/two.fds"), "").unwrap();
        std::fs::write(dir.path().join("a/one.fds"), "").unwrap();
        std::fs::write(dir.path().join("a/ignored.txt"), "").unwrap();
        std::fs::write(dir.path().join("a/excluded.fds"), "").unwrap();
        std::fs::write(dir.path().join("skip/three.fds"), "").unwrap();

        let sweep = TreeSweep {
            extension: "fds".to_string(),
            exclude_dirs: vec!["skip".to_string()],
            exclude_files: vec!["excluded.fds".to_string()],
        };
        let targets = collect_targets(dir.path(), &sweep).unwrap();
        let names: Vec<_> = targets
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a/one.fds", "b/two.fds"]);
    }
}

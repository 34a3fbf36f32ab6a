//! Privileged command execution
//!
//! Runs a resolved argv under the escalation/interactivity policy: an
//! already-elevated process executes directly, an interactive session gets
//! the escalation wrapper prepended with its streams wired through so a
//! password prompt is answerable, and everything else is refused before a
//! child is ever spawned. Query-mode execution captures stdout and stderr
//! separately under a bounded wait.

use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::profile;

/// The external privilege-elevation command.
pub const ESCALATION_COMMAND: &str = "sudo";

/// How long a captured-output query may run before its child is killed.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Captured output of a successful query execution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapturedOutput {
    pub stdout: String,
    pub code: Option<i32>,
}

/// Execution failures.
#[derive(Debug)]
pub enum ExecError {
    /// Escalation is needed but there is no channel to satisfy a prompt:
    /// not root, and stdin is not an interactive terminal.
    PermissionDenied,
    /// The child process could not be started.
    Spawn(String),
    /// Nonzero exit, or zero exit with output on stderr; several provider
    /// tools report failure on stderr without a nonzero status.
    Failed { code: Option<i32>, stderr: String },
    /// The query deadline expired and the child was killed.
    Timeout,
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecError::PermissionDenied => {
                write!(f, "escalation requires an interactive terminal or root privileges")
            }
            ExecError::Spawn(msg) => write!(f, "failed to start command: {}", msg),
            ExecError::Failed { code, stderr } => {
                let detail = stderr.trim();
                match (code, detail.is_empty()) {
                    (Some(code), false) => write!(f, "command failed (exit {}): {}", code, detail),
                    (Some(code), true) => write!(f, "command failed (exit {})", code),
                    (None, false) => write!(f, "command failed: {}", detail),
                    (None, true) => write!(f, "command failed"),
                }
            }
            ExecError::Timeout => write!(f, "command timed out"),
        }
    }
}

impl std::error::Error for ExecError {}

/// Decide how an argv executes under the current privilege state.
///
/// Pure policy, no side effects: root runs the argv unchanged; an
/// interactive non-root session gets the escalation wrapper prepended;
/// a non-interactive non-root context is refused outright.
pub fn escalation_plan(
    argv: &[String],
    is_root: bool,
    interactive: bool,
) -> Result<Vec<String>, ExecError> {
    if argv.is_empty() {
        return Err(ExecError::Spawn("empty command line".to_string()));
    }
    if is_root {
        return Ok(argv.to_vec());
    }
    if !interactive {
        return Err(ExecError::PermissionDenied);
    }

    let mut plan = Vec::with_capacity(argv.len() + 1);
    plan.push(ESCALATION_COMMAND.to_string());
    plan.extend(argv.iter().cloned());
    Ok(plan)
}

/// The captured-output execution capability, as a trait so the analyzer
/// takes test doubles at construction time.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run_query(&self, argv: &[String]) -> Result<CapturedOutput, ExecError>;
}

/// Production executor bound to the real process context.
pub struct SystemRunner {
    is_root: bool,
    interactive: bool,
    query_timeout: Duration,
}

impl SystemRunner {
    /// Build a runner from the live process context: effective UID and
    /// whether stdin is attached to a terminal.
    pub fn new() -> Self {
        Self::with_context(profile::is_root(), std::io::stdin().is_terminal())
    }

    /// Build a runner with an explicit privilege/interactivity context.
    pub fn with_context(is_root: bool, interactive: bool) -> Self {
        Self {
            is_root,
            interactive,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Run an argv that needs elevated privilege, streams inherited from
    /// the invoking session. No deadline applies here: an escalation
    /// prompt must stay answerable for as long as the user needs.
    pub async fn run_privileged(&self, argv: &[String]) -> Result<(), ExecError> {
        let plan = escalation_plan(argv, self.is_root, self.interactive)?;

        let status = Command::new(&plan[0])
            .args(&plan[1..])
            .status()
            .await
            .map_err(|e| ExecError::Spawn(e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::Failed {
                code: status.code(),
                stderr: String::new(),
            })
        }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SystemRunner {
    /// Run an argv with stdout and stderr captured separately and stdin
    /// closed. The child is killed when the deadline expires.
    async fn run_query(&self, argv: &[String]) -> Result<CapturedOutput, ExecError> {
        if argv.is_empty() {
            return Err(ExecError::Spawn("empty command line".to_string()));
        }

        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| ExecError::Spawn(e.to_string()))?;

        let output = match timeout(self.query_timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(ExecError::Spawn(e.to_string())),
            // The timeout dropped the wait future; kill_on_drop reaps the child.
            Err(_) => return Err(ExecError::Timeout),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code();

        if !output.status.success() || !stderr.trim().is_empty() {
            return Err(ExecError::Failed { code, stderr });
        }

        Ok(CapturedOutput { stdout, code })
    }
}

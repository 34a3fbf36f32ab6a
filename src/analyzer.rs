//! Command-failure analysis
//!
//! The orchestrator behind the shell hooks: given the text of a command
//! line that was not found or exited with an error, resolve the command
//! the user meant, build the "who provides this" query for the detected
//! package-manager family, and run it in captured-output mode. The raw
//! provider output is handed to the (external) suggestion layer.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::executor::{CommandRunner, ExecError};
use crate::pm::{PackageAction, PmFamily};
use crate::resolver;
use crate::shell_parser::{self, ParseError};

/// Outcome of one analysis event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Analysis {
    /// Raw provider output, ready for the suggestion layer.
    Providers { command: String, output: String },
    /// Nothing useful to say; the user's prompt stays untouched.
    Skipped(SkipReason),
}

/// Why an event produced no provider query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Exit code 0: nothing failed.
    CleanExit,
    /// Exit code 127: the not-found hook already covered it.
    HandledAsNotFound,
    /// Exit code 130: the user interrupted the command.
    Interrupted,
    /// No token survived launcher/assignment/flag filtering.
    NoEffectiveCommand,
    /// No provides template for the detected family.
    UnsupportedFamily,
}

/// Errors that abort a single analysis event. None of these may take the
/// hosting shell down with them.
#[derive(Debug)]
pub enum AnalyzeError {
    Parse(ParseError),
    Exec(ExecError),
}

impl std::fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzeError::Parse(e) => write!(f, "could not parse command line: {}", e),
            AnalyzeError::Exec(e) => write!(f, "provider query failed: {}", e),
        }
    }
}

impl std::error::Error for AnalyzeError {}

impl From<ParseError> for AnalyzeError {
    fn from(e: ParseError) -> Self {
        AnalyzeError::Parse(e)
    }
}

impl From<ExecError> for AnalyzeError {
    fn from(e: ExecError) -> Self {
        AnalyzeError::Exec(e)
    }
}

/// Per-event analyzer. One instance serves many events; each event gets
/// its own id and never shares state with another.
pub struct FailureAnalyzer<R> {
    runner: R,
    family: PmFamily,
}

impl<R: CommandRunner> FailureAnalyzer<R> {
    pub fn new(runner: R, family: PmFamily) -> Self {
        Self { runner, family }
    }

    /// The not-found trigger: the attempted command line is known
    /// immediately, since the command never started.
    pub async fn handle_not_found(&self, cmdline: &str) -> Result<Analysis, AnalyzeError> {
        let event = event_id();
        debug!(%event, cmdline, "analyzing command not found");
        self.analyze(&event, cmdline).await
    }

    /// The exited-with-error trigger, driven by the previously captured
    /// command line plus its exit code. Codes 0, 127 and 130 short-circuit
    /// with no resolution or execution attempted.
    pub async fn handle_exit_status(
        &self,
        exit_code: i32,
        last_command: &str,
    ) -> Result<Analysis, AnalyzeError> {
        let event = event_id();
        let skip = match exit_code {
            0 => Some(SkipReason::CleanExit),
            127 => Some(SkipReason::HandledAsNotFound),
            130 => Some(SkipReason::Interrupted),
            _ => None,
        };
        if let Some(reason) = skip {
            debug!(%event, exit_code, ?reason, "exit code needs no analysis");
            return Ok(Analysis::Skipped(reason));
        }

        debug!(%event, exit_code, cmdline = last_command, "analyzing command error");
        self.analyze(&event, last_command).await
    }

    async fn analyze(&self, event: &str, cmdline: &str) -> Result<Analysis, AnalyzeError> {
        let ast = match shell_parser::parse(cmdline) {
            Ok(ast) => ast,
            Err(e) => {
                warn!(%event, error = %e, "malformed command line, giving up on this event");
                return Err(e.into());
            }
        };

        let Some(command) = resolver::resolve_effective_command(&ast) else {
            debug!(%event, "no effective command survived filtering");
            return Ok(Analysis::Skipped(SkipReason::NoEffectiveCommand));
        };

        let Some(argv) = PackageAction::Provides.command_argv(self.family, &command) else {
            debug!(%event, family = %self.family, "no provides template for this family");
            return Ok(Analysis::Skipped(SkipReason::UnsupportedFamily));
        };

        match self.runner.run_query(&argv).await {
            Ok(output) => {
                debug!(%event, command = %command, bytes = output.stdout.len(),
                    "provider query succeeded");
                Ok(Analysis::Providers {
                    command,
                    output: output.stdout,
                })
            }
            Err(e) => {
                warn!(%event, command = %command, error = %e, "provider query failed");
                Err(e.into())
            }
        }
    }
}

fn event_id() -> String {
    format!("evt-{}", uuid::Uuid::new_v4())
}

//! pkghint - package hints for failed shell commands
//!
//! When a command is not found or exits with an error, pkghint works out
//! which command the user actually meant, asks the system package manager
//! which package provides it, and hands the raw answer to the suggestion
//! layer.
//!
//! Modules:
//! - shell_parser: command-line text to an ordered call-expression tree
//! - resolver: launcher/assignment/flag filtering to the effective command
//! - path_scan: executable lookup and enumeration over $PATH
//! - profile: OS kind, distro identity and package-manager family detection
//! - pm: package-manager families, actions and the command template table
//! - executor: privileged/captured command execution policy
//! - analyzer: the not-found and exited-with-error orchestration
//! - settings: persisted configuration read by the hook entry points
//! - shell_hooks: bash integration (hook script generation and splicing)

pub mod analyzer;
pub mod executor;
pub mod path_scan;
pub mod pm;
pub mod profile;
pub mod resolver;
pub mod settings;
pub mod shell_hooks;
pub mod shell_parser;

// Re-export key types for convenience
pub use analyzer::{Analysis, AnalyzeError, FailureAnalyzer, SkipReason};

pub use executor::{
    escalation_plan, CapturedOutput, CommandRunner, ExecError, SystemRunner,
    DEFAULT_QUERY_TIMEOUT, ESCALATION_COMMAND,
};

pub use pm::{PackageAction, PmFamily, QUERY_PLACEHOLDER};

pub use profile::SystemProfile;

pub use resolver::{resolve, resolve_effective_command, LAUNCHERS};

pub use settings::{last_command, Settings, LAST_COMMAND_ENV};

pub use shell_hooks::{ShellHooks, ShellKind, HOOK_END, HOOK_START, INSTALL_PATH};

pub use shell_parser::{parse, CallExpr, CommandLineAst, ParseError};

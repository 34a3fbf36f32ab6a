//! Effective-command resolution
//!
//! Walks a parsed command line and strips away everything that does not
//! represent user intent (launcher/wrapper commands, environment
//! assignments and flags), leaving the basename of the command the user
//! actually meant to run.

use crate::shell_parser::{self, CallExpr, CommandLineAst, ParseError};

/// Wrapper commands that delegate execution to a following argument and
/// never represent user intent themselves.
pub const LAUNCHERS: &[&str] = &[
    "sudo",
    "doas",
    "env",
    "nohup",
    "nice",
    "time",
    "watch",
    "xargs",
    "timeout",
    "runcon",
    "setpriv",
    "stdbuf",
    "dbus-run-session",
    "exec",
    "bash",
    "sh",
];

/// Resolve the effective command from a parsed command line.
///
/// Calls are visited in source order; within a call, tokens are scanned
/// left to right and skipped when they name a launcher, contain a literal
/// `=` (environment assignment), or start with `-` (flag). The first
/// surviving token wins, reduced to its final path segment when
/// path-qualified. Resolution stops at the first call that yields a
/// candidate: for a chain like `nano && echo ok` the answer is `nano`
/// even when a later call is the one that failed; the captured command
/// text does not say which call that was, so the first is taken.
///
/// `None` is the "nothing to suggest" outcome, not an error.
pub fn resolve_effective_command(ast: &CommandLineAst) -> Option<String> {
    ast.calls.iter().find_map(effective_in_call)
}

/// Parse and resolve in one step.
pub fn resolve(raw: &str) -> Result<Option<String>, ParseError> {
    Ok(resolve_effective_command(&shell_parser::parse(raw)?))
}

fn effective_in_call(call: &CallExpr) -> Option<String> {
    for arg in &call.args {
        if LAUNCHERS.contains(&arg.as_str()) {
            continue;
        }
        if arg.contains('=') {
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return Some(strip_path(arg));
    }
    None
}

fn strip_path(arg: &str) -> String {
    if arg.starts_with('.') || arg.starts_with('/') {
        arg.rsplit('/').next().unwrap_or(arg).to_string()
    } else {
        arg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(raw: &str) -> Option<String> {
        resolve(raw).unwrap()
    }

    #[test]
    fn test_plain_command() {
        assert_eq!(resolved("echo \"hello world\"").as_deref(), Some("echo"));
    }

    #[test]
    fn test_launcher_stripping() {
        assert_eq!(resolved("sudo nano file").as_deref(), Some("nano"));
        assert_eq!(resolved("doas nano file").as_deref(), Some("nano"));
    }

    #[test]
    fn test_every_launcher_is_skipped() {
        for launcher in LAUNCHERS {
            let line = format!("{} realcmd arg", launcher);
            assert_eq!(resolved(&line).as_deref(), Some("realcmd"), "launcher {}", launcher);
        }
    }

    #[test]
    fn test_path_stripping() {
        assert_eq!(resolved("/bin/nano file").as_deref(), Some("nano"));
        assert_eq!(resolved("./scripts/build.sh --fast").as_deref(), Some("build.sh"));
        assert_eq!(resolved("sudo /bin/nano file").as_deref(), Some("nano"));
    }

    #[test]
    fn test_env_wrapper_forms() {
        assert_eq!(resolved("env -i /bin/nano file").as_deref(), Some("nano"));
        assert_eq!(resolved("env foo=bar nano").as_deref(), Some("nano"));
        assert_eq!(resolved("FOO=bar nano").as_deref(), Some("nano"));
    }

    #[test]
    fn test_flags_are_skipped_not_taken() {
        assert_eq!(resolved("nano -flag -b /folder/file").as_deref(), Some("nano"));
    }

    #[test]
    fn test_chained_launchers() {
        assert_eq!(resolved("sudo env RUST_LOG=debug nano file").as_deref(), Some("nano"));
    }

    #[test]
    fn test_first_call_wins_in_chains() {
        assert_eq!(resolved("nano && echo 'ok'").as_deref(), Some("nano"));
        assert_eq!(resolved("cat file | grep x").as_deref(), Some("cat"));
    }

    #[test]
    fn test_later_call_consulted_when_first_yields_nothing() {
        // The first call is nothing but a launcher; the second has a command.
        assert_eq!(resolved("sudo && nano file").as_deref(), Some("nano"));
    }

    #[test]
    fn test_resolution_miss() {
        assert_eq!(resolved("sudo"), None);
        assert_eq!(resolved("FOO=bar"), None);
        assert_eq!(resolved(""), None);
    }

    #[test]
    fn test_parse_error_propagates() {
        assert!(resolve("echo 'oops").is_err());
    }
}

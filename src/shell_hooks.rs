//! Shell integration hooks
//!
//! Generates the bash snippet that wires `command_not_found_handle`, a
//! `PROMPT_COMMAND` error hook and a DEBUG trap (saving the last executed
//! command line) to the pkghint binary, and splices it into the user's
//! profile file between fixed marker lines so reinstalling replaces the
//! block instead of stacking copies.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// First line of the managed block in the profile file.
pub const HOOK_START: &str = "# --- PKGHINT_HOOK_START ---";
/// Last line of the managed block.
pub const HOOK_END: &str = "# --- PKGHINT_HOOK_END ---";

/// Where setup installs the binary so the hooks find it on any PATH.
pub const INSTALL_PATH: &str = "/usr/local/bin/pkghint";

/// Supported shell types. Only bash wires `command_not_found_handle`
/// today; other shells are reported as undetected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShellKind {
    Bash,
}

impl ShellKind {
    /// Detect shell type from a shell path or name.
    pub fn detect(shell: &str) -> Option<Self> {
        if shell.to_lowercase().contains("bash") {
            Some(ShellKind::Bash)
        } else {
            None
        }
    }
}

/// Shell hooks manager bound to one shell kind and one binary path.
pub struct ShellHooks {
    shell: ShellKind,
    binary: String,
}

impl ShellHooks {
    pub fn new(shell: ShellKind) -> Self {
        Self {
            shell,
            binary: INSTALL_PATH.to_string(),
        }
    }

    /// Point the hooks at a different binary (useful before the binary is
    /// installed to its final location).
    pub fn with_binary(mut self, binary: &str) -> Self {
        self.binary = binary.to_string();
        self
    }

    pub fn shell_kind(&self) -> ShellKind {
        self.shell
    }

    /// The user's profile file for this shell.
    pub fn profile_path(&self) -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        match self.shell {
            ShellKind::Bash => PathBuf::from(home).join(".bashrc"),
        }
    }

    /// The full marker-delimited hook block.
    pub fn hook_block(&self) -> String {
        match self.shell {
            ShellKind::Bash => self.bash_block(),
        }
    }

    fn bash_block(&self) -> String {
        const TEMPLATE: &str = r#"
# Hooks wiring shell failures to pkghint
command_not_found_handle() {
    if "{binary}" command-not-found "$@"; then
        return $?
    else
        return 127
    fi
}
export -f command_not_found_handle

_pkghint_error_handle() {
    local exit_code=$?
    # 130 is Ctrl+C, 127 goes through command_not_found_handle, 0 is success
    if [[ $exit_code -eq 0 ]] || [[ $exit_code -eq 127 ]] || [[ $exit_code -eq 130 ]]; then
        return
    fi
    "{binary}" command-error "$exit_code"
}
export -f _pkghint_error_handle

if [[ -z "$PROMPT_COMMAND" ]]; then
    export PROMPT_COMMAND="_pkghint_error_handle"
elif ! [[ "$PROMPT_COMMAND" == *"_pkghint_error_handle"* ]]; then
    export PROMPT_COMMAND="_pkghint_error_handle;${PROMPT_COMMAND}"
fi

_pkghint_save_last_cmd() {
    if [[ "$BASH_COMMAND" != "_pkghint_error_handle" ]]; then
        export PKGHINT_LAST_CMD="$BASH_COMMAND"
    fi
}
trap '_pkghint_save_last_cmd' DEBUG
"#;

        format!(
            "{}{}{}\n",
            HOOK_START,
            TEMPLATE.replace("{binary}", &self.binary),
            HOOK_END
        )
    }

    /// Install (or replace) the hook block in the given profile file.
    pub fn install(&self, profile: &Path) -> Result<()> {
        let content = std::fs::read_to_string(profile)
            .context(format!("failed to read profile file: {:?}", profile))?;

        let stripped = strip_hook_block(&content);
        let updated = format!("{}\n{}", stripped.trim_end(), self.hook_block());

        std::fs::write(profile, updated)
            .context(format!("failed to write profile file: {:?}", profile))?;
        Ok(())
    }

    /// Remove the hook block from the given profile file, if present.
    pub fn remove(&self, profile: &Path) -> Result<()> {
        let content = std::fs::read_to_string(profile)
            .context(format!("failed to read profile file: {:?}", profile))?;

        let stripped = strip_hook_block(&content);
        let updated = format!("{}\n", stripped.trim_end());

        std::fs::write(profile, updated)
            .context(format!("failed to write profile file: {:?}", profile))?;
        Ok(())
    }
}

/// Drop every line between the hook markers, markers included.
fn strip_hook_block(content: &str) -> String {
    let mut kept = Vec::new();
    let mut skipping = false;

    for line in content.lines() {
        if line.contains(HOOK_START) {
            skipping = true;
            continue;
        }
        if line.contains(HOOK_END) {
            skipping = false;
            continue;
        }
        if !skipping {
            kept.push(line);
        }
    }

    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn hooks() -> ShellHooks {
        ShellHooks::new(ShellKind::Bash).with_binary("/usr/local/bin/pkghint")
    }

    #[test]
    fn test_shell_detection() {
        assert_eq!(ShellKind::detect("/bin/bash"), Some(ShellKind::Bash));
        assert_eq!(ShellKind::detect("bash"), Some(ShellKind::Bash));
        assert_eq!(ShellKind::detect("/usr/bin/zsh"), None);
        assert_eq!(ShellKind::detect("/bin/sh"), None);
    }

    #[test]
    fn test_block_contains_both_hooks_and_markers() {
        let block = hooks().hook_block();

        assert!(block.starts_with(HOOK_START));
        assert!(block.trim_end().ends_with(HOOK_END));
        assert!(block.contains("command_not_found_handle()"));
        assert!(block.contains("_pkghint_error_handle"));
        assert!(block.contains("PKGHINT_LAST_CMD"));
        assert!(block.contains("\"/usr/local/bin/pkghint\" command-not-found"));
    }

    #[test]
    fn test_install_appends_block_once() {
        let dir = tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        std::fs::write(&rc, "alias ll='ls -la'\n").unwrap();

        hooks().install(&rc).unwrap();
        let content = std::fs::read_to_string(&rc).unwrap();

        assert!(content.starts_with("alias ll='ls -la'"));
        assert_eq!(content.matches(HOOK_START).count(), 1);
    }

    #[test]
    fn test_reinstall_replaces_instead_of_stacking() {
        let dir = tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        std::fs::write(&rc, "export PATH=$PATH:~/bin\n").unwrap();

        hooks().install(&rc).unwrap();
        hooks().install(&rc).unwrap();
        let content = std::fs::read_to_string(&rc).unwrap();

        assert_eq!(content.matches(HOOK_START).count(), 1);
        assert_eq!(content.matches(HOOK_END).count(), 1);
        assert!(content.contains("export PATH=$PATH:~/bin"));
    }

    #[test]
    fn test_remove_restores_profile() {
        let dir = tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        std::fs::write(&rc, "alias gs='git status'\n").unwrap();

        hooks().install(&rc).unwrap();
        hooks().remove(&rc).unwrap();
        let content = std::fs::read_to_string(&rc).unwrap();

        assert_eq!(content, "alias gs='git status'\n");
    }

    #[test]
    fn test_install_fails_on_missing_profile() {
        let dir = tempdir().unwrap();
        assert!(hooks().install(&dir.path().join(".bashrc")).is_err());
    }
}

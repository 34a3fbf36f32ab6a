//! Executable search-path scanning
//!
//! Resolves binary names against `$PATH` the way the shell would, and
//! enumerates every executable command name visible on it. Unreadable
//! directories are skipped, never fatal.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the first regular, executable file named `name` on `$PATH`.
pub fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_env = env::var_os("PATH")?;
    find_in_dirs(env::split_paths(&path_env), name)
}

/// Same lookup against an explicit directory list.
pub fn find_in_dirs(dirs: impl IntoIterator<Item = PathBuf>, name: &str) -> Option<PathBuf> {
    for dir in dirs {
        let candidate = dir.join(name);
        if is_executable_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Every executable command name on `$PATH`, deduplicated across
/// directories. Order is unspecified.
pub fn list_all_commands() -> Vec<String> {
    let Some(path_env) = env::var_os("PATH") else {
        return Vec::new();
    };
    list_commands_in(env::split_paths(&path_env))
}

/// Enumerate executable names in an explicit directory list.
pub fn list_commands_in(dirs: impl IntoIterator<Item = PathBuf>) -> Vec<String> {
    let mut seen = HashSet::new();

    for dir in dirs {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if is_executable_file(&path) {
                if let Some(name) = entry.file_name().to_str() {
                    seen.insert(name.to_string());
                }
            }
        }
    }

    seen.into_iter().collect()
}

fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

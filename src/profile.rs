//! System profiling: OS kind, distro identity, package-manager family
//!
//! Detection runs at most once per process; the profile is then shared
//! read-only. A missing or unreadable release-info file is never fatal;
//! the distro fields simply stay empty and analysis continues with a
//! partial profile.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::path_scan;
use crate::pm::PmFamily;

/// Fixed path of the distro release-info file on Linux.
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// What we know about the host system.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemProfile {
    /// OS kind as reported by the toolchain (`linux`, `macos`, ...).
    pub os: String,
    pub distro_id: String,
    pub distro_version: String,
    pub distro_pretty: String,
    /// Detected package-manager family, `Unknown` when none resolves.
    pub family: PmFamily,
    /// Whether the process holds elevated privilege.
    pub is_root: bool,
}

static PROFILE: OnceLock<SystemProfile> = OnceLock::new();

impl SystemProfile {
    /// Detect the host profile. On non-Linux systems the distro fields are
    /// left empty and the family stays `Unknown`; no probing occurs.
    pub fn detect() -> Self {
        let mut profile = SystemProfile {
            os: std::env::consts::OS.to_string(),
            distro_id: String::new(),
            distro_version: String::new(),
            distro_pretty: String::new(),
            family: PmFamily::Unknown,
            is_root: is_root(),
        };

        if profile.os == "linux" {
            match std::fs::read_to_string(OS_RELEASE_PATH) {
                Ok(content) => profile.apply_os_release(&content),
                Err(e) => {
                    tracing::debug!(path = OS_RELEASE_PATH, error = %e,
                        "release-info file unreadable; distro fields left empty");
                }
            }
            profile.family = detect_family();
        }

        profile
    }

    /// The memoized process-wide profile. The first caller computes it;
    /// everyone after reads the same value.
    pub fn current() -> &'static SystemProfile {
        PROFILE.get_or_init(SystemProfile::detect)
    }

    /// Apply `KEY=VALUE` release-info content. Lines without `=` are
    /// ignored; surrounding quote characters around values are trimmed;
    /// only ID, VERSION_ID and PRETTY_NAME are captured.
    fn apply_os_release(&mut self, content: &str) {
        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim_matches(|c| c == '"' || c == '\'').to_string();
            match key {
                "ID" => self.distro_id = value,
                "VERSION_ID" => self.distro_version = value,
                "PRETTY_NAME" => self.distro_pretty = value,
                _ => {}
            }
        }
    }
}

/// Whether the process runs with an effective UID of zero.
pub fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// Probe the known manager binaries in priority order; the first one
/// resolvable on `$PATH` wins. No manager resolvable yields `Unknown`,
/// never an error.
fn detect_family() -> PmFamily {
    for name in PmFamily::PROBE_ORDER {
        if path_scan::find_in_path(name).is_some() {
            return PmFamily::from_binary(name).unwrap_or(PmFamily::Unknown);
        }
    }
    PmFamily::Unknown
}

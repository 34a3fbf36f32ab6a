//! Package-manager catalog
//!
//! Two closed vocabularies (package-manager families and abstract
//! actions) and a total template table over their product. Every pair is
//! either an explicit template or explicitly unsupported; there is no
//! fallthrough a typo could hide behind.

use serde::{Deserialize, Serialize};

/// The placeholder token substituted with a package name or query term.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// The installed package-manager family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PmFamily {
    Apt,
    Dnf,
    Pacman,
    Zypper,
    Unknown,
}

impl PmFamily {
    /// Manager binaries probed against `$PATH`, in priority order.
    pub const PROBE_ORDER: &'static [&'static str] = &["apt", "apt-get", "dnf", "pacman", "zypper"];

    /// Map a manager binary name to its family. The Debian family's
    /// legacy front-end collapses to the canonical name.
    pub fn from_binary(name: &str) -> Option<PmFamily> {
        match name {
            "apt" | "apt-get" => Some(PmFamily::Apt),
            "dnf" => Some(PmFamily::Dnf),
            "pacman" => Some(PmFamily::Pacman),
            "zypper" => Some(PmFamily::Zypper),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PmFamily::Apt => "apt",
            PmFamily::Dnf => "dnf",
            PmFamily::Pacman => "pacman",
            PmFamily::Zypper => "zypper",
            PmFamily::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PmFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract package-manager actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageAction {
    Install,
    Remove,
    Search,
    Autoremove,
    Upgrade,
    Update,
    Provides,
}

impl PackageAction {
    pub const ALL: [PackageAction; 7] = [
        PackageAction::Install,
        PackageAction::Remove,
        PackageAction::Search,
        PackageAction::Autoremove,
        PackageAction::Upgrade,
        PackageAction::Update,
        PackageAction::Provides,
    ];

    pub fn help(&self) -> &'static str {
        match self {
            PackageAction::Install => "Install one or more packages.",
            PackageAction::Remove => "Remove one or more packages.",
            PackageAction::Search => "Search for available packages.",
            PackageAction::Autoremove => "Remove unused packages (cleanup).",
            PackageAction::Upgrade => "Upgrade all installed packages.",
            PackageAction::Update => "Refresh package repository information.",
            PackageAction::Provides => "Find which package provides a file or command.",
        }
    }

    /// Whether the action's templates carry a `{query}` placeholder.
    pub fn takes_argument(&self) -> bool {
        match self {
            PackageAction::Install
            | PackageAction::Remove
            | PackageAction::Search
            | PackageAction::Provides => true,
            PackageAction::Autoremove | PackageAction::Upgrade | PackageAction::Update => false,
        }
    }

    /// Whether the action needs elevated privilege. Escalation is the
    /// executor's job; templates never embed a wrapper themselves.
    pub fn requires_root(&self) -> bool {
        match self {
            PackageAction::Install
            | PackageAction::Remove
            | PackageAction::Autoremove
            | PackageAction::Upgrade
            | PackageAction::Update => true,
            PackageAction::Search | PackageAction::Provides => false,
        }
    }

    /// The command template for this action under the given family.
    ///
    /// `None` marks the pair unsupported and is a hard stop for callers:
    /// nothing is ever substituted into a missing template. Pacman has no
    /// autoremove form expressible without shell command substitution.
    pub fn template(&self, family: PmFamily) -> Option<&'static str> {
        use PackageAction::*;
        use PmFamily::*;

        match (*self, family) {
            (Install, Apt) => Some("apt install {query}"),
            (Install, Dnf) => Some("dnf install {query}"),
            (Install, Pacman) => Some("pacman -S {query}"),
            (Install, Zypper) => Some("zypper install {query}"),

            (Remove, Apt) => Some("apt remove {query}"),
            (Remove, Dnf) => Some("dnf remove {query}"),
            (Remove, Pacman) => Some("pacman -R {query}"),
            (Remove, Zypper) => Some("zypper remove {query}"),

            (Search, Apt) => Some("apt search {query}"),
            (Search, Dnf) => Some("dnf search -C {query}"),
            (Search, Pacman) => Some("pacman -Ss {query}"),
            (Search, Zypper) => Some("zypper --no-refresh search {query}"),

            (Autoremove, Apt) => Some("apt autoremove"),
            (Autoremove, Dnf) => Some("dnf autoremove"),
            (Autoremove, Pacman) => None,
            (Autoremove, Zypper) => Some("zypper remove --clean-deps"),

            (Upgrade, Apt) => Some("apt upgrade"),
            (Upgrade, Dnf) => Some("dnf upgrade"),
            (Upgrade, Pacman) => Some("pacman -Syu"),
            (Upgrade, Zypper) => Some("zypper dup"),

            (Update, Apt) => Some("apt update"),
            (Update, Dnf) => Some("dnf check-update"),
            (Update, Pacman) => Some("pacman -Sy"),
            (Update, Zypper) => Some("zypper refresh"),

            (Provides, Apt) => Some("apt-file search {query}"),
            (Provides, Dnf) => Some("dnf provides -C {query}"),
            (Provides, Pacman) => Some("pacman -F {query}"),
            (Provides, Zypper) => Some("zypper --no-refresh what-provides {query}"),

            (_, Unknown) => None,
        }
    }

    /// Build the argv for this action, substituting the placeholder with
    /// `query` as a single literal replacement. No escaping happens here;
    /// the argv never passes through a shell, and quoting for any other
    /// destination is the executor's concern.
    pub fn command_argv(&self, family: PmFamily, query: &str) -> Option<Vec<String>> {
        let template = self.template(family)?;
        Some(
            template
                .split_whitespace()
                .map(|token| {
                    if token == QUERY_PLACEHOLDER {
                        query.to_string()
                    } else {
                        token.to_string()
                    }
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REAL_FAMILIES: [PmFamily; 4] =
        [PmFamily::Apt, PmFamily::Dnf, PmFamily::Pacman, PmFamily::Zypper];

    #[test]
    fn test_provides_templates() {
        assert_eq!(
            PackageAction::Provides.template(PmFamily::Apt),
            Some("apt-file search {query}")
        );
        assert_eq!(
            PackageAction::Provides.template(PmFamily::Pacman),
            Some("pacman -F {query}")
        );
    }

    #[test]
    fn test_unknown_family_has_no_templates() {
        for action in PackageAction::ALL {
            assert_eq!(action.template(PmFamily::Unknown), None);
            assert_eq!(action.command_argv(PmFamily::Unknown, "nano"), None);
        }
    }

    #[test]
    fn test_pacman_autoremove_is_unsupported() {
        assert_eq!(PackageAction::Autoremove.template(PmFamily::Pacman), None);
    }

    // Coverage check over the whole product: a template exists for every
    // pair except the documented gaps, and carries the placeholder exactly
    // when the action takes an argument.
    #[test]
    fn test_table_coverage() {
        for action in PackageAction::ALL {
            for family in REAL_FAMILIES {
                let unsupported =
                    action == PackageAction::Autoremove && family == PmFamily::Pacman;
                match action.template(family) {
                    None => assert!(unsupported, "missing template for {:?}/{:?}", action, family),
                    Some(template) => {
                        assert!(!unsupported);
                        assert_eq!(
                            template.matches(QUERY_PLACEHOLDER).count(),
                            usize::from(action.takes_argument()),
                            "placeholder count for {:?}/{:?}",
                            action,
                            family
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_substitution_is_single_argv_element() {
        let argv = PackageAction::Provides
            .command_argv(PmFamily::Apt, "name with spaces")
            .unwrap();
        assert_eq!(argv, vec!["apt-file", "search", "name with spaces"]);
    }

    #[test]
    fn test_family_from_binary_collapses_legacy_apt() {
        assert_eq!(PmFamily::from_binary("apt-get"), Some(PmFamily::Apt));
        assert_eq!(PmFamily::from_binary("apt"), Some(PmFamily::Apt));
        assert_eq!(PmFamily::from_binary("brew"), None);
    }

    #[test]
    fn test_probe_order_maps_to_families() {
        for name in PmFamily::PROBE_ORDER {
            assert!(PmFamily::from_binary(name).is_some());
        }
    }
}

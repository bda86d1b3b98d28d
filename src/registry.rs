//! Package manager registry.
//!
//! Static knowledge of the package managers shellpilot can drive: how to
//! detect each one, how to build an install command from a package name, and
//! which distros ship it. Pure lookup tables; the environment probe decides
//! which manager (if any) is active on this host.

/// A package manager definition.
#[derive(Debug, Clone)]
pub struct PackageManager {
    /// Manager binary name (e.g. "apt", "dnf").
    pub name: &'static str,
    /// Command that succeeds when the manager is usable.
    pub probe_command: &'static str,
    /// Install template; `{}` is replaced with the package name.
    pub install_template: &'static str,
    /// Distro IDs (as in `/etc/os-release` ID=) that use this manager.
    pub distros: &'static [&'static str],
}

impl PackageManager {
    /// Formats the install command for `package`.
    pub fn install_command(&self, package: &str) -> String {
        self.install_template.replace("{}", package)
    }
}

const MANAGERS: &[PackageManager] = &[
    PackageManager {
        name: "apt",
        probe_command: "apt --version",
        install_template: "sudo apt install -y {}",
        distros: &["debian", "ubuntu", "linuxmint", "pop", "raspbian", "kali"],
    },
    PackageManager {
        name: "dnf",
        probe_command: "dnf --version",
        install_template: "sudo dnf install -y {}",
        distros: &["fedora", "rhel", "centos", "rocky", "almalinux"],
    },
    PackageManager {
        name: "yum",
        probe_command: "yum --version",
        install_template: "sudo yum install -y {}",
        distros: &["centos", "rhel", "amzn"],
    },
    PackageManager {
        name: "pacman",
        probe_command: "pacman --version",
        install_template: "sudo pacman -S --noconfirm {}",
        distros: &["arch", "manjaro", "endeavouros"],
    },
    PackageManager {
        name: "zypper",
        probe_command: "zypper --version",
        install_template: "sudo zypper install -y {}",
        distros: &["opensuse", "opensuse-leap", "opensuse-tumbleweed", "sles"],
    },
    PackageManager {
        name: "apk",
        probe_command: "apk --version",
        install_template: "sudo apk add {}",
        distros: &["alpine"],
    },
    PackageManager {
        name: "brew",
        probe_command: "brew --version",
        install_template: "brew install {}",
        distros: &["macos"],
    },
];

/// Registry of all known package managers.
pub struct PackageManagerRegistry;

impl PackageManagerRegistry {
    /// All known manager definitions, in probe order.
    pub fn all() -> &'static [PackageManager] {
        MANAGERS
    }

    /// Look up a manager by name.
    pub fn get(name: &str) -> Option<&'static PackageManager> {
        MANAGERS.iter().find(|m| m.name == name)
    }

    /// Managers that claim `distro` as a supported distribution.
    pub fn for_distro(distro: &str) -> Vec<&'static PackageManager> {
        MANAGERS
            .iter()
            .filter(|m| m.distros.contains(&distro))
            .collect()
    }
}

//! Host environment detection.
//!
//! Resolves the OS family, the Linux distro (from `/etc/os-release`), and the
//! single package manager that applies to this host. The result is computed
//! once and treated as read-only for the process lifetime; nothing else in
//! the request pipeline touches the filesystem for environment facts.

use crate::registry::{PackageManager, PackageManagerRegistry};
use std::fs;
use tracing::{debug, info};

/// Broad OS family, from compile-time target information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    MacOs,
    Other,
}

impl OsFamily {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            OsFamily::Linux
        } else if cfg!(target_os = "macos") {
            OsFamily::MacOs
        } else {
            OsFamily::Other
        }
    }
}

/// Checks whether a program is reachable on PATH.
///
/// Abstracted so dependency checks and manager probing can run against a
/// scripted lookup in tests instead of the real PATH.
pub trait ProgramLookup: Send + Sync {
    fn exists(&self, program: &str) -> bool;
}

/// PATH lookup backed by `which`.
pub struct SystemProgramLookup;

impl ProgramLookup for SystemProgramLookup {
    fn exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Once-computed host facts: OS family, distro, active package manager.
#[derive(Debug, Clone)]
pub struct ResolvedEnvironment {
    pub os_family: OsFamily,
    /// Distro ID as reported by `/etc/os-release` ("ubuntu", "fedora", ...);
    /// "macos" on macOS, "unknown" when undetectable.
    pub distro: String,
    /// The applicable package manager, or `None` on unrecognized hosts.
    pub package_manager: Option<&'static PackageManager>,
}

impl ResolvedEnvironment {
    /// Probes the live host.
    pub fn detect() -> Self {
        Self::detect_with(&SystemProgramLookup, read_os_release().as_deref())
    }

    /// Probe with injected PATH lookup and os-release content (for tests).
    pub fn detect_with(lookup: &dyn ProgramLookup, os_release: Option<&str>) -> Self {
        let os_family = OsFamily::current();
        let distro = match os_family {
            OsFamily::MacOs => "macos".to_string(),
            OsFamily::Linux => os_release
                .and_then(parse_distro_id)
                .unwrap_or_else(|| "unknown".to_string()),
            OsFamily::Other => "unknown".to_string(),
        };

        let package_manager = resolve_manager(&distro, lookup);
        match package_manager {
            Some(manager) => info!("Detected distro '{}', package manager '{}'", distro, manager.name),
            None => info!("Detected distro '{}', no usable package manager", distro),
        }

        Self {
            os_family,
            distro,
            package_manager,
        }
    }
}

/// Picks the manager for `distro`: a distro match whose binary is present
/// wins; otherwise any present manager binary; otherwise none.
fn resolve_manager(distro: &str, lookup: &dyn ProgramLookup) -> Option<&'static PackageManager> {
    let matched = PackageManagerRegistry::for_distro(distro);
    if let Some(manager) = matched.iter().find(|m| lookup.exists(m.name)).copied() {
        return Some(manager);
    }

    debug!("No distro match for '{}', falling back to PATH scan", distro);
    PackageManagerRegistry::all()
        .iter()
        .find(|m| lookup.exists(m.name))
}

fn read_os_release() -> Option<String> {
    fs::read_to_string("/etc/os-release").ok()
}

/// Extracts the `ID=` value from os-release content.
fn parse_distro_id(content: &str) -> Option<String> {
    for line in content.lines() {
        if let Some(value) = line.strip_prefix("ID=") {
            let id = value.trim().trim_matches('"').to_lowercase();
            if !id.is_empty() {
                return Some(id);
            }
        }
    }
    None
}

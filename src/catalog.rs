//! Static catalog mapping command-line tool names to installable packages.
//!
//! Generated commands reference tools by binary name; package managers
//! install packages, and the two names do not always match (`convert` lives
//! in `imagemagick`, `dig` in `dnsutils`). The catalog holds the tools the
//! dependency resolver recognizes at all: a token absent from this table is
//! never treated as a dependency.

use std::collections::HashMap;

/// Tool binary name → package name, for every tool the resolver recognizes.
///
/// Entries where the package name equals the tool name are still listed so
/// membership checks stay a single lookup.
const TOOL_PACKAGES: &[(&str, &str)] = &[
    ("git", "git"),
    ("curl", "curl"),
    ("wget", "wget"),
    ("ffmpeg", "ffmpeg"),
    ("jq", "jq"),
    ("htop", "htop"),
    ("tree", "tree"),
    ("zip", "zip"),
    ("unzip", "unzip"),
    ("tar", "tar"),
    ("rsync", "rsync"),
    ("nano", "nano"),
    ("vim", "vim"),
    ("tmux", "tmux"),
    ("nmap", "nmap"),
    ("docker", "docker.io"),
    ("node", "nodejs"),
    ("npm", "npm"),
    ("python3", "python3"),
    ("pip3", "python3-pip"),
    ("gcc", "gcc"),
    ("make", "make"),
    ("convert", "imagemagick"),
    ("mogrify", "imagemagick"),
    ("dig", "dnsutils"),
    ("netstat", "net-tools"),
    ("ss", "iproute2"),
    ("traceroute", "traceroute"),
    ("whois", "whois"),
    ("ncdu", "ncdu"),
];

/// Lookup table from recognizable tool names to package names.
pub struct ToolCatalog {
    packages: HashMap<&'static str, &'static str>,
}

impl ToolCatalog {
    /// Builds the catalog from the built-in table.
    pub fn new() -> Self {
        Self {
            packages: TOOL_PACKAGES.iter().copied().collect(),
        }
    }

    /// Whether `tool` is a recognized tool name.
    pub fn contains(&self, tool: &str) -> bool {
        self.packages.contains_key(tool)
    }

    /// Package that provides `tool`, falling back to the tool's own name
    /// when unmapped.
    pub fn package_for(&self, tool: &str) -> String {
        self.packages
            .get(tool)
            .map(|pkg| pkg.to_string())
            .unwrap_or_else(|| tool.to_string())
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

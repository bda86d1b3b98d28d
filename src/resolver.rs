//! Dependency resolution for generated commands.
//!
//! A generated command may chain several pipeline stages, each naming a
//! different binary. The resolver scans the command text for recognizable
//! tool tokens, checks which of them are actually on PATH, and builds the
//! install command for each one the active package manager can provide.

use crate::catalog::ToolCatalog;
use crate::environment::{ProgramLookup, SystemProgramLookup};
use crate::registry::PackageManager;
use tracing::debug;

pub struct DependencyResolver {
    catalog: ToolCatalog,
    lookup: Box<dyn ProgramLookup>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self::with_lookup(Box::new(SystemProgramLookup))
    }

    /// Resolver with an injected PATH lookup (for tests).
    pub fn with_lookup(lookup: Box<dyn ProgramLookup>) -> Self {
        Self {
            catalog: ToolCatalog::new(),
            lookup,
        }
    }

    /// Distinct catalog tools referenced by `command`, in first-appearance
    /// order.
    ///
    /// The command is split on the shell metacharacters `|`, `&&`, `;`, `||`
    /// and whitespace. `sudo` and flag-like tokens (leading `-`) are skipped,
    /// and path-qualified tokens are reduced to their final segment before
    /// the catalog lookup.
    pub fn extract_tools(&self, command: &str) -> Vec<String> {
        let mut tools = Vec::new();
        for segment in command.split(['|', ';', '&']) {
            for token in segment.split_whitespace() {
                if token == "sudo" || token.starts_with('-') {
                    continue;
                }
                let name = token.rsplit('/').next().unwrap_or(token);
                if self.catalog.contains(name) && !tools.iter().any(|t| t == name) {
                    tools.push(name.to_string());
                }
            }
        }
        debug!("Extracted tools {:?} from command", tools);
        tools
    }

    /// The subset of `tools` not found on PATH, order preserved.
    pub fn find_missing(&self, tools: &[String]) -> Vec<String> {
        tools
            .iter()
            .filter(|tool| !self.lookup.exists(tool))
            .cloned()
            .collect()
    }

    /// Install command for `tool` under `manager`, or `None` when no
    /// package manager is active.
    pub fn resolve_install_command(
        &self,
        tool: &str,
        manager: Option<&PackageManager>,
    ) -> Option<String> {
        let manager = manager?;
        let package = self.catalog.package_for(tool);
        Some(manager.install_command(&package))
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PackageManagerRegistry;
    use std::collections::HashSet;

    struct FakeLookup {
        present: HashSet<&'static str>,
    }

    impl FakeLookup {
        fn with(programs: &[&'static str]) -> Box<Self> {
            Box::new(Self {
                present: programs.iter().copied().collect(),
            })
        }
    }

    impl ProgramLookup for FakeLookup {
        fn exists(&self, program: &str) -> bool {
            self.present.contains(program)
        }
    }

    fn resolver() -> DependencyResolver {
        DependencyResolver::with_lookup(FakeLookup::with(&[]))
    }

    // =========================================================================
    // extract_tools
    // =========================================================================

    #[test]
    fn extract_finds_single_tool() {
        let tools = resolver().extract_tools("ffmpeg -i in.mp4 out.avi");
        assert_eq!(tools, vec!["ffmpeg"]);
    }

    #[test]
    fn extract_walks_every_pipeline_stage() {
        let tools = resolver().extract_tools("curl -s https://x.test/api | jq '.items' | tree");
        assert_eq!(tools, vec!["curl", "jq", "tree"]);
    }

    #[test]
    fn extract_handles_and_chains_and_semicolons() {
        let tools = resolver().extract_tools("git pull && make; rsync -a src/ dst/");
        assert_eq!(tools, vec!["git", "make", "rsync"]);
    }

    #[test]
    fn extract_skips_sudo_and_flags() {
        let tools = resolver().extract_tools("sudo ffmpeg -i in.mp4 -vcodec copy out.mp4");
        assert_eq!(tools, vec!["ffmpeg"]);
        assert!(!tools.contains(&"sudo".to_string()));
    }

    #[test]
    fn extract_reduces_path_prefixes() {
        let tools = resolver().extract_tools("/usr/bin/ffmpeg -i in.mp4 out.avi");
        assert_eq!(tools, vec!["ffmpeg"]);
    }

    #[test]
    fn extract_deduplicates_preserving_first_appearance() {
        let tools = resolver().extract_tools("jq . a.json && curl -s x.test | jq .");
        assert_eq!(tools, vec!["jq", "curl"]);
    }

    #[test]
    fn extract_ignores_unknown_tokens() {
        let tools = resolver().extract_tools("ls -la /tmp");
        assert!(tools.is_empty());
    }

    #[test]
    fn extract_returns_only_catalog_keys_never_flags_or_sudo() {
        // Property check over a grab bag of command shapes.
        let catalog = ToolCatalog::new();
        let commands = [
            "sudo apt update && sudo apt upgrade -y",
            "ffmpeg -i a.mp4 b.avi || echo failed",
            "find . -name '*.rs' | xargs wc -l; git status",
            "curl --silent -o /dev/null https://x.test | jq -r '.a'",
            "",
            "   ",
        ];
        let resolver = resolver();
        for command in commands {
            for tool in resolver.extract_tools(command) {
                assert!(catalog.contains(&tool), "{tool} not in catalog");
                assert!(!tool.starts_with('-'));
                assert_ne!(tool, "sudo");
            }
        }
    }

    // =========================================================================
    // find_missing
    // =========================================================================

    #[test]
    fn find_missing_is_an_order_preserving_subset() {
        let resolver = DependencyResolver::with_lookup(FakeLookup::with(&["curl"]));
        let tools = vec![
            "ffmpeg".to_string(),
            "curl".to_string(),
            "jq".to_string(),
        ];
        let missing = resolver.find_missing(&tools);
        assert_eq!(missing, vec!["ffmpeg", "jq"]);
    }

    #[test]
    fn find_missing_empty_when_everything_present() {
        let resolver = DependencyResolver::with_lookup(FakeLookup::with(&["ffmpeg", "jq"]));
        let tools = vec!["ffmpeg".to_string(), "jq".to_string()];
        assert!(resolver.find_missing(&tools).is_empty());
    }

    // =========================================================================
    // resolve_install_command
    // =========================================================================

    #[test]
    fn resolve_install_none_without_manager() {
        assert_eq!(resolver().resolve_install_command("ffmpeg", None), None);
    }

    #[test]
    fn resolve_install_formats_apt_command() {
        let apt = PackageManagerRegistry::get("apt").unwrap();
        let command = resolver().resolve_install_command("ffmpeg", Some(apt));
        assert_eq!(command.as_deref(), Some("sudo apt install -y ffmpeg"));
    }

    #[test]
    fn resolve_install_maps_tool_to_package_name() {
        let apt = PackageManagerRegistry::get("apt").unwrap();
        let command = resolver().resolve_install_command("convert", Some(apt));
        assert_eq!(command.as_deref(), Some("sudo apt install -y imagemagick"));
    }

    #[test]
    fn resolve_install_falls_back_to_tool_name() {
        let brew = PackageManagerRegistry::get("brew").unwrap();
        let command = resolver().resolve_install_command("sometool", Some(brew));
        assert_eq!(command.as_deref(), Some("brew install sometool"));
    }
}

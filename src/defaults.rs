//! Default values for preset-repo configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// File name looked up when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = ".preset-repo.yaml";

/// Suffix of files that may carry an embedded preset template.
pub const PRESET_SUFFIX: &str = ".ecl";

/// Lines that open an embedded preset block.
pub const START_MARKERS: &[&str] = &["-preset_template='", "-template='"];

/// The line that closes an embedded preset block.
pub const END_MARKER: &str = "'";

/// Returns the default cache root directory.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/preset-repo` (XDG Base Directory)
/// - macOS: `~/Library/Caches/preset-repo`
/// - Windows: `{FOLDERID_LocalAppData}\preset-repo`
///
/// Falls back to `.preset-repo-cache` in the current directory if the
/// platform cache directory cannot be determined.
///
/// This can be overridden by the `--cache-root` CLI flag, the
/// `PRESET_REPO_CACHE` environment variable, or `cache_root` in the
/// configuration file.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".preset-repo-cache"))
        .join("preset-repo")
}

/// The default start markers as owned strings.
pub fn start_markers() -> Vec<String> {
    START_MARKERS.iter().map(|m| m.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_root_returns_path() {
        let cache_root = default_cache_root();
        assert!(cache_root.ends_with("preset-repo"));
    }

    #[test]
    fn test_default_cache_root_is_absolute_or_fallback() {
        let cache_root = default_cache_root();
        assert!(
            cache_root.is_absolute() || cache_root.starts_with(".preset-repo-cache"),
            "Expected absolute path or fallback, got: {:?}",
            cache_root
        );
    }

    #[test]
    fn test_markers_are_distinct_from_end_marker() {
        assert!(start_markers().iter().all(|m| m != END_MARKER));
    }
}

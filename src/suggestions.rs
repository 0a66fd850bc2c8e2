//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Errors should tell users what went
//! wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use preset_repo::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Configuration file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::config_not_found(path));
//! ```

use std::path::Path;

/// Generate an error for when the configuration file is not found.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a .preset-repo.yaml file listing your preset repositories\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set PRESET_REPO_CONFIG environment variable",
        path = path.display()
    )
}

/// Generate an error for when cache clean is called without `--all`.
pub fn cache_clean_needs_all() -> anyhow::Error {
    anyhow::anyhow!(
        "cache clean removes the whole cache and requires --all\n\n\
         hint: Use --all to remove every cached checkout\n\
         hint: Use 'preset-repo cache delete <NAME>' to remove one repository"
    )
}

/// Generate an error for a selection naming a repository the config lacks.
pub fn unknown_repository(name: &str, known: &[&str]) -> anyhow::Error {
    let known = if known.is_empty() {
        "none configured".to_string()
    } else {
        known.join(", ")
    };
    anyhow::anyhow!(
        "Unknown repository: {name}\n\n\
         hint: Configured repositories: {known}\n\
         hint: Add it under 'repositories:' in .preset-repo.yaml"
    )
}

/// Generate an error for a selection overriding a flag the template lacks.
pub fn unknown_flag(flag: &str, available: &[String]) -> anyhow::Error {
    anyhow::anyhow!(
        "Unknown flag '{flag}' in edited_flags\n\n\
         hint: The template defines: {}\n\
         hint: Remove the entry or fix its spelling",
        if available.is_empty() {
            "no flags".to_string()
        } else {
            available.join(", ")
        }
    )
}

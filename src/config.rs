//! # Configuration Schema and Parsing
//!
//! This module defines the `.preset-repo.yaml` configuration file: which
//! repositories to keep checked out, where the cache lives, and how preset
//! files are recognized inside a checkout.
//!
//! ```yaml
//! cache_root: /var/cache/presets   # optional
//! scan:                            # optional
//!   suffix: .ecl
//!   start_markers: ["-preset_template='"]
//! repositories:
//!   - name: coding-standards
//!     origin: https://example.com/standards.git
//!     ref: main
//!     revision: 0123abc            # optional pin
//! ```
//!
//! Parsing is done with `serde_yaml`; the structural checks serde cannot
//! express (unique names, non-empty fields) run afterwards in `validate` and
//! report a hint alongside the message.

use crate::defaults;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A remote repository to keep checked out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositorySpec {
    /// Logical name used in selections, logs and error messages.
    pub name: String,
    /// The remote origin, anything `git` accepts as a url.
    pub origin: String,
    /// Branch, tag, or literal revision to check out.
    pub r#ref: String,
    /// Optional known revision, which skips remote resolution.
    #[serde(default)]
    pub revision: Option<String>,
}

/// How preset files are recognized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanSettings {
    /// File name suffix of candidate files.
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Lines that open an embedded block.
    #[serde(default = "defaults::start_markers")]
    pub start_markers: Vec<String>,
}

fn default_suffix() -> String {
    defaults::PRESET_SUFFIX.to_string()
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            start_markers: defaults::start_markers(),
        }
    }
}

/// The whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub cache_root: Option<PathBuf>,
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub repositories: Vec<RepositorySpec>,
}

impl Config {
    /// Look up a configured repository by name
    pub fn repository(&self, name: &str) -> Option<&RepositorySpec> {
        self.repositories.iter().find(|repo| repo.name == name)
    }

    /// The cache root: explicit override, then the config file, then the platform default.
    pub fn resolve_cache_root(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.cache_root.clone())
            .unwrap_or_else(defaults::default_cache_root)
    }

    fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for (idx, repo) in self.repositories.iter().enumerate() {
            if repo.name.trim().is_empty() {
                return Err(invalid(
                    format!("repositories[{idx}] has an empty name"),
                    "Every repository needs a name to be referenced by",
                ));
            }
            if !names.insert(repo.name.as_str()) {
                return Err(invalid(
                    format!("Duplicate repository name '{}'", repo.name),
                    "Give every repository a unique name",
                ));
            }
            if repo.origin.trim().is_empty() {
                return Err(invalid(
                    format!("Repository '{}' has an empty origin", repo.name),
                    "Set 'origin:' to the repository url",
                ));
            }
            if repo.r#ref.trim().is_empty() {
                return Err(invalid(
                    format!("Repository '{}' has an empty ref", repo.name),
                    "Set 'ref:' to a branch, tag, or commit",
                ));
            }
        }

        if self.scan.suffix.is_empty() {
            return Err(invalid(
                "scan.suffix must not be empty".to_string(),
                "Use a file suffix such as '.ecl'",
            ));
        }
        if self.scan.start_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(invalid(
                "scan.start_markers must not contain empty markers".to_string(),
                "Remove the empty entry from scan.start_markers",
            ));
        }
        Ok(())
    }
}

fn invalid(message: String, hint: &str) -> Error {
    Error::ConfigParse {
        message,
        hint: Some(hint.to_string()),
    }
}

/// Parse a configuration from a YAML string
pub fn parse(yaml_content: &str) -> Result<Config> {
    // An empty file is an empty configuration
    if yaml_content.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: None,
    })?;
    config.validate()?;
    Ok(config)
}

/// Parse a configuration from a file
pub fn from_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `preset-repo` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` plus the global
//!   options and performs the command's logic by calling into the
//!   `preset_repo` library.

pub mod cache;
pub mod completions;
pub mod fetch;
pub mod flags;
pub mod scan;

use anyhow::{Context, Result};
use log::debug;
use preset_repo::config::{self, Config, RepositorySpec};
use preset_repo::repository::CheckoutManager;
use preset_repo::suggestions;

use crate::cli::GlobalArgs;

/// The loaded configuration plus a checkout manager rooted at its cache
pub struct Workspace {
    pub config: Config,
    pub manager: CheckoutManager,
}

impl Workspace {
    /// Load the config file, which must exist.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        if !global.config.exists() {
            return Err(suggestions::config_not_found(&global.config));
        }
        let config = config::from_file(&global.config)
            .with_context(|| format!("Failed to load {}", global.config.display()))?;
        Ok(Self::from_config(config, global))
    }

    /// Load the config file when present, otherwise run with defaults.
    pub fn load_or_default(global: &GlobalArgs) -> Result<Self> {
        if global.config.exists() {
            return Self::load(global);
        }
        debug!(
            "no config at {}, using defaults",
            global.config.display()
        );
        Ok(Self::from_config(Config::default(), global))
    }

    fn from_config(config: Config, global: &GlobalArgs) -> Self {
        let root = config.resolve_cache_root(global.cache_root.clone());
        debug!("cache root: {}", root.display());
        Self {
            manager: CheckoutManager::new(root),
            config,
        }
    }

    /// The configured repositories named in `names`, or all of them when empty.
    pub fn select(&self, names: &[String]) -> Result<Vec<RepositorySpec>> {
        if names.is_empty() {
            return Ok(self.config.repositories.clone());
        }
        names
            .iter()
            .map(|name| {
                self.config
                    .repository(name)
                    .cloned()
                    .ok_or_else(|| suggestions::unknown_repository(name, &self.repository_names()))
            })
            .collect()
    }

    pub fn repository_names(&self) -> Vec<&str> {
        self.config
            .repositories
            .iter()
            .map(|repo| repo.name.as_str())
            .collect()
    }
}

//! # Preset Repository Library
//!
//! This library keeps local checkouts of remote preset repositories and turns
//! the preset templates embedded in their files into flag statements. It is
//! used by the `preset-repo` command-line tool but can also be embedded in
//! other tooling that needs the same checkouts or the same statements.
//!
//! ## Quick Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use preset_repo::flags::format_flag_settings;
//! use preset_repo::scanner::extract_embedded_block;
//! use preset_repo::template::parse_template;
//!
//! let file = "\
//! -preset_template='
//! title: Example
//! kind: tailoring
//! description: Two switches
//! options:
//!   - { id: strict, kind: flag, default: true }
//!   - { id: Extra Checks, kind: flag }
//! '
//! ";
//!
//! let block = extract_embedded_block(file, &["-preset_template='"]).unwrap();
//! let template = parse_template(&serde_yaml::from_str(&block).unwrap()).unwrap();
//!
//! let overrides = BTreeMap::from([("Extra Checks".to_string(), true)]);
//! let statements: Vec<String> = format_flag_settings(&template, &overrides)
//!     .unwrap()
//!     .into_iter()
//!     .map(|flag| flag.statement)
//!     .collect();
//! assert_eq!(statements, ["setq(strict,1)", "setq(extra_checks,1)"]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Checkouts (`path`, `resolver`, `repository`, `git`)**: A working tree per
//!   (origin, revision), keyed by a hash of the origin. Refs are resolved with
//!   one remote query; trees are reused, fetched, or cloned as needed.
//! - **Scanning (`scanner`)**: Finds preset files in a checkout and extracts
//!   the YAML block embedded in each of them.
//! - **Templates (`template`)**: Validates an extracted document into a
//!   `Template` with a tree of options.
//! - **Flags (`flags`)**: Flattens the option tree, applies user overrides and
//!   renders `setq(...)` statements in a deterministic order.
//! - **Configuration (`config`, `defaults`)**: The `.preset-repo.yaml` file
//!   naming the repositories to manage.

pub mod config;
pub mod defaults;
pub mod error;
pub mod flags;
pub mod git;
pub mod path;
pub mod repository;
pub mod resolver;
pub mod scanner;
pub mod suggestions;
pub mod template;

#[cfg(test)]
mod path_proptest;

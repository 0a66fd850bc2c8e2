//! Flags command implementation
//!
//! Reads a preset selection file, loads the template it points to and prints
//! one `setq(...)` statement per flag, in template order.
//!
//! ```yaml
//! source:
//!   repository: coding-standards   # omit to read `path` from disk
//!   path: misra/c2012.ecl
//! edited_flags:
//!   advisory_rules: true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use preset_repo::error::Error;
use preset_repo::flags::{resolve_flags, PresetSelection, PresetSource};
use preset_repo::suggestions;
use preset_repo::template::Template;

use super::Workspace;
use crate::cli::GlobalArgs;

/// Arguments for the flags command
#[derive(Args, Debug)]
pub struct FlagsArgs {
    /// Preset selection file (YAML)
    #[arg(value_name = "SELECTION")]
    pub selection: PathBuf,

    /// Output the resolved flags in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Local template paths are relative to the selection file.
fn anchor_local_path(selection: &mut PresetSelection, selection_file: &Path) {
    if let PresetSource::Local { path } = &mut selection.source {
        if path.is_relative() {
            if let Some(dir) = selection_file.parent() {
                *path = dir.join(&*path);
            }
        }
    }
}

fn read_selection(path: &Path) -> Result<PresetSelection> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read selection file {}", path.display()))?;
    let mut selection: PresetSelection = serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid selection file {}", path.display()))?;
    anchor_local_path(&mut selection, path);
    Ok(selection)
}

fn available_flags(template: &Template) -> Vec<String> {
    resolve_flags(template, &Default::default())
        .map(|flags| flags.order)
        .unwrap_or_default()
}

/// Execute the flags command
pub fn execute(args: FlagsArgs, global: &GlobalArgs) -> Result<()> {
    let selection = read_selection(&args.selection)?;

    let workspace = match &selection.source {
        PresetSource::Repository { .. } => Workspace::load(global)?,
        PresetSource::Local { .. } => Workspace::load_or_default(global)?,
    };

    let template = selection
        .load_template(&workspace.config, &workspace.manager, &workspace.config.scan)
        .map_err(|e| match e {
            Error::UnknownRepository { name } => {
                suggestions::unknown_repository(&name, &workspace.repository_names())
            }
            other => other.into(),
        })?;

    let flags = selection.format(&template).map_err(|e| match e {
        Error::UnknownFlag { flag } => suggestions::unknown_flag(&flag, &available_flags(&template)),
        other => other.into(),
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&flags)?);
    } else {
        for flag in &flags {
            println!("{}", flag.statement);
        }
    }
    Ok(())
}

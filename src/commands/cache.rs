//! # Cache Command Implementation
//!
//! This module implements the `cache` subcommand, which manages the local
//! checkout cache.
//!
//! ## Subcommands
//!
//! - **`list`**: Display every cached checkout with its origin and head
//! - **`clean`**: Remove cached checkouts (`--all`)
//! - **`delete`**: Remove the checkouts of one configured repository

use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use preset_repo::repository::CheckoutInfo;
use preset_repo::suggestions;

use super::Workspace;
use crate::cli::GlobalArgs;

/// Manage the checkout cache
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// List all cached checkouts
    List(ListArgs),
    /// Clean cached checkouts
    Clean(CleanArgs),
    /// Delete the checkouts of a configured repository
    Delete(DeleteArgs),
}

/// Arguments for the cache list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the cache clean command
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Show what would be deleted without actually deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Delete all cached checkouts
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the cache delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Repository name from the config file
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Delete every cached revision of the repository, not only the pinned one
    ///
    /// Always the case for repositories without a pinned revision, whose
    /// checkouts are keyed by whatever revision their ref resolved to.
    #[arg(long)]
    pub all_revisions: bool,
}

/// Execute the `cache` command.
pub fn execute(args: CacheArgs, global: &GlobalArgs) -> Result<()> {
    match args.command {
        CacheSubcommand::List(list_args) => execute_list(list_args, global),
        CacheSubcommand::Clean(clean_args) => execute_clean(clean_args, global),
        CacheSubcommand::Delete(delete_args) => execute_delete(delete_args, global),
    }
}

/// Execute the `cache list` command.
fn execute_list(args: ListArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = Workspace::load_or_default(global)?;
    let checkouts = workspace
        .manager
        .list_checkouts()
        .context("Failed to read cache directory")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&checkouts)?);
        return Ok(());
    }

    if checkouts.is_empty() {
        println!(
            "No cached checkouts found in: {}",
            workspace.manager.root().display()
        );
        return Ok(());
    }

    let names: HashMap<&str, &str> = workspace
        .config
        .repositories
        .iter()
        .map(|repo| (repo.origin.as_str(), repo.name.as_str()))
        .collect();

    println!("Cached checkouts in {}:\n", workspace.manager.root().display());
    for checkout in &checkouts {
        print_entry(checkout, &names);
    }
    println!("\nTotal: {} checkouts", checkouts.len());
    Ok(())
}

fn print_entry(checkout: &CheckoutInfo, names: &HashMap<&str, &str>) {
    let origin = checkout.origin.as_deref().unwrap_or("(unknown origin)");
    let name = checkout
        .origin
        .as_deref()
        .and_then(|origin| names.get(origin))
        .copied()
        .unwrap_or("-");
    let head = checkout
        .head
        .as_deref()
        .map(|head| &head[..head.len().min(12)])
        .unwrap_or("(no head)");
    println!(
        "  {} {:<24} {:<12} {:<16} {}",
        checkout.origin_hash, checkout.key, head, name, origin
    );
}

/// Execute the `cache clean` command.
fn execute_clean(args: CleanArgs, global: &GlobalArgs) -> Result<()> {
    if !args.all {
        return Err(suggestions::cache_clean_needs_all());
    }

    let workspace = Workspace::load_or_default(global)?;
    let root = workspace.manager.root();
    if !root.exists() {
        println!("Cache directory does not exist: {}", root.display());
        println!("No cached checkouts to clean.");
        return Ok(());
    }

    if args.dry_run {
        let checkouts = workspace.manager.list_checkouts()?;
        println!("Would delete {} checkouts:", checkouts.len());
        for checkout in &checkouts {
            println!("  {}", checkout.path.display());
        }
        println!("\nDry run mode - no changes were made.");
        return Ok(());
    }

    workspace.manager.clear()?;
    println!("Removed {}", root.display());
    Ok(())
}

/// Execute the `cache delete` command.
fn execute_delete(args: DeleteArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = Workspace::load(global)?;
    let spec = workspace
        .config
        .repository(&args.name)
        .ok_or_else(|| suggestions::unknown_repository(&args.name, &workspace.repository_names()))?;

    let Some(revision) = spec.revision.as_deref().filter(|_| !args.all_revisions) else {
        let checkouts = workspace.manager.checkouts_of(&spec.origin)?;
        for checkout in &checkouts {
            workspace
                .manager
                .delete_checkout(&spec.origin, &spec.r#ref, Some(checkout.key.as_str()))?;
            println!("Deleted {}", checkout.path.display());
        }
        println!("Deleted {} checkouts of '{}'", checkouts.len(), spec.name);
        return Ok(());
    };

    workspace
        .manager
        .delete_checkout(&spec.origin, &spec.r#ref, Some(revision))?;
    println!("Deleted the cached checkout of '{}' at {}", spec.name, revision);
    Ok(())
}

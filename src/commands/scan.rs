//! Scan command implementation
//!
//! Checks out the selected repositories, then scans every checkout for
//! preset templates. Per-file problems are reported alongside the templates
//! that were found; only a failed checkout makes the command exit non-zero.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use preset_repo::flags::resolve_flags;
use preset_repo::scanner::{scan_repositories, FileOutcome, RepositoryScan};
use preset_repo::template::{Template, TemplateKind};

use super::Workspace;
use crate::cli::GlobalArgs;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Only scan these repositories (defaults to all configured)
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct TemplateSummary {
    path: PathBuf,
    title: String,
    kind: TemplateKind,
    flags: usize,
}

#[derive(Serialize)]
struct RepositorySummary {
    name: String,
    root: PathBuf,
    templates: Vec<TemplateSummary>,
    skipped: usize,
    errors: Vec<String>,
}

#[derive(Serialize)]
struct CheckoutFailure {
    name: String,
    error: String,
}

#[derive(Serialize)]
struct ScanReport {
    repositories: Vec<RepositorySummary>,
    failed_checkouts: Vec<CheckoutFailure>,
}

fn relative(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

fn flag_count(template: &Template) -> usize {
    resolve_flags(template, &Default::default())
        .map(|flags| flags.order.len())
        .unwrap_or(0)
}

fn summarize(scan: &RepositoryScan) -> RepositorySummary {
    let templates = scan
        .files
        .iter()
        .filter_map(|report| match &report.outcome {
            FileOutcome::Template(template) => Some(TemplateSummary {
                path: relative(&report.path, &scan.root),
                title: template.title.clone(),
                kind: template.kind,
                flags: flag_count(template),
            }),
            _ => None,
        })
        .collect();

    RepositorySummary {
        name: scan.name.clone(),
        root: scan.root.clone(),
        templates,
        skipped: scan.skipped(),
        errors: scan.errors().map(|e| e.to_string()).collect(),
    }
}

/// Execute the scan command
pub fn execute(args: ScanArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = Workspace::load(global)?;
    let specs = workspace.select(&args.names)?;

    let mut checkouts = Vec::new();
    let mut failed_checkouts = Vec::new();
    for checkout in workspace.manager.ensure_all(&specs) {
        match checkout.result {
            Ok(path) => checkouts.push((checkout.name, path)),
            Err(e) => failed_checkouts.push(CheckoutFailure {
                name: checkout.name,
                error: e.to_string(),
            }),
        }
    }

    let report = ScanReport {
        repositories: scan_repositories(&checkouts, &workspace.config.scan)
            .iter()
            .map(summarize)
            .collect(),
        failed_checkouts,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.failed_checkouts.is_empty() {
        anyhow::bail!(
            "{} repositories could not be checked out",
            report.failed_checkouts.len()
        );
    }
    Ok(())
}

fn print_report(report: &ScanReport) {
    for repo in &report.repositories {
        println!(
            "{} ({}): {} templates, {} skipped, {} errors",
            repo.name,
            repo.root.display(),
            repo.templates.len(),
            repo.skipped,
            repo.errors.len()
        );
        for template in &repo.templates {
            println!(
                "  {:<9} {}  [{}, {} flags]",
                template.kind.to_string(),
                template.title,
                template.path.display(),
                template.flags
            );
        }
        for error in &repo.errors {
            println!("  error: {}", error);
        }
    }
    for failure in &report.failed_checkouts {
        eprintln!("error: {}", failure.error);
    }
}

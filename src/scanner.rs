//! # Preset Document Scanning
//!
//! Preset templates live inside ordinary text files in a checkout, between a
//! start-marker line and a line holding a single `'`:
//!
//! ```text
//! -preset_template='
//! title: MISRA C:2012
//! kind: ruleset
//! description: Mandatory and required rules
//! '
//! ```
//!
//! Scanning a checkout walks its tree for files with the preset suffix and
//! processes every file as an independent task. Each file ends up in one of
//! three states: it holds a valid template, it holds no template at all, or
//! it failed (unreadable, malformed block, or invalid template). A failure is
//! recorded in that file's report and never stops the rest of the scan.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::ScanSettings;
use crate::defaults::END_MARKER;
use crate::error::{Error, Result};
use crate::template::{parse_template, Template};

/// What scanning one file produced
#[derive(Debug)]
pub enum FileOutcome {
    Template(Template),
    /// The file carries no embedded block
    Skipped,
    Failed(Error),
}

/// The outcome for one candidate file
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Everything found in one repository's checkout
#[derive(Debug)]
pub struct RepositoryScan {
    pub name: String,
    pub root: PathBuf,
    pub files: Vec<FileReport>,
}

impl RepositoryScan {
    pub fn templates(&self) -> impl Iterator<Item = (&Path, &Template)> {
        self.files.iter().filter_map(|report| match &report.outcome {
            FileOutcome::Template(template) => Some((report.path.as_path(), template)),
            _ => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = &Error> {
        self.files.iter().filter_map(|report| match &report.outcome {
            FileOutcome::Failed(error) => Some(error),
            _ => None,
        })
    }

    pub fn skipped(&self) -> usize {
        self.files
            .iter()
            .filter(|report| matches!(report.outcome, FileOutcome::Skipped))
            .count()
    }
}

/// Recursively collect regular files under `root` whose name ends with `suffix`.
///
/// Unreadable directories are skipped, as is the `.git` directory.
pub fn find_candidate_files(root: &Path, suffix: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != ".git")
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(suffix))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Extract the embedded block from `text`.
///
/// Returns the lines strictly between the first start marker and the next
/// end-marker line. No start marker, or a start marker that is never closed,
/// both mean there is no block.
pub fn extract_embedded_block<S: AsRef<str>>(text: &str, start_markers: &[S]) -> Option<String> {
    let mut lines = text.lines();
    lines.find(|line| {
        let line = line.trim_end();
        start_markers.iter().any(|marker| marker.as_ref() == line)
    })?;

    let mut block = Vec::new();
    for line in lines {
        // Exactly the marker; only a CRLF leftover is tolerated
        if line.strip_suffix('\r').unwrap_or(line) == END_MARKER {
            return Some(block.join("\n"));
        }
        block.push(line);
    }
    None
}

/// Read one file and validate its embedded template, if it has one.
pub fn scan_file(path: &Path, settings: &ScanSettings) -> Result<Option<Template>> {
    let text = fs::read_to_string(path).map_err(|e| Error::from(e).in_file(path))?;

    let Some(block) = extract_embedded_block(&text, &settings.start_markers) else {
        return Ok(None);
    };

    let doc: serde_yaml::Value =
        serde_yaml::from_str(&block).map_err(|e| Error::BlockParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    parse_template(&doc).map(Some).map_err(|e| e.in_file(path))
}

/// Scan every candidate file of one checkout in parallel.
pub fn scan_checkout(root: &Path, settings: &ScanSettings) -> Vec<FileReport> {
    let mut reports: Vec<FileReport> = find_candidate_files(root, &settings.suffix)
        .into_par_iter()
        .map(|path| {
            let outcome = match scan_file(&path, settings) {
                Ok(Some(template)) => FileOutcome::Template(template),
                Ok(None) => {
                    debug!("{} holds no preset template", path.display());
                    FileOutcome::Skipped
                }
                Err(e) => {
                    warn!("{}", e);
                    FileOutcome::Failed(e)
                }
            };
            FileReport { path, outcome }
        })
        .collect();
    reports.sort_by(|a, b| a.path.cmp(&b.path));
    reports
}

/// Scan several checkouts in parallel, one task per repository.
pub fn scan_repositories(
    checkouts: &[(String, PathBuf)],
    settings: &ScanSettings,
) -> Vec<RepositoryScan> {
    checkouts
        .par_iter()
        .map(|(name, root)| RepositoryScan {
            name: name.clone(),
            root: root.clone(),
            files: scan_checkout(root, settings),
        })
        .collect()
}

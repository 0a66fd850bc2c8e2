//! # Checkout Cache Management
//!
//! This module provides the `CheckoutManager`, which guarantees that a usable
//! working tree exists on disk for a given (origin, ref) pair and hands back
//! its path. Trees are keyed by a hash of the origin and by the resolved
//! revision, so a revision is only ever fetched once per cache root.
//!
//! ## Design
//!
//! The manager talks to version control only through the `GitOperations`
//! trait. `DefaultGitOperations` forwards to the system `git` command; tests
//! substitute an in-process fake to count network operations and simulate
//! failing remotes.
//!
//! ## Consistency model
//!
//! Several callers, possibly in separate processes, may race to populate the
//! same canonical directory. Nothing is locked. Instead every step converges:
//! re-running a fetch or checkout against an already correct tree is a no-op,
//! and usability is re-checked right before anything is deleted or promoted.
//! A checkout whose revision is unknown up front is built in a private
//! temporary directory and renamed into place atomically; if another caller
//! won the race its tree is used and ours is discarded.
//!
//! The filesystem is the only record of what is cached. There is no
//! in-memory registry, so the cache survives process restarts unchanged.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::RepositorySpec;
use crate::error::{Error, Result};
use crate::git::RemoteRef;
use crate::path::{canonical_checkout_dir, origin_dir, temp_checkout_dir, TEMP_DIR_NAME};
use crate::resolver::resolve_ref;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Lists remote refs matching any of `patterns` (network).
    fn list_remote_refs(&self, origin: &str, patterns: &[String]) -> Result<Vec<RemoteRef>>;

    /// Initializes an empty repository in an existing directory.
    fn init(&self, dir: &Path) -> Result<()>;

    /// Registers `origin` as the repository's remote.
    fn add_remote(&self, dir: &Path, origin: &str) -> Result<()>;

    /// Fetches `refspec` from the registered remote (network).
    fn fetch(&self, dir: &Path, refspec: &str, shallow: bool) -> Result<()>;

    /// Checks out a revision, or `FETCH_HEAD`.
    fn checkout(&self, dir: &Path, target: &str) -> Result<()>;

    /// Clones `origin` into `dir`, which must not exist yet (network).
    fn clone_repo(&self, origin: &str, dir: &Path, branch: Option<&str>, shallow: bool)
        -> Result<()>;

    /// Reads the commit currently checked out.
    fn read_head(&self, dir: &Path) -> Option<String>;

    /// Reads the url of the registered remote.
    fn read_remote_url(&self, dir: &Path) -> Option<String>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn list_remote_refs(&self, origin: &str, patterns: &[String]) -> Result<Vec<RemoteRef>> {
        crate::git::ls_remote(origin, patterns)
    }

    fn init(&self, dir: &Path) -> Result<()> {
        crate::git::init(dir)
    }

    fn add_remote(&self, dir: &Path, origin: &str) -> Result<()> {
        crate::git::add_remote(dir, origin)
    }

    fn fetch(&self, dir: &Path, refspec: &str, shallow: bool) -> Result<()> {
        crate::git::fetch(dir, refspec, shallow)
    }

    fn checkout(&self, dir: &Path, target: &str) -> Result<()> {
        crate::git::checkout(dir, target)
    }

    fn clone_repo(
        &self,
        origin: &str,
        dir: &Path,
        branch: Option<&str>,
        shallow: bool,
    ) -> Result<()> {
        crate::git::clone(origin, dir, branch, shallow)
    }

    fn read_head(&self, dir: &Path) -> Option<String> {
        crate::git::read_head(dir)
    }

    fn read_remote_url(&self, dir: &Path) -> Option<String> {
        crate::git::read_remote_url(dir)
    }
}

/// A checkout found in the cache, with its state read live from the tree
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutInfo {
    pub path: PathBuf,
    pub origin_hash: String,
    pub key: String,
    pub origin: Option<String>,
    pub head: Option<String>,
}

/// Outcome of ensuring one configured repository
#[derive(Debug)]
pub struct CheckoutResult {
    pub name: String,
    pub result: Result<PathBuf>,
}

/// The main entry point for managing checkouts.
pub struct CheckoutManager {
    root: PathBuf,
    git: Box<dyn GitOperations>,
}

impl CheckoutManager {
    /// Creates a manager that uses the system `git` and caches under `root`.
    pub fn new(root: PathBuf) -> Self {
        Self::with_operations(root, Box::new(DefaultGitOperations))
    }

    /// Creates a manager with a custom `GitOperations` implementation.
    pub fn with_operations(root: PathBuf, git: Box<dyn GitOperations>) -> Self {
        Self { root, git }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Makes sure a usable checkout of `origin` at `r#ref` exists and returns its path.
    ///
    /// `revision` pins the checkout; without it the ref is resolved remotely,
    /// and if that fails the revision is discovered by fetching into a
    /// temporary directory. `name` only labels errors.
    pub fn ensure_checkout(
        &self,
        name: &str,
        origin: &str,
        r#ref: &str,
        revision: Option<&str>,
    ) -> Result<PathBuf> {
        let revision = match revision {
            Some(revision) => Some(revision.to_string()),
            None => resolve_ref(self.git.as_ref(), origin, r#ref),
        };

        match revision {
            Some(revision) => {
                let canonical = canonical_checkout_dir(&self.root, origin, &revision);
                self.checkout_into(name, &canonical, origin, r#ref, Some(&revision))?;
                Ok(canonical)
            }
            None => self.checkout_unresolved(name, origin, r#ref),
        }
    }

    /// Checks out a ref whose revision is unknown, then promotes the result.
    fn checkout_unresolved(&self, name: &str, origin: &str, r#ref: &str) -> Result<PathBuf> {
        let temp = temp_checkout_dir(&self.root, origin, r#ref);
        if let Err(e) = self.checkout_into(name, &temp, origin, r#ref, None) {
            remove_dir_quietly(&temp);
            return Err(e);
        }

        let Some(head) = self.git.read_head(&temp) else {
            warn!(
                "could not read the head of {}; using uncached checkout {}",
                name,
                temp.display()
            );
            return Ok(temp);
        };

        let canonical = canonical_checkout_dir(&self.root, origin, &head);
        if canonical == temp {
            return Ok(temp);
        }

        if self.is_usable(&canonical, origin, Some(&head)) {
            debug!("{} was already cached at {}", name, canonical.display());
            remove_dir_quietly(&temp);
            return Ok(canonical);
        }

        match fs::rename(&temp, &canonical) {
            Ok(()) => {
                info!("cached {} at {}", name, canonical.display());
                Ok(canonical)
            }
            // Another caller may have promoted its own copy in the meantime
            Err(e) if self.is_usable(&canonical, origin, Some(&head)) => {
                debug!("lost promotion race for {} ({}), reusing winner", name, e);
                remove_dir_quietly(&temp);
                Ok(canonical)
            }
            Err(e) => {
                warn!(
                    "could not move {} into {} ({}); using uncached checkout",
                    temp.display(),
                    canonical.display(),
                    e
                );
                Ok(temp)
            }
        }
    }

    /// Whether `dir` holds a checkout of `origin`, at `revision` if given.
    pub fn is_usable(&self, dir: &Path, origin: &str, revision: Option<&str>) -> bool {
        if !dir.is_dir() || !dir.join(".git").exists() {
            return false;
        }
        if self.git.read_remote_url(dir).as_deref() != Some(origin) {
            return false;
        }
        match revision {
            Some(revision) => self
                .git
                .read_head(dir)
                .is_some_and(|head| head.starts_with(revision)),
            None => true,
        }
    }

    /// Brings `dir` to a checkout of `origin` at `r#ref` / `revision`.
    ///
    /// Returns immediately, without touching the network, when `dir` is
    /// already usable. Otherwise the directory is rebuilt with a targeted
    /// fetch, falling back to a fresh clone when the remote refuses it.
    pub fn checkout_into(
        &self,
        name: &str,
        dir: &Path,
        origin: &str,
        r#ref: &str,
        revision: Option<&str>,
    ) -> Result<()> {
        if self.is_usable(dir, origin, revision) {
            debug!("cache hit for {} at {}", name, dir.display());
            return Ok(());
        }

        info!("fetching {} ({}@{})", name, origin, r#ref);
        let fetched = reset_dir(dir).and_then(|()| self.fetch_into(dir, origin, r#ref, revision));
        let fetch_error = match fetched {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        // Another caller may have completed this checkout while our fetch failed.
        // Our own failed fetch leaves a repository with no head behind.
        if self.git.read_head(dir).is_some() && self.is_usable(dir, origin, revision) {
            debug!(
                "fetch of {} failed ({}) but {} is now usable",
                name,
                fetch_error,
                dir.display()
            );
            return Ok(());
        }

        debug!(
            "fetch of {} failed ({}), falling back to clone",
            name, fetch_error
        );
        self.clone_into(dir, origin, r#ref, revision)
            .map_err(|clone_error| Error::Checkout {
                name: name.to_string(),
                origin: origin.to_string(),
                r#ref: r#ref.to_string(),
                message: format!("fetch failed: {fetch_error}; clone failed: {clone_error}"),
            })
    }

    fn fetch_into(&self, dir: &Path, origin: &str, r#ref: &str, revision: Option<&str>) -> Result<()> {
        self.git.init(dir)?;
        self.git.add_remote(dir, origin)?;
        match revision {
            Some(revision) => {
                // A literal revision has no branch to shallow-fetch
                self.git.fetch(dir, r#ref, revision != r#ref)?;
                self.git.checkout(dir, revision)
            }
            None => {
                self.git.fetch(dir, r#ref, true)?;
                self.git.checkout(dir, "FETCH_HEAD")
            }
        }
    }

    fn clone_into(&self, dir: &Path, origin: &str, r#ref: &str, revision: Option<&str>) -> Result<()> {
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        if let Some(parent) = dir.parent() {
            fs::create_dir_all(parent)?;
        }
        match revision {
            Some(revision) => {
                self.git.clone_repo(origin, dir, None, false)?;
                self.git.checkout(dir, revision)
            }
            None => self.git.clone_repo(origin, dir, Some(r#ref), true),
        }
    }

    /// Removes the canonical checkout for `revision`, or for `r#ref` when no
    /// revision is given. Absent checkouts are not an error.
    pub fn delete_checkout(&self, origin: &str, r#ref: &str, revision: Option<&str>) -> Result<()> {
        let dir = canonical_checkout_dir(&self.root, origin, revision.unwrap_or(r#ref));
        if dir.exists() {
            info!("deleting checkout {}", dir.display());
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Ensures every repository concurrently; one failure never stops the others.
    pub fn ensure_all(&self, specs: &[RepositorySpec]) -> Vec<CheckoutResult> {
        specs
            .par_iter()
            .map(|spec| CheckoutResult {
                name: spec.name.clone(),
                result: self.ensure_checkout(
                    &spec.name,
                    &spec.origin,
                    &spec.r#ref,
                    spec.revision.as_deref(),
                ),
            })
            .collect()
    }

    /// Lists every canonical checkout under the cache root.
    pub fn list_checkouts(&self) -> Result<Vec<CheckoutInfo>> {
        let mut checkouts = Vec::new();
        if !self.root.is_dir() {
            return Ok(checkouts);
        }

        for origin_entry in fs::read_dir(&self.root)? {
            let origin_entry = origin_entry?;
            if !origin_entry.file_type()?.is_dir() {
                continue;
            }
            let origin_hash = origin_entry.file_name().to_string_lossy().into_owned();

            for entry in fs::read_dir(origin_entry.path())? {
                let entry = entry?;
                let key = entry.file_name().to_string_lossy().into_owned();
                if key == TEMP_DIR_NAME || !entry.file_type()?.is_dir() {
                    continue;
                }
                let path = entry.path();
                checkouts.push(CheckoutInfo {
                    origin: self.git.read_remote_url(&path),
                    head: self.git.read_head(&path),
                    origin_hash: origin_hash.clone(),
                    key,
                    path,
                });
            }
        }

        checkouts.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(checkouts)
    }

    /// Checkouts of one origin, e.g. everything cached for a configured repository.
    pub fn checkouts_of(&self, origin: &str) -> Result<Vec<CheckoutInfo>> {
        let dir = origin_dir(&self.root, origin);
        Ok(self
            .list_checkouts()?
            .into_iter()
            .filter(|checkout| checkout.path.starts_with(&dir))
            .collect())
    }

    /// Removes the whole cache root.
    pub fn clear(&self) -> Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root).map_err(|e| Error::Cache {
                message: format!("failed to remove {}: {}", self.root.display(), e),
            })?;
        }
        Ok(())
    }
}

/// Delete whatever is at `dir` and leave an empty directory behind.
fn reset_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

fn remove_dir_quietly(dir: &Path) {
    if dir.exists() {
        if let Err(e) = fs::remove_dir_all(dir) {
            warn!("failed to remove {}: {}", dir.display(), e);
        }
    }
}

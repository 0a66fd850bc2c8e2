//! Thin wrappers around the system `git` command.
//!
//! Every function here runs exactly one `git` subprocess. Using the system
//! binary means authentication is whatever the user already has configured:
//! SSH keys from ~/.ssh/, credential helpers, personal access tokens.

use std::path::Path;
use std::process::Command;

use log::trace;

use crate::error::{Error, Result};

/// One line of `git ls-remote` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    /// The object id the ref points at
    pub revision: String,
    /// The full ref name, e.g. `refs/tags/v1.0^{}`
    pub name: String,
}

/// Run git with `args`, optionally inside `dir`, returning trimmed stdout.
fn run(dir: Option<&Path>, args: &[&str]) -> Result<String> {
    let mut command = Command::new("git");
    if let Some(dir) = dir {
        command.arg("-C").arg(dir);
    }
    // Never block on an interactive credential prompt
    command.env("GIT_TERMINAL_PROMPT", "0").args(args);
    trace!("running git {}", args.join(" "));

    let output = command.output().map_err(|e| Error::GitCommand {
        command: args.join(" "),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: args.join(" "),
            stderr: describe_failure(stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Add a hint for the failures users can actually fix themselves.
fn describe_failure(stderr: &str) -> String {
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
        || stderr.contains("terminal prompts disabled")
    {
        format!(
            "{}\n  hint: make sure you have access to the repository \
             (SSH key in ssh-agent, git credentials, or a personal access token)",
            stderr
        )
    } else {
        stderr.to_string()
    }
}

/// List remote refs matching any of `patterns`, in the order git prints them.
pub fn ls_remote(origin: &str, patterns: &[String]) -> Result<Vec<RemoteRef>> {
    let mut args = vec!["ls-remote", origin];
    args.extend(patterns.iter().map(String::as_str));
    let stdout = run(None, &args)?;
    Ok(parse_ls_remote(&stdout))
}

/// Parse `<hash>\t<ref>` lines, ignoring anything malformed.
pub fn parse_ls_remote(stdout: &str) -> Vec<RemoteRef> {
    stdout
        .lines()
        .filter_map(|line| {
            let (revision, name) = line.split_once('\t')?;
            let revision = revision.trim();
            let name = name.trim();
            if revision.is_empty() || name.is_empty() {
                return None;
            }
            Some(RemoteRef {
                revision: revision.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

/// Initialize an empty repository in `dir`
pub fn init(dir: &Path) -> Result<()> {
    run(Some(dir), &["init", "--quiet"]).map(|_| ())
}

/// Register `origin` as the remote named `origin`
pub fn add_remote(dir: &Path, origin: &str) -> Result<()> {
    run(Some(dir), &["remote", "add", "origin", origin]).map(|_| ())
}

/// Fetch `refspec` from `origin`, with `--depth=1` when `shallow`
pub fn fetch(dir: &Path, refspec: &str, shallow: bool) -> Result<()> {
    let mut args = vec!["fetch", "--quiet"];
    if shallow {
        args.push("--depth=1");
    }
    args.extend(["origin", refspec]);
    run(Some(dir), &args).map(|_| ())
}

/// Check out `target` (a revision or `FETCH_HEAD`) as a detached head
pub fn checkout(dir: &Path, target: &str) -> Result<()> {
    run(
        Some(dir),
        &[
            "-c",
            "advice.detachedHead=false",
            "checkout",
            "--quiet",
            "--detach",
            target,
        ],
    )
    .map(|_| ())
}

/// Clone `origin` into `dir`, optionally shallow and restricted to `branch`
pub fn clone(origin: &str, dir: &Path, branch: Option<&str>, shallow: bool) -> Result<()> {
    let target = dir.to_string_lossy();
    let mut args = vec!["clone", "--quiet"];
    if shallow {
        args.push("--depth=1");
    }
    if let Some(branch) = branch {
        args.extend(["--branch", branch]);
    }
    args.extend([origin, target.as_ref()]);
    run(None, &args).map(|_| ())
}

/// The commit currently checked out in `dir`, if it can be read
pub fn read_head(dir: &Path) -> Option<String> {
    run(Some(dir), &["rev-parse", "HEAD"])
        .ok()
        .filter(|head| !head.is_empty())
}

/// The url recorded for the `origin` remote of `dir`, if any
pub fn read_remote_url(dir: &Path) -> Option<String> {
    run(Some(dir), &["remote", "get-url", "origin"])
        .ok()
        .filter(|url| !url.is_empty())
}

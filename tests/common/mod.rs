//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_config(configs::EMPTY);
//!     fixture.command().args(["cache", "list"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    #[allow(unused_imports)]
    pub use super::templates;
    pub use super::TestFixture;
}

/// Common configuration YAML snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// No repositories at all.
    pub const EMPTY: &str = "repositories: []\n";

    /// A repository whose origin will never answer.
    pub const UNREACHABLE: &str = r#"
repositories:
  - name: standards
    origin: file:///nonexistent/preset-repo/standards.git
    ref: main
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "repositories: [unclosed";
}

/// Preset files used across tests.
#[allow(dead_code)]
pub mod templates {
    /// A tailoring with two flags, `a` on and `b` off.
    pub const TWO_FLAGS: &str = "\
-eval_file=base.ecl
-preset_template='
title: Two Flags
kind: tailoring
description: A and B
options:
  - id: a
    kind: flag
    default: true
  - id: b
    kind: flag
    default: false
'
";

    /// A ruleset grouping its flags.
    pub const GROUPED: &str = "\
-template='
title: Grouped Rules
kind: ruleset
description: Rules in a group
authors: [Quality Team]
options:
  - id: Required Rules
    kind: group
    children:
      - id: Rule 1.1
        kind: flag
        default: true
      - id: 2nd pass
        kind: flag
'
";

    /// Carries a block the YAML parser rejects.
    pub const MALFORMED: &str = "-template='\ntitle: [unclosed\n'\n";
}

/// A temporary directory with an optional `.preset-repo.yaml` and a private cache root.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.preset-repo.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file(".preset-repo.yaml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The cache root every command of this fixture uses.
    pub fn cache_root(&self) -> PathBuf {
        self.temp_dir.path().join("cache")
    }

    /// Create a command running in this fixture's directory with its own cache root.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("preset-repo");
        cmd.current_dir(self.path())
            .env_remove("PRESET_REPO_CONFIG")
            .env_remove("RUST_LOG")
            .env("PRESET_REPO_CACHE", self.cache_root());
        cmd
    }

    /// Create a bare-bones git repository under `rel` holding `files`, and
    /// return its `file://` origin. Needs a `git` binary.
    #[allow(dead_code)]
    pub fn git_origin(&self, rel: &str, files: &[(&str, &str)]) -> String {
        let dir = self.temp_dir.child(rel);
        dir.create_dir_all().expect("Failed to create origin dir");
        for (path, content) in files {
            dir.child(path)
                .write_str(content)
                .expect("Failed to write origin file");
        }
        let git = |args: &[&str]| {
            let status = Command::new("git")
                .arg("-C")
                .arg(dir.path())
                .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
                .args(args)
                .status()
                .expect("Failed to run git");
            assert!(status.success(), "git {:?} failed", args);
        };
        git(&["init", "--quiet", "--initial-branch=main"]);
        git(&["add", "."]);
        git(&["commit", "--quiet", "-m", "initial"]);
        format!("file://{}", dir.path().display())
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_config() {
        let fixture = TestFixture::new().with_config(configs::EMPTY);
        assert!(fixture.path().join(".preset-repo.yaml").exists());
        assert!(fixture.cache_root().starts_with(fixture.path()));
    }

    #[test]
    fn test_configs_parse() {
        for config in [configs::EMPTY, configs::UNREACHABLE] {
            preset_repo::config::parse(config).expect("config should parse");
        }
        assert!(preset_repo::config::parse(configs::INVALID_YAML).is_err());
    }
}

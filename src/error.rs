//! # Error Handling
//!
//! This module defines the centralized error type for the `preset-repo`
//! library. It uses the `thiserror` library to create an `Error` enum that
//! covers every failure mode of the checkout cache, the preset scanner, the
//! template validator and the flag resolver.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Each variant carries the context needed to
//!   tell the user which repository, file or field was at fault.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Failures are deliberately split along the lines a caller needs to act on:
//!
//! - A checkout failure is fatal for one repository only.
//! - A block that cannot be deserialized (`BlockParse`) is distinct from a
//!   block that deserializes but breaks the template rules
//!   (`TemplateValidation`).
//! - Per-file failures are wrapped in `TemplateFile` so a scan report can name
//!   the file without losing the underlying cause.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for preset-repo operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing the `.preset-repo.yaml` configuration file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// Every fetch, checkout and clone strategy for one repository failed.
    #[error("Checkout failed for '{name}' ({origin}@{r#ref}): {message}")]
    Checkout {
        name: String,
        origin: String,
        r#ref: String,
        message: String,
    },

    /// A single `git` invocation failed.
    #[error("Git command failed: git {command}: {stderr}")]
    GitCommand { command: String, stderr: String },

    /// An error occurred with a cache directory operation.
    #[error("Cache operation error: {message}")]
    Cache { message: String },

    /// An embedded preset block was found but could not be deserialized.
    #[error("Failed to parse preset block in {}: {message}", path.display())]
    BlockParse { path: PathBuf, message: String },

    /// A deserialized document violates the template rules.
    #[error("Invalid template field '{field}': {message}")]
    TemplateValidation { field: String, message: String },

    /// A per-file failure, naming the file it happened in.
    #[error("{}: {source}", path.display())]
    TemplateFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// A file that was expected to hold a preset template holds none.
    #[error("No preset template found in {}", path.display())]
    TemplateNotFound { path: PathBuf },

    /// A flag override names a flag the template does not define.
    #[error("Unknown flag '{flag}' in overrides")]
    UnknownFlag { flag: String },

    /// A preset selection names a repository that is not configured.
    #[error("Unknown repository '{name}'")]
    UnknownRepository { name: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attach the path of the file being processed to an error.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            // Already carries its own path
            Error::BlockParse { .. } | Error::TemplateFile { .. } => self,
            other => Error::TemplateFile {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

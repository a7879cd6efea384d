//! Error handling for the kiln CLI.
//!
//! A single hierarchical error type built on `thiserror`, with a
//! [`ResultExt`] trait for attaching paths and hints, and a conversion to
//! `miette::Report` used by `main` for final reporting.
//!
//! Transformation errors never appear here: the pipeline fault-isolates
//! them into task reports. `CliError` covers the failures that abort a
//! command - configuration problems, filesystem errors, server and watcher
//! failures.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] kiln_config::ConfigError),

    /// Pipeline task failures (missing source roots, I/O, bad targets)
    #[error("Task error: {0}")]
    Task(#[from] kiln_pipeline::Error),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Convert a [`CliError`] to a miette Report for final reporting.
pub fn cli_error_to_miette(err: CliError) -> miette::Report {
    match err {
        CliError::Config(e) => miette::miette!("{}", e),
        CliError::Task(e) => miette::miette!("{}", e),
        other => miette::miette!("{}", other),
    }
}

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] carrying
    /// the offending path.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a helpful hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error with a context message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}

//! Pipeline error types.
//!
//! Only failures that abort a task live here. Per-file transformation
//! failures are fault-isolated into [`crate::report::TaskReport`] instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a pipeline task.
#[derive(Debug, Error)]
pub enum Error {
    /// A configured source root doesn't exist
    #[error("Source directory not found: {}\n\nHint: Check the configured paths or create the directory", .0.display())]
    SourceRootNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to print or serialize a source map
    #[error("Source map error: {0}")]
    SourceMap(String),

    /// Browserslist query in the configuration couldn't be parsed
    #[error("Invalid browser targets: {0}\n\nHint: Use browserslist queries like \"last 10 versions\"")]
    BrowserTargets(String),

    /// The task graph contains a dependency cycle
    #[error("Task graph cycle involving '{0}'")]
    GraphCycle(String),
}

/// Result type alias using [`Error`] as the default error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_root_message_carries_hint() {
        let err = Error::SourceRootNotFound(PathBuf::from("app/scss"));
        let msg = err.to_string();
        assert!(msg.contains("app/scss"));
        assert!(msg.contains("Hint:"));
    }
}

//! Destination cleaners.
//!
//! `clean_tree` empties a directory so a fresh build cannot inherit stale
//! artifacts. The directory itself is kept; an absent or already-empty
//! target is a silent no-op.

use crate::error::Result;
use std::path::Path;

/// Recursively delete all contents of `dir`.
///
/// # Errors
///
/// Returns I/O errors from the removal itself. A missing target never
/// errors; a target that exists but is not a directory does.
pub fn clean_tree(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    if !dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotADirectory,
            format!("clean target is not a directory: {}", dir.display()),
        )
        .into());
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }
    }

    Ok(())
}

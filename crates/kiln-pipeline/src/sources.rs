//! Source tree enumeration and filesystem helpers.
//!
//! Enumeration is recursive and path-sorted so that concatenation order is
//! deterministic across runs and platforms.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Resolve a possibly-relative path against a project root.
pub fn resolve(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Recursively collect all regular files under `root`, path-sorted.
///
/// # Errors
///
/// Returns [`Error::SourceRootNotFound`] when `root` doesn't exist, and I/O
/// errors surfaced by the directory walk.
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(Error::SourceRootNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            Error::Io(e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("walk error")))
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Collect files under `root` whose extension matches one of `extensions`
/// (case-insensitive), path-sorted.
pub fn collect_with_extensions(root: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let mut files = collect_files(root)?;
    files.retain(|path| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                extensions.iter().any(|candidate| *candidate == ext)
            })
            .unwrap_or(false)
    });
    Ok(files)
}

/// True when `src` is new or modified relative to `dest`.
///
/// A missing destination counts as changed; unreadable metadata counts as
/// changed so a broken destination gets rewritten rather than stuck.
pub fn is_changed(src: &Path, dest: &Path) -> bool {
    let Ok(dest_meta) = std::fs::metadata(dest) else {
        return true;
    };
    let Ok(src_meta) = std::fs::metadata(src) else {
        return true;
    };
    match (src_meta.modified(), dest_meta.modified()) {
        (Ok(src_time), Ok(dest_time)) => src_time > dest_time,
        _ => true,
    }
}

/// Create `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}

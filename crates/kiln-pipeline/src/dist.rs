//! DistAssembler: collect built artifacts into the distributable tree.
//!
//! Copies - never transforms - the minified CSS bundles, minified JS
//! bundles, optimized images, and HTML files into the dist directory. Paths
//! are preserved relative to the base directory, so `app/css/style.min.css`
//! lands at `dist/css/style.min.css`.
//!
//! Assembly expects the builder tasks to have populated their outputs;
//! running it first just yields an empty or incomplete tree (the release
//! graph orders it last).

use crate::error::Result;
use crate::report::TaskReport;
use crate::sources;
use kiln_config::KilnConfig;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Copy built CSS, JS, images and HTML into the dist directory.
///
/// # Errors
///
/// Returns I/O errors from the copies themselves. Missing builder outputs
/// are not errors - those groups simply contribute nothing.
pub fn assemble(config: &KilnConfig, root: &Path) -> Result<TaskReport> {
    let started = Instant::now();
    let mut report = TaskReport::new("dist");

    let base = sources::resolve(&config.base_dir, root);
    let dist = sources::resolve(&config.dist_dir, root);

    let mut selected: Vec<PathBuf> = Vec::new();

    // Built CSS bundles
    selected.extend(
        collect_if_present(&sources::resolve(&config.styles.out, root))?
            .into_iter()
            .filter(|p| file_name_ends_with(p, ".min.css")),
    );

    // Built JS bundles
    selected.extend(
        collect_if_present(&sources::resolve(&config.scripts.out, root))?
            .into_iter()
            .filter(|p| file_name_ends_with(p, ".min.js")),
    );

    // Optimized images, all of them
    selected.extend(collect_if_present(&sources::resolve(
        &config.images.out,
        root,
    ))?);

    // Markup anywhere under the base directory
    selected.extend(
        collect_if_present(&base)?
            .into_iter()
            .filter(|p| file_name_ends_with(p, ".html")),
    );

    for file in selected {
        let rel = match file.strip_prefix(&base) {
            Ok(rel) => rel.to_path_buf(),
            // Outputs configured outside the base directory flatten to their
            // file name
            Err(_) => PathBuf::from(file.file_name().unwrap_or(file.as_os_str())),
        };
        let dest = dist.join(rel);
        if let Some(parent) = dest.parent() {
            sources::ensure_dir(parent)?;
        }
        std::fs::copy(&file, &dest)?;
        report.wrote(dest);
    }

    report.duration = started.elapsed();
    Ok(report)
}

fn collect_if_present(root: &Path) -> Result<Vec<PathBuf>> {
    if root.exists() {
        sources::collect_files(root)
    } else {
        Ok(Vec::new())
    }
}

fn file_name_ends_with(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(suffix))
        .unwrap_or(false)
}

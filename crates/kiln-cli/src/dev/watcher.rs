//! File system watcher with routing for development mode.
//!
//! Watches the project root recursively and classifies changes into the
//! task that should re-run: style sources re-trigger the style builder,
//! script sources the script builder, markup a direct client reload, and
//! image sources the optimizer. Output trees and hidden files are ignored
//! so rebuilds can't re-trigger themselves.

use crate::error::{CliError, Result};
use kiln_config::KilnConfig;
use kiln_pipeline::sources;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// File change event type.
#[derive(Debug, Clone)]
pub enum FileChange {
    /// File was modified
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }
}

/// Task to re-run for a given change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchRoute {
    /// Re-run the style builder
    Styles,
    /// Re-run the script builder
    Scripts,
    /// Broadcast a reload, no build step
    Markup,
    /// Re-run the image optimizer
    Images,
}

impl WatchRoute {
    /// Classify a changed path, or `None` when it should be ignored.
    pub fn classify(path: &Path, config: &KilnConfig, root: &Path) -> Option<Self> {
        // Never react to our own outputs
        let outputs = [
            &config.styles.out,
            &config.scripts.out,
            &config.images.out,
            &config.dist_dir,
        ];
        for out in outputs {
            if path.starts_with(sources::resolve(out, root)) {
                return None;
            }
        }

        // Anything under the image source tree belongs to the optimizer,
        // whatever its extension
        if path.starts_with(sources::resolve(&config.images.src, root)) {
            return Some(Self::Images);
        }

        let file_name = path.file_name().and_then(|name| name.to_str())?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "scss" | "sass" => Some(Self::Styles),
            "html" => Some(Self::Markup),
            "js" | "mjs" if !file_name.ends_with(".min.js") => Some(Self::Scripts),
            _ => None,
        }
    }
}

/// File watcher with per-path debouncing.
///
/// Watches a directory recursively and sends change events through a
/// channel. Debouncing keeps editors that write twice from causing double
/// rebuilds.
pub struct FileWatcher {
    /// Underlying notify watcher
    _watcher: RecommendedWatcher,
    /// Root directory being watched
    root: PathBuf,
}

impl FileWatcher {
    /// Create a new file watcher over `root`.
    ///
    /// # Returns
    ///
    /// Tuple of (FileWatcher, receiver for change events)
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be created or the directory
    /// doesn't exist.
    pub fn new(root: PathBuf, debounce_ms: u64) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if !root.exists() {
            return Err(CliError::FileNotFound(root));
        }

        let (tx, rx) = mpsc::channel(100);

        let debounce_duration = Duration::from_millis(debounce_ms);
        let mut last_event: Option<(PathBuf, Instant)> = None;
        let root_clone = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                for path in &event.paths {
                    if Self::should_ignore(path, &root_clone) {
                        continue;
                    }

                    // Debounce: skip if same file changed within the window
                    let now = Instant::now();
                    if let Some((last_path, last_time)) = &last_event {
                        if last_path == path && now.duration_since(*last_time) < debounce_duration
                        {
                            continue;
                        }
                    }
                    last_event = Some((path.clone(), now));

                    let change = match event.kind {
                        notify::EventKind::Create(_) => FileChange::Created(path.clone()),
                        notify::EventKind::Modify(_) => FileChange::Modified(path.clone()),
                        notify::EventKind::Remove(_) => FileChange::Removed(path.clone()),
                        _ => continue,
                    };

                    let _ = tx.blocking_send(change);
                }
            }
        })
        .map_err(CliError::Watch)?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(CliError::Watch)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    /// Check if a path should be ignored: anything outside the root, and
    /// hidden files and directories.
    fn should_ignore(path: &Path, root: &Path) -> bool {
        if !path.starts_with(root) {
            return true;
        }

        let rel_path = match path.strip_prefix(root) {
            Ok(p) => p,
            Err(_) => return true,
        };

        for component in rel_path.components() {
            if let Some(name) = component.as_os_str().to_str() {
                if name.starts_with('.') && name != "." && name != ".." {
                    return true;
                }
            }
        }

        false
    }

    /// Get the root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> KilnConfig {
        KilnConfig::default()
    }

    #[test]
    fn test_classify_styles() {
        let root = Path::new("/project");
        assert_eq!(
            WatchRoute::classify(Path::new("/project/app/scss/main.scss"), &config(), root),
            Some(WatchRoute::Styles)
        );
        // Any style file counts, not only those under the source root
        assert_eq!(
            WatchRoute::classify(Path::new("/project/app/other/extra.scss"), &config(), root),
            Some(WatchRoute::Styles)
        );
    }

    #[test]
    fn test_classify_scripts_excludes_minified() {
        let root = Path::new("/project");
        assert_eq!(
            WatchRoute::classify(Path::new("/project/app/js/src/app.js"), &config(), root),
            Some(WatchRoute::Scripts)
        );
        assert_eq!(
            WatchRoute::classify(
                Path::new("/project/app/js/src/vendor.min.js"),
                &config(),
                root
            ),
            None
        );
    }

    #[test]
    fn test_classify_markup_and_images() {
        let root = Path::new("/project");
        assert_eq!(
            WatchRoute::classify(Path::new("/project/app/index.html"), &config(), root),
            Some(WatchRoute::Markup)
        );
        assert_eq!(
            WatchRoute::classify(Path::new("/project/app/img/src/logo.png"), &config(), root),
            Some(WatchRoute::Images)
        );
    }

    #[test]
    fn test_classify_ignores_outputs() {
        let root = Path::new("/project");
        // A build writing style.min.css must not re-trigger itself
        assert_eq!(
            WatchRoute::classify(
                Path::new("/project/app/css/style.min.css"),
                &config(),
                root
            ),
            None
        );
        assert_eq!(
            WatchRoute::classify(
                Path::new("/project/app/js/dest/script.min.js"),
                &config(),
                root
            ),
            None
        );
        assert_eq!(
            WatchRoute::classify(Path::new("/project/dist/index.html"), &config(), root),
            None
        );
        assert_eq!(
            WatchRoute::classify(Path::new("/project/app/img/dest/a.png"), &config(), root),
            None
        );
    }

    #[test]
    fn test_classify_unrelated_files() {
        let root = Path::new("/project");
        assert_eq!(
            WatchRoute::classify(Path::new("/project/README.md"), &config(), root),
            None
        );
    }

    #[test]
    fn test_should_ignore_hidden_files() {
        let root = PathBuf::from("/project");
        assert!(FileWatcher::should_ignore(
            Path::new("/project/.git/config"),
            &root
        ));
        assert!(FileWatcher::should_ignore(Path::new("/project/.env"), &root));
        assert!(!FileWatcher::should_ignore(
            Path::new("/project/app/scss/main.scss"),
            &root
        ));
    }

    #[test]
    fn test_should_ignore_outside_root() {
        let root = PathBuf::from("/project");
        assert!(FileWatcher::should_ignore(
            Path::new("/other/file.js"),
            &root
        ));
    }

    #[test]
    fn test_file_change_path() {
        let path = PathBuf::from("/project/app/scss/main.scss");
        assert_eq!(FileChange::Modified(path.clone()).path(), path.as_path());
        assert_eq!(FileChange::Created(path.clone()).path(), path.as_path());
        assert_eq!(FileChange::Removed(path.clone()).path(), path.as_path());
    }
}

//! Shared helpers for command implementations.

use crate::error::{CliError, Result};
use kiln_config::KilnConfig;
use std::path::{Path, PathBuf};

/// Resolve the project root and load the configuration for a command.
///
/// The root is `--cwd` when given, the current directory otherwise. The
/// config file is `--config` when given, else `kiln.config.json` in the
/// root when present, else defaults.
pub(crate) fn load_project(
    config_path: Option<&Path>,
    cwd: Option<&Path>,
) -> Result<(KilnConfig, PathBuf)> {
    let root = match cwd {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "Project root is not a directory: {}",
            root.display()
        )));
    }

    let config_file = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let candidate = root.join("kiln.config.json");
            candidate.exists().then_some(candidate)
        }
    };

    let config = KilnConfig::load(config_file.as_deref())?;
    config.validate()?;
    Ok((config, root))
}

/// Open a URL in the default browser.
///
/// Uses platform-specific commands: `open` on macOS, `start` on Windows,
/// `xdg-open` elsewhere.
pub(crate) fn open_browser(url: &str) {
    use std::process::Command;

    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => crate::ui::info(&format!("Opened browser at {}", url)),
        Err(e) => crate::ui::warning(&format!("Failed to open browser: {}", e)),
    }
}

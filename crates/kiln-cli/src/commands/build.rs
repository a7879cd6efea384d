//! Release build command implementation.
//!
//! Runs the full release graph: empty the dist directory, then styles,
//! scripts, images, and dist assembly in strict sequence. Transformation
//! failures inside a task are reported in the summary but don't fail the
//! command; task-level failures (missing source roots, I/O) do.

use crate::cli::TaskArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;
use kiln_pipeline::TaskGraph;
use std::time::Instant;

/// Execute the build command.
///
/// # Errors
///
/// Returns errors for invalid configuration and task-level failures.
pub async fn execute(args: TaskArgs) -> Result<()> {
    let start_time = Instant::now();

    ui::info("Loading configuration...");
    let (config, root) = utils::load_project(args.config.as_deref(), args.cwd.as_deref())?;
    ui::info(&format!("Project root: {}", root.display()));
    ui::info(&format!("Output: {}", config.dist_dir.display()));

    let reports = tokio::task::spawn_blocking(move || {
        TaskGraph::release_build().run(&config, &root)
    })
    .await
    .map_err(|e| crate::error::CliError::Custom(format!("Build task panicked: {}", e)))??;

    ui::print_task_reports(&reports);
    ui::success(&format!(
        "Build completed in {}",
        ui::format_duration(start_time.elapsed())
    ));

    Ok(())
}

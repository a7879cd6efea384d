//! The individual named tasks: styles, scripts, images, dist, clean.
//!
//! Each runs one pipeline task against the project and prints its report.

use crate::cli::{CleanArgs, TaskArgs};
use crate::commands::utils;
use crate::error::{CliError, Result};
use crate::ui;
use kiln_config::KilnConfig;
use kiln_pipeline::{clean, sources, TaskReport};
use std::path::PathBuf;

/// Run one blocking pipeline task and print its report.
async fn run_task<F>(args: TaskArgs, task: F) -> Result<()>
where
    F: FnOnce(&KilnConfig, &std::path::Path) -> kiln_pipeline::Result<TaskReport>
        + Send
        + 'static,
{
    let (config, root) = utils::load_project(args.config.as_deref(), args.cwd.as_deref())?;

    let report = tokio::task::spawn_blocking(move || task(&config, &root))
        .await
        .map_err(|e| CliError::Custom(format!("Task panicked: {}", e)))??;

    ui::print_task_reports(std::slice::from_ref(&report));
    Ok(())
}

/// Execute the styles task.
pub async fn styles_execute(args: TaskArgs) -> Result<()> {
    run_task(args, kiln_pipeline::styles::build).await
}

/// Execute the scripts task.
pub async fn scripts_execute(args: TaskArgs) -> Result<()> {
    run_task(args, kiln_pipeline::scripts::build).await
}

/// Execute the images task.
pub async fn images_execute(args: TaskArgs) -> Result<()> {
    run_task(args, kiln_pipeline::images::build).await
}

/// Execute the dist task.
pub async fn dist_execute(args: TaskArgs) -> Result<()> {
    run_task(args, kiln_pipeline::dist::assemble).await
}

/// Execute the clean command.
///
/// With no target flags both the image destination and the dist directory
/// are emptied.
pub async fn clean_execute(args: CleanArgs) -> Result<()> {
    let (config, root) = utils::load_project(args.config.as_deref(), args.cwd.as_deref())?;

    let all = !args.images && !args.dist;
    let mut targets: Vec<PathBuf> = Vec::new();
    if args.images || all {
        targets.push(sources::resolve(&config.images.out, &root));
    }
    if args.dist || all {
        targets.push(sources::resolve(&config.dist_dir, &root));
    }

    for target in targets {
        clean::clean_tree(&target).map_err(CliError::Task)?;
        ui::success(&format!("Emptied {}", target.display()));
    }

    Ok(())
}

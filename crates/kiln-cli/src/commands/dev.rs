//! Interactive development command.
//!
//! Orchestrates the dev lifecycle:
//! - initial style and script builds, started concurrently
//! - preview server with SSE live reload
//! - file watcher routing changes to the right task
//! - graceful shutdown on Ctrl+C
//!
//! Style changes hot-swap stylesheets in connected browsers; script and
//! markup changes trigger a full reload; image changes re-run the
//! optimizer quietly.

use crate::cli::DevArgs;
use crate::commands::utils;
use crate::dev::{
    DevEvent, DevServer, DevServerState, FileChange, FileWatcher, ServeConfig, SharedState,
    WatchRoute,
};
use crate::error::Result;
use crate::ui;
use kiln_config::KilnConfig;
use kiln_pipeline::TaskReport;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;

/// Execute the dev command.
///
/// # Process Flow
///
/// 1. Load and validate configuration
/// 2. Run initial style and script builds concurrently
/// 3. Start the file watcher
/// 4. Start the preview server
/// 5. Event loop: route file changes to tasks, broadcast reload events,
///    stop on Ctrl+C
///
/// # Errors
///
/// Returns errors for invalid configuration, a missing base directory,
/// port binding failures, and watcher failures. Build failures inside the
/// loop are reported, not fatal.
pub async fn execute(args: DevArgs) -> Result<()> {
    ui::info("Starting development...");

    let (config, root) = utils::load_project(args.config.as_deref(), args.cwd.as_deref())?;
    ui::info(&format!("Project root: {}", root.display()));

    // Initial builds, concurrently - parallel composition, no ordering
    // between their completions
    let (styles_report, scripts_report) = tokio::join!(
        run_build(config.clone(), root.clone(), kiln_pipeline::styles::build),
        run_build(config.clone(), root.clone(), kiln_pipeline::scripts::build),
    );
    if let Some(report) = styles_report {
        ui::print_task_reports(std::slice::from_ref(&report));
    }
    if let Some(report) = scripts_report {
        ui::print_task_reports(std::slice::from_ref(&report));
    }

    let base_dir = kiln_pipeline::sources::resolve(&config.base_dir, &root);
    let serve_config = ServeConfig::new(args.port, !args.no_open, base_dir.clone())?;
    let state = Arc::new(DevServerState::new(base_dir));

    // File watcher over the project root
    let (watcher, mut change_rx) = FileWatcher::new(root.clone(), 100)?;
    ui::info(&format!(
        "Watching for changes in: {}",
        watcher.root().display()
    ));

    // Preview server in the background
    let server_url = serve_config.server_url();
    let open = serve_config.open;
    let server = DevServer::new(serve_config, state.clone());
    let mut server_handle = tokio::spawn(async move {
        if let Err(e) = server.start().await {
            ui::error(&format!("Server error: {}", e));
        }
    });

    if open {
        utils::open_browser(&server_url);
    }

    ui::info("Press Ctrl+C to stop");

    loop {
        tokio::select! {
            // File change detected
            Some(change) = change_rx.recv() => {
                handle_file_change(change, &config, &root, &state).await;
            }

            // Ctrl+C received
            _ = signal::ctrl_c() => {
                ui::info("Shutting down...");
                break;
            }

            // Server task completed (bind failure or shutdown)
            _ = &mut server_handle => {
                ui::warning("Server task completed unexpectedly");
                break;
            }
        }
    }

    ui::success("Development server stopped");
    Ok(())
}

/// Route a file change to its task and notify connected clients.
async fn handle_file_change(
    change: FileChange,
    config: &KilnConfig,
    root: &Path,
    state: &SharedState,
) {
    let Some(route) = WatchRoute::classify(change.path(), config, root) else {
        return;
    };

    ui::info(&format!("File changed: {}", change.path().display()));

    match route {
        WatchRoute::Styles => {
            if let Some(report) =
                run_build(config.clone(), root.to_path_buf(), kiln_pipeline::styles::build).await
            {
                ui::print_task_reports(std::slice::from_ref(&report));
                state.broadcast(&DevEvent::StylesUpdated).await;
            }
        }
        WatchRoute::Scripts => {
            if let Some(report) = run_build(
                config.clone(),
                root.to_path_buf(),
                kiln_pipeline::scripts::build,
            )
            .await
            {
                ui::print_task_reports(std::slice::from_ref(&report));
                state.broadcast(&DevEvent::ScriptsUpdated).await;
            }
        }
        WatchRoute::Markup => {
            // No build step; reload straight away
            state.broadcast(&DevEvent::Reload).await;
        }
        WatchRoute::Images => {
            if let Some(report) = run_build(
                config.clone(),
                root.to_path_buf(),
                kiln_pipeline::images::build,
            )
            .await
            {
                ui::print_task_reports(std::slice::from_ref(&report));
            }
        }
    }
}

/// Run one blocking pipeline task off the async runtime.
///
/// Task-level failures are reported here and turned into `None`; inside
/// the dev loop a failed build must not bring the session down.
async fn run_build<F>(config: KilnConfig, root: PathBuf, task: F) -> Option<TaskReport>
where
    F: FnOnce(&KilnConfig, &Path) -> kiln_pipeline::Result<TaskReport> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || task(&config, &root)).await {
        Ok(Ok(report)) => Some(report),
        Ok(Err(e)) => {
            ui::error(&format!("Build failed: {}", e));
            None
        }
        Err(e) => {
            ui::error(&format!("Build task panicked: {}", e));
            None
        }
    }
}

//! Preview server command (no watching, no rebuilds).

use crate::cli::ServeArgs;
use crate::commands::utils;
use crate::dev::{DevServer, DevServerState, ServeConfig};
use crate::error::Result;
use std::sync::Arc;

/// Execute the serve command.
///
/// # Errors
///
/// Returns an error when the base directory is missing or no port can be
/// bound.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let (config, root) = utils::load_project(args.config.as_deref(), args.cwd.as_deref())?;

    let base_dir = kiln_pipeline::sources::resolve(&config.base_dir, &root);
    let serve_config = ServeConfig::new(args.port, !args.no_open, base_dir.clone())?;
    let state = Arc::new(DevServerState::new(base_dir));

    if serve_config.open {
        utils::open_browser(&serve_config.server_url());
    }

    DevServer::new(serve_config, state).start().await
}

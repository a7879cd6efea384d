//! Kiln CLI - front-end asset pipeline.
//!
//! Entry point: parses arguments, initializes logging, and dispatches the
//! selected command. Invoking `kiln` with no subcommand starts interactive
//! development (builders + dev server + watcher).

use clap::Parser;
use kiln_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors();

    // No subcommand means interactive development, like the default task of
    // a task runner
    let command = args
        .command
        .unwrap_or_else(|| cli::Command::Dev(cli::DevArgs::default()));

    let result = match command {
        cli::Command::Dev(dev_args) => commands::dev_execute(dev_args).await,
        cli::Command::Build(task_args) => commands::build_execute(task_args).await,
        cli::Command::Serve(serve_args) => commands::serve_execute(serve_args).await,
        cli::Command::Styles(task_args) => commands::styles_execute(task_args).await,
        cli::Command::Scripts(task_args) => commands::scripts_execute(task_args).await,
        cli::Command::Images(task_args) => commands::images_execute(task_args).await,
        cli::Command::Dist(task_args) => commands::dist_execute(task_args).await,
        cli::Command::Clean(clean_args) => commands::clean_execute(clean_args).await,
    };

    result.map_err(error::cli_error_to_miette)
}

//! Command-line interface definition for kiln.
//!
//! # Command Structure
//!
//! - `kiln` - interactive development (build, serve, watch)
//! - `kiln build` - release build into the dist directory
//! - `kiln styles` / `scripts` / `images` / `dist` - individual tasks
//! - `kiln clean` - empty destination directories
//! - `kiln serve` - dev server without watching

mod commands;

use clap::Parser;

pub use commands::{CleanArgs, Command, DevArgs, ServeArgs, TaskArgs};

/// kiln - a front-end asset pipeline
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "A front-end asset pipeline with live reload",
    long_about = "kiln compiles Sass, bundles and minifies scripts, optimizes images,\n\
                  serves a local preview with live reload, and assembles a distributable\n\
                  output directory. Run with no arguments for interactive development."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute; omit for interactive development
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::parse_from(["kiln"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_build_subcommand_parses() {
        let cli = Cli::parse_from(["kiln", "build"]);
        assert!(matches!(cli.command, Some(Command::Build(_))));
    }

    #[test]
    fn test_dev_port_flag() {
        let cli = Cli::parse_from(["kiln", "dev", "--port", "4000"]);
        match cli.command {
            Some(Command::Dev(args)) => assert_eq!(args.port, 4000),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_clean_targets() {
        let cli = Cli::parse_from(["kiln", "clean", "--images"]);
        match cli.command {
            Some(Command::Clean(args)) => {
                assert!(args.images);
                assert!(!args.dist);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verbose_quiet_conflict() {
        assert!(Cli::try_parse_from(["kiln", "-v", "-q"]).is_err());
    }
}

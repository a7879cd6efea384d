use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available kiln subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive development
    ///
    /// Builds styles and scripts, starts the preview server, and watches
    /// sources: style changes hot-swap stylesheets, script and markup
    /// changes reload connected browsers, image changes re-run the
    /// optimizer. This is the default when no subcommand is given.
    Dev(DevArgs),

    /// Release build
    ///
    /// Empties the dist directory, then runs styles, scripts and images in
    /// strict sequence and assembles the distributable tree.
    Build(TaskArgs),

    /// Start the preview server without watching
    Serve(ServeArgs),

    /// Compile, concatenate, vendor-prefix and minify stylesheets
    Styles(TaskArgs),

    /// Concatenate and minify scripts
    Scripts(TaskArgs),

    /// Optimize new or modified images
    Images(TaskArgs),

    /// Assemble the distributable directory from built outputs
    ///
    /// Expects the builder tasks to have run first; otherwise the result
    /// is empty or incomplete.
    Dist(TaskArgs),

    /// Empty destination directories
    Clean(CleanArgs),
}

/// Arguments shared by the one-shot task commands
#[derive(Args, Debug)]
pub struct TaskArgs {
    /// Path to kiln.config.json
    ///
    /// If not provided, kiln.config.json is read from the project root
    /// when present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root directory
    ///
    /// All relative configured paths resolve against this directory.
    /// Defaults to the current working directory.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for the dev command
#[derive(Args, Debug)]
pub struct DevArgs {
    /// Path to kiln.config.json
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Port for the preview server
    ///
    /// If the port is busy the next available one is used.
    #[arg(short, long, default_value = "3000", value_name = "PORT")]
    pub port: u16,

    /// Don't open the browser on server start
    #[arg(long)]
    pub no_open: bool,
}

impl Default for DevArgs {
    fn default() -> Self {
        Self {
            config: None,
            cwd: None,
            port: 3000,
            no_open: false,
        }
    }
}

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to kiln.config.json
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Port for the preview server
    #[arg(short, long, default_value = "3000", value_name = "PORT")]
    pub port: u16,

    /// Don't open the browser on server start
    #[arg(long)]
    pub no_open: bool,
}

/// Arguments for the clean command
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Path to kiln.config.json
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Empty the optimized image destination
    #[arg(long)]
    pub images: bool,

    /// Empty the dist directory
    #[arg(long)]
    pub dist: bool,
}

//! Command implementations for the kiln CLI.
//!
//! - [`dev`] - interactive development (builders + server + watcher)
//! - [`build`] - release build through the task graph
//! - [`serve`] - preview server only
//! - [`tasks`] - the individual named tasks (styles, scripts, images, dist, clean)
//!
//! Each command provides an `execute` function taking its parsed arguments.

pub mod build;
pub mod dev;
pub mod serve;
pub mod tasks;
pub(crate) mod utils;

// Re-export execute functions for convenience
pub use build::execute as build_execute;
pub use dev::execute as dev_execute;
pub use serve::execute as serve_execute;
pub use tasks::{
    clean_execute, dist_execute, images_execute, scripts_execute, styles_execute,
};

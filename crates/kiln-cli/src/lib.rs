//! Kiln CLI - front-end asset pipeline with a dev server and live reload.
//!
//! This crate provides the command-line interface for the kiln pipeline,
//! exposing the tasks from `kiln-pipeline` together with an interactive
//! development mode: a static preview server, a file watcher that re-runs
//! the right builder on change, and push-based reload notifications to
//! connected browsers.
//!
//! # Architecture
//!
//! - [`error`] - CLI error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal status messages and formatting
//! - `cli` - clap argument definitions
//! - `commands` - individual command implementations
//! - `dev` - dev server, shared state, file watcher

// Public modules
pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

// Re-export commonly used types
pub use error::{CliError, Result, ResultExt};

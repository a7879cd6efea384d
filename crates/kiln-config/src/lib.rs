//! Configuration for the kiln asset pipeline.
//!
//! This crate defines the project layout and per-task options shared by every
//! kiln task, along with layered loading:
//!
//! 1. Built-in defaults (the conventional `app/` project layout)
//! 2. `kiln.config.json` in the project root
//! 3. `KILN_*` environment variables (`KILN_DIST_DIR`, `KILN_STYLES__SRC`, ...)
//!
//! Later layers override earlier ones. All paths are stored relative to the
//! project root and resolved by the consumer.
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_config::KilnConfig;
//!
//! let config = KilnConfig::load(None)?;
//! config.validate()?;
//! println!("styles from {}", config.styles.src.display());
//! # Ok::<(), kiln_config::ConfigError>(())
//! ```

mod error;
mod loading;
mod settings;
mod validation;

pub use error::ConfigError;
pub use settings::{ImagesConfig, KilnConfig, ScriptsConfig, StylesConfig, SvgConfig};

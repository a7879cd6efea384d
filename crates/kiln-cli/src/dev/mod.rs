//! Development server module.
//!
//! - Static preview serving with reload-script injection
//! - Push-based notifications via Server-Sent Events
//! - File watching with per-path debouncing and route classification

pub mod config;
pub mod server;
pub mod state;
pub mod watcher;

// Re-exports
pub use config::ServeConfig;
pub use server::DevServer;
pub use state::{DevServerState, SharedState};
pub use watcher::{FileChange, FileWatcher, WatchRoute};

use serde::{Deserialize, Serialize};

/// Events pushed to connected browser clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DevEvent {
    /// Full page reload (markup changed)
    Reload,

    /// Stylesheets rebuilt; swap them in place without a reload
    StylesUpdated,

    /// Scripts rebuilt; clients reload to pick up the new bundle
    ScriptsUpdated,

    /// A client connected to the event stream
    ClientConnected { id: usize },
}

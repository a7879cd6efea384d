//! Shared state for the development server.
//!
//! The client registry is owned here; other tasks never touch it directly,
//! they emit events through [`DevServerState::broadcast`].

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Connected SSE clients, keyed by id.
pub type ClientRegistry = Arc<RwLock<HashMap<usize, tokio::sync::mpsc::Sender<String>>>>;

/// Shared development server state.
pub struct DevServerState {
    /// Directory served to browsers
    base_dir: PathBuf,

    /// Connected SSE clients
    clients: ClientRegistry,

    /// Next client ID
    next_client_id: RwLock<usize>,
}

impl DevServerState {
    /// Create new dev server state serving `base_dir`.
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            clients: Arc::new(RwLock::new(HashMap::new())),
            next_client_id: RwLock::new(0),
        }
    }

    /// Directory served to browsers.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Register a new SSE client.
    ///
    /// # Returns
    ///
    /// Client ID and the receiver the SSE stream drains.
    pub fn register_client(&self) -> (usize, tokio::sync::mpsc::Receiver<String>) {
        let id = {
            let mut next_id = self.next_client_id.write();
            let id = *next_id;
            *next_id += 1;
            id
        };

        let (tx, rx) = tokio::sync::mpsc::channel(100);
        self.clients.write().insert(id, tx);

        (id, rx)
    }

    /// Unregister an SSE client.
    pub fn unregister_client(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    /// Broadcast an event to all connected clients.
    ///
    /// Clients whose channel has gone away are pruned.
    pub async fn broadcast(&self, event: &crate::dev::DevEvent) {
        let json = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());

        let clients = self.clients.read().clone();
        let mut failed_ids = Vec::new();

        for (id, tx) in clients {
            if tx.send(json.clone()).await.is_err() {
                failed_ids.push(id);
            }
        }

        for id in failed_ids {
            self.unregister_client(id);
        }
    }

    /// Get number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }
}

/// Shared state handle for passing around the application.
pub type SharedState = Arc<DevServerState>;

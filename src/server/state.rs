//! Application State
//!
//! Shared state accessible by all handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::app::App;
use crate::config::ServerConfig;
use crate::websocket::{HubConfig, SessionHub};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The served app; read-only after startup
    pub app: Arc<App>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Open WebSocket sessions
    pub sessions: Arc<SessionHub>,
}

impl AppState {
    pub fn new(app: Arc<App>, config: ServerConfig) -> Self {
        Self::with_hub_config(app, config, HubConfig::default())
    }

    /// Create AppState with custom WebSocket hub configuration
    pub fn with_hub_config(app: Arc<App>, config: ServerConfig, hub_config: HubConfig) -> Self {
        Self {
            app,
            config: Arc::new(config),
            start_time: Instant::now(),
            sessions: Arc::new(SessionHub::new(hub_config)),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

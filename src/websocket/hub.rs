//! WebSocket Session Hub
//!
//! Tracks every open `/ws` session and enforces the session limit. Property
//! state itself lives in each connection's task, not here.

use std::collections::HashMap;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Unique identifier for a WebSocket session
pub type SessionId = String;

/// Configuration for the session hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent sessions
    pub max_sessions: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self { max_sessions: 1000 }
    }
}

/// Bookkeeping for one open session
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub opened_at: Instant,
    /// Input changes processed so far
    pub dispatches: u64,
}

/// Registry of open sessions
#[derive(Debug)]
pub struct SessionHub {
    sessions: RwLock<HashMap<SessionId, SessionStats>>,
    config: HubConfig,
}

impl SessionHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Open a session
    ///
    /// Returns the session ID on success, or an error if the session limit
    /// has been reached.
    pub async fn register(&self) -> Result<SessionId, HubError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.config.max_sessions {
            return Err(HubError::TooManySessions(self.config.max_sessions));
        }

        let id = Uuid::new_v4().to_string();
        sessions.insert(
            id.clone(),
            SessionStats {
                opened_at: Instant::now(),
                dispatches: 0,
            },
        );

        tracing::info!(session_id = %id, "WebSocket session opened");
        Ok(id)
    }

    /// Close a session
    pub async fn unregister(&self, id: &str) {
        if let Some(stats) = self.sessions.write().await.remove(id) {
            tracing::info!(
                session_id = %id,
                dispatches = stats.dispatches,
                duration_secs = stats.opened_at.elapsed().as_secs(),
                "WebSocket session closed"
            );
        }
    }

    /// Count one processed input change
    pub async fn record_dispatch(&self, id: &str) -> Result<u64, HubError> {
        let mut sessions = self.sessions.write().await;
        let stats = sessions.get_mut(id).ok_or(HubError::SessionNotFound)?;
        stats.dispatches += 1;
        Ok(stats.dispatches)
    }

    pub async fn stats(&self, id: &str) -> Option<SessionStats> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// True while new sessions can still be opened
    pub async fn has_capacity(&self) -> bool {
        self.session_count().await < self.config.max_sessions
    }
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

/// Hub errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("Too many sessions (limit: {0})")]
    TooManySessions(usize),

    #[error("Session not found")]
    SessionNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_unregister() {
        let hub = SessionHub::default();
        let id = hub.register().await.unwrap();
        assert_eq!(hub.session_count().await, 1);

        hub.unregister(&id).await;
        assert_eq!(hub.session_count().await, 0);
        assert!(hub.stats(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_session_limit() {
        let hub = SessionHub::new(HubConfig { max_sessions: 2 });
        hub.register().await.unwrap();
        hub.register().await.unwrap();

        assert!(!hub.has_capacity().await);
        assert_eq!(hub.register().await, Err(HubError::TooManySessions(2)));
    }

    #[tokio::test]
    async fn test_record_dispatch() {
        let hub = SessionHub::default();
        let id = hub.register().await.unwrap();

        assert_eq!(hub.record_dispatch(&id).await, Ok(1));
        assert_eq!(hub.record_dispatch(&id).await, Ok(2));
        assert_eq!(hub.stats(&id).await.unwrap().dispatches, 2);
        assert_eq!(
            hub.record_dispatch("missing").await,
            Err(HubError::SessionNotFound)
        );
    }
}

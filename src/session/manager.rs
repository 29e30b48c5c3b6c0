// Session manager for high-level session operations

use super::storage::SessionStorage;
use super::types::{Session, SessionConfig, SessionInfo};
use crate::storage::StorageError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Token collisions are astronomically unlikely; a few retries is plenty
const MAX_TOKEN_ATTEMPTS: usize = 3;

/// Session manager for handling session lifecycle
///
/// Sole authority over session creation, lookup and removal. Expiry is
/// checked live on every lookup; the cleanup task only reclaims memory.
pub struct SessionManager {
    storage: Arc<dyn SessionStorage>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(storage: Arc<dyn SessionStorage>, config: SessionConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Create a new session for a user
    pub async fn create_session(&self, user_id: Uuid) -> Result<Session, StorageError> {
        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let session = Session::new(user_id, &self.config)?;

            match self.storage.create_session(session.clone()).await {
                Ok(()) => {
                    info!(
                        "Created session for user {} expiring at {}",
                        user_id, session.expires_at
                    );
                    return Ok(session);
                }
                Err(StorageError::AlreadyExists) => {
                    warn!("Session token collision on attempt {}", attempt);
                }
                Err(e) => return Err(e),
            }
        }

        Err(StorageError::AlreadyExists)
    }

    /// Get a live session by token
    ///
    /// Unknown and expired tokens both resolve to `None`. Nothing is mutated.
    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>, StorageError> {
        match self.storage.get_session(session_id).await? {
            Some(session) if !session.is_expired() => Ok(Some(session)),
            Some(_) => {
                debug!("Session lookup hit an expired record");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Delete a session; unknown tokens are a no-op
    pub async fn delete_session(&self, session_id: &str) -> Result<(), StorageError> {
        self.storage.delete_session(session_id).await?;
        debug!("Session deleted");
        Ok(())
    }

    /// Live sessions of a user, most recent first
    pub async fn get_user_sessions(
        &self,
        user_id: Uuid,
        current_session_id: Option<&str>,
    ) -> Result<Vec<SessionInfo>, StorageError> {
        let sessions = self.storage.get_user_sessions(user_id).await?;

        Ok(sessions
            .iter()
            .filter(|s| !s.is_expired())
            .map(|s| s.to_info(current_session_id))
            .collect())
    }

    /// Delete all sessions for a user (logout from all devices)
    pub async fn delete_user_sessions(&self, user_id: Uuid) -> Result<usize, StorageError> {
        self.storage.delete_user_sessions(user_id).await
    }

    /// Cleanup expired sessions
    pub async fn cleanup_expired_sessions(&self) -> Result<usize, StorageError> {
        let count = self.storage.cleanup_expired_sessions(Utc::now()).await?;
        if count > 0 {
            info!("Swept {} expired sessions", count);
        }
        Ok(count)
    }

    /// Spawn the periodic sweep of expired sessions
    pub fn start_cleanup_task(self: Arc<Self>) -> JoinHandle<()> {
        let period = Duration::from_secs(self.config.cleanup_interval_secs);
        info!("Starting session cleanup task every {:?}", period);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;

                if let Err(e) = self.cleanup_expired_sessions().await {
                    error!("Session cleanup failed: {}", e);
                }
            }
        })
    }
}

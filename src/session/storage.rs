// Session storage backends

use super::types::Session;
use crate::storage::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Trait for session storage backends
///
/// Backends store records as-is; expiry is judged by the caller.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Store a new session; fails with `AlreadyExists` if the token is taken
    async fn create_session(&self, session: Session) -> Result<(), StorageError>;

    /// Get a session by token, expired or not
    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, StorageError>;

    /// Delete a session; deleting an unknown token is not an error
    async fn delete_session(&self, session_id: &str) -> Result<(), StorageError>;

    /// All sessions held by a user
    async fn get_user_sessions(&self, user_id: Uuid) -> Result<Vec<Session>, StorageError>;

    /// Delete every session of a user, returning how many were removed
    async fn delete_user_sessions(&self, user_id: Uuid) -> Result<usize, StorageError>;

    /// Remove sessions expired at `now`, returning how many were removed
    async fn cleanup_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, StorageError>;

    /// Number of stored records, live or expired
    async fn session_count(&self) -> Result<usize, StorageError>;
}

/// In-memory session storage implementation
pub struct MemorySessionStorage {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn create_session(&self, session: Session) -> Result<(), StorageError> {
        let mut sessions = self.sessions.write().await;

        if sessions.contains_key(&session.session_id) {
            return Err(StorageError::AlreadyExists);
        }

        debug!("Storing session for user {}", session.user_id);
        sessions.insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, StorageError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), StorageError> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        Ok(())
    }

    async fn get_user_sessions(&self, user_id: Uuid) -> Result<Vec<Session>, StorageError> {
        let sessions = self.sessions.read().await;
        let mut user_sessions: Vec<Session> = sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();

        // Most recent first
        user_sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(user_sessions)
    }

    async fn delete_user_sessions(&self, user_id: Uuid) -> Result<usize, StorageError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        let count = before - sessions.len();

        info!("Deleted {} sessions for user {}", count, user_id);
        Ok(count)
    }

    async fn cleanup_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        let count = before - sessions.len();

        if count > 0 {
            debug!("Cleaned up {} expired sessions", count);
        }

        Ok(count)
    }

    async fn session_count(&self) -> Result<usize, StorageError> {
        Ok(self.sessions.read().await.len())
    }
}

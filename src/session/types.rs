// Session types and data structures

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::SessionSettings;
use crate::storage::StorageError;

/// Number of random bytes behind each session token
const TOKEN_BYTES: usize = 32;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Absolute session lifetime
    pub ttl_secs: i64,
    /// Interval between sweeps of expired sessions
    pub cleanup_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&SessionSettings::default())
    }
}

impl From<&SessionSettings> for SessionConfig {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            ttl_secs: settings.ttl_secs,
            cleanup_interval_secs: settings.cleanup_interval_secs,
        }
    }
}

/// Login grant identified by an opaque token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub session_id: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Session information for display (token truncated)
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub token_prefix: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_current: bool,
}

impl Session {
    /// Create a new session with a fresh random token
    ///
    /// Fails with `InvalidData` when the TTL pushes the expiry out of range.
    pub fn new(user_id: Uuid, config: &SessionConfig) -> Result<Self, StorageError> {
        let now = Utc::now();
        let expires_at = Duration::try_seconds(config.ttl_secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                StorageError::InvalidData(format!(
                    "Session ttl of {}s is out of range",
                    config.ttl_secs
                ))
            })?;

        Ok(Self {
            session_id: generate_token(),
            user_id,
            created_at: now,
            expires_at,
        })
    }

    /// A session is live strictly before its expiry instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn to_info(&self, current_session_id: Option<&str>) -> SessionInfo {
        SessionInfo {
            token_prefix: self.session_id.chars().take(8).collect(),
            created_at: self.created_at,
            expires_at: self.expires_at,
            is_current: current_session_id == Some(self.session_id.as_str()),
        }
    }
}

/// Generate an unguessable URL-safe session token from the OS RNG
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

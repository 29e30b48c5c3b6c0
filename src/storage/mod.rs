// Storage backend abstraction
// Pluggable persistence for the user registry

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::User;

pub use memory::MemoryUserStorage;

/// Storage errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Item not found")]
    NotFound,
    #[error("Item already exists")]
    AlreadyExists,
    #[error("Connection error: {0}")]
    ConnectionError(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Trait for user registry backends
///
/// Email lookups are exact and case-sensitive.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Insert a new user; fails with `AlreadyExists` when the email is taken
    async fn create_user(&self, user: User) -> Result<(), StorageError>;

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StorageError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// All users, oldest first
    async fn list_users(&self) -> Result<Vec<User>, StorageError>;

    /// Replace an existing user; fails with `NotFound` when absent
    async fn update_user(&self, user: User) -> Result<(), StorageError>;

    /// Remove a user, returning whether it existed
    async fn delete_user(&self, user_id: Uuid) -> Result<bool, StorageError>;
}

// In-memory user registry
// Users and the email index live behind a single lock so they never disagree

use super::{StorageError, UserStorage};
use crate::models::User;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Default)]
struct Registry {
    users: HashMap<Uuid, User>,
    email_index: HashMap<String, Uuid>,
}

/// In-memory user storage backend
pub struct MemoryUserStorage {
    registry: Arc<RwLock<Registry>>,
}

impl MemoryUserStorage {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
        }
    }
}

impl Default for MemoryUserStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStorage for MemoryUserStorage {
    async fn create_user(&self, user: User) -> Result<(), StorageError> {
        let mut registry = self.registry.write().await;

        if registry.email_index.contains_key(&user.email) || registry.users.contains_key(&user.id)
        {
            return Err(StorageError::AlreadyExists);
        }

        info!("Creating user {} ({}) with role {}", user.id, user.email, user.role);
        registry.email_index.insert(user.email.clone(), user.id);
        registry.users.insert(user.id, user);
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StorageError> {
        let registry = self.registry.read().await;
        Ok(registry.users.get(&user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let registry = self.registry.read().await;
        Ok(registry
            .email_index
            .get(email)
            .and_then(|id| registry.users.get(id))
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let registry = self.registry.read().await;
        let mut users: Vec<User> = registry.users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn update_user(&self, mut user: User) -> Result<(), StorageError> {
        let mut registry = self.registry.write().await;

        let existing_email = match registry.users.get(&user.id) {
            Some(existing) => existing.email.clone(),
            None => return Err(StorageError::NotFound),
        };

        if existing_email != user.email {
            if registry.email_index.contains_key(&user.email) {
                return Err(StorageError::AlreadyExists);
            }
            registry.email_index.remove(&existing_email);
            registry.email_index.insert(user.email.clone(), user.id);
        }

        user.updated_at = Utc::now();
        debug!("Updated user {}", user.id);
        registry.users.insert(user.id, user);
        Ok(())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, StorageError> {
        let mut registry = self.registry.write().await;

        match registry.users.remove(&user_id) {
            Some(user) => {
                registry.email_index.remove(&user.email);
                info!("Deleted user {} ({})", user_id, user.email);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn user(email: &str) -> User {
        User::new(
            "Test".to_string(),
            email.to_string(),
            "hash".to_string(),
            UserRole::User,
        )
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let storage = MemoryUserStorage::new();
        let user = user("a@x.com");
        let id = user.id;

        storage.create_user(user).await.unwrap();

        let by_id = storage.get_user(id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");

        let by_email = storage.get_user_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let storage = MemoryUserStorage::new();
        storage.create_user(user("a@x.com")).await.unwrap();

        let result = storage.create_user(user("a@x.com")).await;
        assert_eq!(result, Err(StorageError::AlreadyExists));
        assert_eq!(storage.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let storage = MemoryUserStorage::new();
        storage.create_user(user("a@x.com")).await.unwrap();

        assert!(storage.get_user_by_email("A@X.com").await.unwrap().is_none());
        // A differently-cased address is a distinct account
        storage.create_user(user("A@x.com")).await.unwrap();
        assert_eq!(storage.list_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_user_role() {
        let storage = MemoryUserStorage::new();
        let mut user = user("a@x.com");
        storage.create_user(user.clone()).await.unwrap();

        user.role = UserRole::Editor;
        storage.update_user(user.clone()).await.unwrap();

        let updated = storage.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(updated.role, UserRole::Editor);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_update_user_email_moves_index() {
        let storage = MemoryUserStorage::new();
        let mut user = user("old@x.com");
        storage.create_user(user.clone()).await.unwrap();

        user.email = "new@x.com".to_string();
        storage.update_user(user).await.unwrap();

        assert!(storage.get_user_by_email("old@x.com").await.unwrap().is_none());
        assert!(storage.get_user_by_email("new@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let storage = MemoryUserStorage::new();
        let result = storage.update_user(user("ghost@x.com")).await;
        assert_eq!(result, Err(StorageError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let storage = MemoryUserStorage::new();
        let user = user("a@x.com");
        let id = user.id;
        storage.create_user(user).await.unwrap();

        assert!(storage.delete_user(id).await.unwrap());
        assert!(!storage.delete_user(id).await.unwrap());
        assert!(storage.get_user_by_email("a@x.com").await.unwrap().is_none());
    }
}

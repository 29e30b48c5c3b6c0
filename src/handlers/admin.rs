// User management for dashboard admins
// Every route here sits behind auth_middleware + require_admin

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::AuthError;
use crate::middleware::auth::CurrentUser;
use crate::models::{CreateUserRequest, UpdateRoleRequest, UserInfo};
use crate::storage::StorageError;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<UserInfo>>, AuthError> {
    debug!("Admin {} listing users", current.user.id);

    let users: Vec<UserInfo> = state
        .gateway
        .users()
        .list_users()
        .await?
        .into_iter()
        .map(UserInfo::from)
        .collect();

    Ok(Json(users))
}

/// GET /api/admin/users/:user_id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserInfo>, AuthError> {
    let user = state
        .gateway
        .users()
        .get_user(user_id)
        .await?
        .ok_or_else(|| AuthError::NotFound(format!("User '{}'", user_id)))?;

    Ok(Json(user.into()))
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    request: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserInfo>), AuthError> {
    let Json(request) = request?;
    let user = state
        .gateway
        .register_user(&request.name, &request.email, &request.password, request.role)
        .await?;

    info!(
        "Admin {} created user {} with role {}",
        current.user.id, user.id, user.role
    );
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/admin/users/:user_id/role
pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    request: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> Result<Json<UserInfo>, AuthError> {
    let Json(request) = request?;
    let users = state.gateway.users();

    let mut user = users
        .get_user(user_id)
        .await?
        .ok_or_else(|| AuthError::NotFound(format!("User '{}'", user_id)))?;

    let previous = user.role;
    user.role = request.role;
    match users.update_user(user.clone()).await {
        Ok(()) => {}
        // Deleted between the read and the write
        Err(StorageError::NotFound) => {
            return Err(AuthError::NotFound(format!("User '{}'", user_id)));
        }
        Err(e) => return Err(e.into()),
    }

    info!(
        "Admin {} changed role of {} from {} to {}",
        current.user.id, user_id, previous, request.role
    );
    Ok(Json(user.into()))
}

/// DELETE /api/admin/users/:user_id
///
/// Admins cannot delete their own account. The user's sessions go with it.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AuthError> {
    if user_id == current.user.id {
        warn!("Admin {} attempted to delete their own account", user_id);
        return Err(AuthError::SelfDeletion);
    }

    if !state.gateway.users().delete_user(user_id).await? {
        return Err(AuthError::NotFound(format!("User '{}'", user_id)));
    }

    match state.sessions().delete_user_sessions(user_id).await {
        Ok(count) => debug!("Removed {} sessions of deleted user {}", count, user_id),
        // The user is gone, so any leftover session already fails to resolve
        Err(e) => warn!("Failed to remove sessions of deleted user {}: {}", user_id, e),
    }

    info!("Admin {} deleted user {}", current.user.id, user_id);
    Ok(Json(json!({
        "success": true,
        "deleted": user_id,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppConfig, MIN_BCRYPT_COST, User, UserRole};
    use crate::session::MemorySessionStorage;
    use crate::storage::{MemoryUserStorage, UserStorage};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Loses every user right before it is written back
    struct VanishingUserStorage {
        inner: MemoryUserStorage,
    }

    #[async_trait]
    impl UserStorage for VanishingUserStorage {
        async fn create_user(&self, user: User) -> Result<(), StorageError> {
            self.inner.create_user(user).await
        }

        async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StorageError> {
            self.inner.get_user(user_id).await
        }

        async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
            self.inner.get_user_by_email(email).await
        }

        async fn list_users(&self) -> Result<Vec<User>, StorageError> {
            self.inner.list_users().await
        }

        async fn update_user(&self, user: User) -> Result<(), StorageError> {
            self.inner.delete_user(user.id).await?;
            self.inner.update_user(user).await
        }

        async fn delete_user(&self, user_id: Uuid) -> Result<bool, StorageError> {
            self.inner.delete_user(user_id).await
        }
    }

    fn user(name: &str, email: &str, role: UserRole) -> User {
        User::new(name.to_string(), email.to_string(), "hash".to_string(), role)
    }

    #[tokio::test]
    async fn test_role_update_of_concurrently_deleted_user_is_not_found() {
        let inner = MemoryUserStorage::new();
        let target = user("Alice", "a@x.com", UserRole::User);
        inner.create_user(target.clone()).await.unwrap();

        let mut config = AppConfig::default();
        config.auth.bcrypt_cost = MIN_BCRYPT_COST;
        let state = AppState::with_storage(
            config,
            Arc::new(VanishingUserStorage { inner }),
            Arc::new(MemorySessionStorage::new()),
        )
        .unwrap();

        let admin = CurrentUser {
            user: user("Admin", "admin@x.com", UserRole::Admin).into(),
            session_id: "admin-session".to_string(),
        };

        let result = update_user_role(
            State(state),
            Extension(admin),
            Path(target.id),
            Ok(Json(UpdateRoleRequest {
                role: UserRole::Editor,
            })),
        )
        .await;

        let Err(error) = result else {
            panic!("updating a vanished user must fail");
        };
        assert!(matches!(error, AuthError::NotFound(_)));
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }
}

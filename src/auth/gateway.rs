// Auth gateway
// Bridges the session cookie to the session manager and the user registry

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use super::error::AuthError;
use super::password::{hash_password, verify_password};
use crate::models::{AppConfig, User, UserInfo, UserRole};
use crate::session::{Session, SessionManager};
use crate::storage::{StorageError, UserStorage};

/// Gateway settings derived from the application config
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub cookie_name: String,
    /// Emit the `Secure` cookie attribute
    pub secure_cookies: bool,
    pub bcrypt_cost: u32,
    pub min_password_length: usize,
}

impl From<&AppConfig> for GatewayConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            cookie_name: config.session.cookie_name.clone(),
            secure_cookies: config.secure_cookies(),
            bcrypt_cost: config.auth.bcrypt_cost,
            min_password_length: config.auth.min_password_length,
        }
    }
}

/// A request resolved to a live session and its user
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: UserInfo,
    pub session: Session,
}

/// True iff `role` is one of `allowed`
pub fn role_matches(role: UserRole, allowed: &[UserRole]) -> bool {
    allowed.contains(&role)
}

pub struct AuthGateway {
    sessions: Arc<SessionManager>,
    users: Arc<dyn UserStorage>,
    config: GatewayConfig,
    /// Verified against when the email is unknown so both login failures cost the same
    dummy_hash: String,
}

impl AuthGateway {
    pub fn new(
        sessions: Arc<SessionManager>,
        users: Arc<dyn UserStorage>,
        config: GatewayConfig,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hash_password("dummy-password-for-timing", config.bcrypt_cost)
            .map_err(AuthError::Internal)?;

        Ok(Self {
            sessions,
            users,
            config,
            dummy_hash,
        })
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn users(&self) -> &Arc<dyn UserStorage> {
        &self.users
    }

    /// Session token carried by the request, if any
    pub fn session_token<'a>(&self, jar: &'a CookieJar) -> Option<&'a str> {
        jar.get(&self.config.cookie_name)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
    }

    /// Resolve the request cookie to a live session and user
    ///
    /// Store faults are logged and treated as unauthenticated.
    pub async fn resolve(&self, jar: &CookieJar) -> Option<Authenticated> {
        let token = self.session_token(jar)?;

        match self.try_resolve(token).await {
            Ok(authenticated) => authenticated,
            Err(e) => {
                error!("Failed to resolve session: {}", e);
                None
            }
        }
    }

    async fn try_resolve(&self, token: &str) -> Result<Option<Authenticated>, StorageError> {
        let Some(session) = self.sessions.get_session(token).await? else {
            debug!("No live session for presented token");
            return Ok(None);
        };

        match self.users.get_user(session.user_id).await? {
            Some(user) => Ok(Some(Authenticated {
                user: user.into(),
                session,
            })),
            None => {
                warn!("Session references missing user {}", session.user_id);
                Ok(None)
            }
        }
    }

    /// The signed-in user without credentials, or `None`
    pub async fn current_user(&self, jar: &CookieJar) -> Option<UserInfo> {
        self.resolve(jar).await.map(|auth| auth.user)
    }

    pub async fn is_authenticated(&self, jar: &CookieJar) -> bool {
        self.current_user(jar).await.is_some()
    }

    pub async fn has_role(&self, jar: &CookieJar, role: UserRole) -> bool {
        self.has_any_role(jar, &[role]).await
    }

    /// False when unauthenticated; otherwise whether the user's role is in `roles`
    pub async fn has_any_role(&self, jar: &CookieJar, roles: &[UserRole]) -> bool {
        match self.current_user(jar).await {
            Some(user) => role_matches(user.role, roles),
            None => false,
        }
    }

    /// Check an email/password pair against the registry
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.users.get_user_by_email(email).await?;

        let password_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };

        let matches = self.verify(password, password_hash).await?;

        match user {
            Some(user) if matches => Ok(user),
            _ => {
                warn!("Rejected login attempt for {}", email);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Authenticate, open a session and attach the session cookie to `jar`
    pub async fn login(
        &self,
        jar: CookieJar,
        email: &str,
        password: &str,
    ) -> Result<(CookieJar, Session, UserInfo), AuthError> {
        let user = self.authenticate(email, password).await?;
        let session = self.sessions.create_session(user.id).await?;
        let cookie = match self.session_cookie(&session) {
            Ok(cookie) => cookie,
            Err(e) => {
                // No cookie goes out, so the session must not outlive this call
                if let Err(delete_err) = self.sessions.delete_session(&session.session_id).await {
                    error!("Failed to discard uncookied session: {}", delete_err);
                }
                return Err(e);
            }
        };

        info!("User {} logged in", user.id);

        Ok((jar.add(cookie), session, user.into()))
    }

    /// Drop the server-side session (if any) and clear the cookie
    pub async fn logout(&self, jar: CookieJar) -> CookieJar {
        if let Some(token) = self.session_token(&jar) {
            match self.sessions.delete_session(token).await {
                Ok(()) => info!("Session logged out"),
                Err(e) => error!("Failed to delete session on logout: {}", e),
            }
        }

        jar.add(self.removal_cookie())
    }

    /// Validate and store a new account
    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<UserInfo, AuthError> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Name, email, and password are required".to_string(),
            ));
        }

        if !email.contains('@') {
            return Err(AuthError::Validation("Email address is invalid".to_string()));
        }

        if password.chars().count() < self.config.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters long",
                self.config.min_password_length
            )));
        }

        let password_hash = self.hash(password).await?;
        let user = User::new(name.to_string(), email.to_string(), password_hash, role);

        match self.users.create_user(user.clone()).await {
            Ok(()) => Ok(user.into()),
            Err(StorageError::AlreadyExists) => Err(AuthError::Conflict(
                "Email already registered".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub fn session_cookie(&self, session: &Session) -> Result<Cookie<'static>, AuthError> {
        let expires = OffsetDateTime::from_unix_timestamp(session.expires_at.timestamp())
            .map_err(|e| AuthError::Internal(format!("Invalid session expiry: {}", e)))?;

        let mut cookie = self.base_cookie(session.session_id.clone());
        cookie.set_expires(expires);
        Ok(cookie)
    }

    /// Expired, empty cookie that makes the browser forget the session
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.base_cookie(String::new());
        cookie.make_removal();
        cookie
    }

    fn base_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.config.cookie_name.clone(), value))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.secure_cookies)
            .path("/")
            .build()
    }

    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let cost = self.config.bcrypt_cost;

        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(AuthError::Internal)
    }

    async fn verify(&self, password: &str, password_hash: String) -> Result<bool, AuthError> {
        let password = password.to_string();

        tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Verification task failed: {}", e)))?
            .map_err(AuthError::Internal)
    }
}

use serde::{Deserialize, Serialize};

use super::user::UserRole;

/// Cost bounds accepted by bcrypt
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Ten years; keeps expiry timestamps representable in cookies
pub const MAX_SESSION_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment (drives the `Secure` cookie attribute)
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub routes: RouteSettings,
    /// Accounts created at startup (e.g. the first dashboard admin)
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Name of the cookie carrying the session token
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Session lifetime in seconds (default: 7 days)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: i64,
    /// How often expired sessions are swept from the store
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_secs: default_ttl_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

fn default_cookie_name() -> String {
    "test-session".to_string()
}

fn default_ttl_secs() -> i64 {
    7 * 24 * 60 * 60
}

fn default_cleanup_interval_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// bcrypt work factor
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    /// Whether `POST /api/auth/register` is open to the public
    #[serde(default = "default_allow_registration")]
    pub allow_registration: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            bcrypt_cost: default_bcrypt_cost(),
            min_password_length: default_min_password_length(),
            allow_registration: default_allow_registration(),
        }
    }
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_min_password_length() -> usize {
    8
}

fn default_allow_registration() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSettings {
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Where an already signed-in visitor of the login page is sent
    #[serde(default = "default_home_path")]
    pub home_path: String,
    /// Path prefixes that require a valid session
    #[serde(default = "default_protected_prefixes")]
    pub protected_prefixes: Vec<String>,
    /// Query parameter carrying the originally requested path
    #[serde(default = "default_return_param")]
    pub return_param: String,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            home_path: default_home_path(),
            protected_prefixes: default_protected_prefixes(),
            return_param: default_return_param(),
        }
    }
}

impl RouteSettings {
    /// Whether `path` falls under one of the protected prefixes
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| path_has_prefix(path, prefix))
    }
}

/// Segment-aware prefix match: `/dashboard` covers `/dashboard/posts` but not `/dashboards`
fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }

    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_home_path() -> String {
    "/dashboard".to_string()
}

fn default_protected_prefixes() -> Vec<String> {
    vec!["/dashboard".to_string()]
}

fn default_return_param() -> String {
    "from".to_string()
}

/// Bootstrap account; the password is hashed before it reaches the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_seed_role")]
    pub role: UserRole,
}

fn default_seed_role() -> UserRole {
    UserRole::Admin
}

impl AppConfig {
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.session.cookie_name.trim().is_empty() {
            return Err("Session cookie_name must not be empty".to_string());
        }

        if self.session.ttl_secs <= 0 {
            return Err("Session ttl_secs must be positive".to_string());
        }

        if self.session.ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(format!(
                "Session ttl_secs must not exceed {}",
                MAX_SESSION_TTL_SECS
            ));
        }

        if self.session.cleanup_interval_secs == 0 {
            return Err("Session cleanup_interval_secs must be positive".to_string());
        }

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.auth.bcrypt_cost) {
            return Err(format!(
                "bcrypt_cost must be between {} and {}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST
            ));
        }

        for path in [&self.routes.login_path, &self.routes.home_path] {
            if !path.starts_with('/') {
                return Err(format!("Route '{}' must start with '/'", path));
            }
        }

        if self.routes.login_path == self.routes.home_path {
            return Err("login_path and home_path must differ".to_string());
        }

        for prefix in &self.routes.protected_prefixes {
            if !prefix.starts_with('/') {
                return Err(format!("Protected prefix '{}' must start with '/'", prefix));
            }
            if path_has_prefix(&self.routes.login_path, prefix) {
                return Err(format!(
                    "Login path '{}' cannot be under protected prefix '{}'",
                    self.routes.login_path, prefix
                ));
            }
        }

        for user in &self.users {
            if user.email.is_empty() || user.password.is_empty() {
                return Err(format!(
                    "Seed user '{}' must have an email and a password",
                    user.name
                ));
            }
        }

        Ok(())
    }
}

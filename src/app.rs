// Application state and router assembly

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tracing::info;

use crate::auth::{AuthError, AuthGateway, GatewayConfig};
use crate::handlers;
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::middleware::route_guard::route_guard;
use crate::models::AppConfig;
use crate::session::{MemorySessionStorage, SessionConfig, SessionManager, SessionStorage};
use crate::storage::{MemoryUserStorage, UserStorage};

/// State shared by every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<AuthGateway>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state backed by the in-memory stores
    pub fn new(config: AppConfig) -> Result<Self, AuthError> {
        Self::with_storage(
            config,
            Arc::new(MemoryUserStorage::new()),
            Arc::new(MemorySessionStorage::new()),
        )
    }

    pub fn with_storage(
        config: AppConfig,
        users: Arc<dyn UserStorage>,
        session_storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, AuthError> {
        let sessions = Arc::new(SessionManager::new(
            session_storage,
            SessionConfig::from(&config.session),
        ));
        let gateway = AuthGateway::new(sessions, users, GatewayConfig::from(&config))?;

        Ok(Self {
            gateway: Arc::new(gateway),
            config: Arc::new(config),
        })
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        self.gateway.sessions()
    }

    /// Create the bootstrap accounts listed in the config
    ///
    /// Accounts whose email is already registered are skipped.
    pub async fn seed_users(&self) -> Result<usize, AuthError> {
        let mut created = 0;

        for seed in &self.config.users {
            match self
                .gateway
                .register_user(&seed.name, &seed.email, &seed.password, seed.role)
                .await
            {
                Ok(user) => {
                    info!("Seeded {} account {}", user.role, user.email);
                    created += 1;
                }
                Err(AuthError::Conflict(_)) => {
                    info!("Seed account {} already exists", seed.email);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(created)
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route(
            "/api/admin/users",
            get(handlers::admin::list_users).post(handlers::admin::create_user),
        )
        .route(
            "/api/admin/users/:user_id",
            get(handlers::admin::get_user).delete(handlers::admin::delete_user),
        )
        .route(
            "/api/admin/users/:user_id/role",
            put(handlers::admin::update_user_role),
        )
        // Layers run bottom-up: authenticate first, then check the role
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let account_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/sessions", get(handlers::auth::list_sessions))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let login_path = state.config.routes.login_path.clone();
    let home_path = state.config.routes.home_path.clone();

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/register", post(handlers::auth::register))
        .route(&login_path, get(handlers::pages::login_page))
        .route(&home_path, get(handlers::pages::dashboard_page))
        .merge(account_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .with_state(state)
}

pub mod auth;
pub mod route_guard;

pub use auth::{CurrentUser, auth_middleware, require_admin};
pub use route_guard::{login_redirect_target, route_guard};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::app::AppState;
use crate::auth::{AuthError, role_matches};
use crate::models::{UserInfo, UserRole};

// Extension to store the resolved user in the request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: UserInfo,
    pub session_id: String,
}

/// Resolve the session cookie or reject with 401
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let authenticated = state
        .gateway
        .resolve(&jar)
        .await
        .ok_or(AuthError::Unauthenticated)?;

    request.extensions_mut().insert(CurrentUser {
        user: authenticated.user,
        session_id: authenticated.session.session_id,
    });

    Ok(next.run(request).await)
}

/// Reject callers whose role is not in `allowed`
fn require_role(request: &Request, allowed: &[UserRole]) -> Result<(), AuthError> {
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AuthError::Unauthenticated)?;

    if !role_matches(current.user.role, allowed) {
        warn!(
            "User {} with role {} denied access to {}",
            current.user.id,
            current.user.role,
            request.uri().path()
        );
        return Err(AuthError::Forbidden);
    }

    Ok(())
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, AuthError> {
    require_role(&request, &[UserRole::Admin])?;
    Ok(next.run(request).await)
}

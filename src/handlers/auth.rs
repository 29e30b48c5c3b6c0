use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{Value, json};
use tracing::info;

use crate::app::AppState;
use crate::auth::AuthError;
use crate::middleware::auth::CurrentUser;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, UserInfo, UserRole};
use crate::session::SessionInfo;

/// POST /api/auth/login
///
/// Sets the session cookie on success; a failed attempt sets no cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), AuthError> {
    let Json(payload) = payload?;
    let (jar, _session, user) = state
        .gateway
        .login(jar, &payload.email, &payload.password)
        .await?;

    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            user,
        }),
    ))
}

/// POST /api/auth/logout
///
/// Always succeeds, whether or not a session existed.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = state.gateway.logout(jar).await;
    (jar, Json(json!({ "success": true })))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserInfo>), AuthError> {
    if !state.config.auth.allow_registration {
        return Err(AuthError::RegistrationDisabled);
    }
    let Json(payload) = payload?;

    let user = state
        .gateway
        .register_user(
            &payload.name,
            &payload.email,
            &payload.password,
            UserRole::User,
        )
        .await?;

    info!("User registered: {}", user.email);
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/auth/me
pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<UserInfo> {
    Json(current.user)
}

/// GET /api/auth/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<SessionInfo>>, AuthError> {
    let sessions = state
        .sessions()
        .get_user_sessions(current.user.id, Some(&current.session_id))
        .await?;

    Ok(Json(sessions))
}

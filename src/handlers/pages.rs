// Minimal pages for the guarded area
// Real page rendering happens elsewhere; these only anchor the login/dashboard routes

use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::app::AppState;
use crate::auth::AuthError;
use crate::templates::{DashboardTemplate, LoginTemplate, render};

/// GET /login
pub async fn login_page() -> Result<Html<String>, AuthError> {
    render(&LoginTemplate::new())
}

/// GET /dashboard
pub async fn dashboard_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    match state.gateway.current_user(&jar).await {
        Some(user) => render(&DashboardTemplate::new(&user)).into_response(),
        // The session can lapse between the route guard and here
        None => Redirect::temporary(&state.config.routes.login_path).into_response(),
    }
}

// Page-level route protection
// Resolves the session fully; an expired or forged cookie is treated as no cookie

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::app::AppState;
use crate::models::RouteSettings;

/// Login URL carrying the originally requested location
pub fn login_redirect_target(routes: &RouteSettings, requested: &str) -> String {
    format!(
        "{}?{}={}",
        routes.login_path,
        routes.return_param,
        urlencoding::encode(requested)
    )
}

pub async fn route_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let routes = &state.config.routes;
    let path = request.uri().path().to_string();

    if routes.is_protected(&path) {
        if !state.gateway.is_authenticated(&jar).await {
            let requested = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or(path);

            debug!("Redirecting unauthenticated request for {} to login", requested);
            return Redirect::temporary(&login_redirect_target(routes, &requested))
                .into_response();
        }
    } else if path == routes.login_path && state.gateway.is_authenticated(&jar).await {
        debug!("Signed-in visitor on login page, redirecting to {}", routes.home_path);
        return Redirect::temporary(&routes.home_path).into_response();
    }

    next.run(request).await
}

use cms_auth::{AppState, build_router, config};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cms_auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let app_config = config::load_config_with_fallback()?;
    let addr: SocketAddr =
        format!("{}:{}", app_config.server.host, app_config.server.port).parse()?;

    let state = AppState::new(app_config)?;

    let seeded = state.seed_users().await?;
    if seeded > 0 {
        tracing::info!("Seeded {} account(s) from configuration", seeded);
    }

    state.sessions().clone().start_cleanup_task();

    let app = build_router(state.clone())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Starting cms-auth server on {}", addr);
    tracing::info!(
        "Session cookie '{}', protected prefixes: {:?}",
        state.config.session.cookie_name,
        state.config.routes.protected_prefixes
    );
    if !state.config.secure_cookies() {
        tracing::warn!("Running in development mode: session cookies are not marked Secure");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

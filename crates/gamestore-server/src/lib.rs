pub mod api;
pub mod auth;
pub mod collection;
pub mod config;
pub mod error;
pub mod health;
pub mod login;
pub mod rate_limit;
pub mod sessions;
pub mod sse;
pub mod state;

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use gamestore_core::net::protocol::{API_PREFIX, SNAPSHOT_STREAM_PATH};

use config::ServerConfig;
use state::AppState;

/// How often expired sessions and idle rate-limit buckets are dropped.
const REAPER_INTERVAL: Duration = Duration::from_secs(60);

/// Build the Axum router and application state from a config.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    let web_root = config.web_root.clone();
    let timeout = Duration::from_secs(config.limits.request_timeout_secs);
    let state = AppState::new(config);

    // Mutating game routes authenticate through the `AuthUser` extractor.
    let api_routes = Router::new()
        .route("/games", get(api::list_games).post(api::create_game))
        .route(SNAPSHOT_STREAM_PATH, get(sse::snapshot_stream))
        .route(
            "/games/{id}",
            get(api::get_game)
                .put(api::update_game)
                .delete(api::delete_game),
        )
        .route("/auth/sign-in", post(login::sign_in))
        .route("/auth/sign-out", post(login::sign_out))
        .route("/auth/session", get(login::current_session))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest(API_PREFIX, api_routes)
        .fallback_service(ServeDir::new(&web_root))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}

/// Background task that drops expired sessions and forgets idle sign-in
/// rate-limit buckets.
pub fn spawn_session_reaper(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(REAPER_INTERVAL);
        loop {
            interval.tick().await;
            let purged = state.sessions.write().await.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, "Expired sessions purged");
            }
            state.sign_in_limiter.cleanup(REAPER_INTERVAL * 10).await;
        }
    });
}

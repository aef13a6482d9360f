use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Structured health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub catalog: CatalogInfo,
    pub sse_subscribers: usize,
    pub active_sessions: usize,
}

#[derive(Serialize)]
pub struct CatalogInfo {
    pub games: usize,
    pub version: u64,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let sse_subscribers = state.sse_subscriber_count.load(Ordering::Relaxed);
    let catalog = {
        let games = state.games.read().await;
        CatalogInfo {
            games: games.len(),
            version: games.version(),
        }
    };
    let active_sessions = state.sessions.read().await.len();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        catalog,
        sse_subscribers,
        active_sessions,
    })
}

/// GET /ready: the storefront works without admins, but the admin panel
/// is unusable until at least one account is configured.
pub async fn readiness_check(State(state): State<AppState>) -> &'static str {
    if state.accounts.is_empty() {
        return "not ready: no admin accounts configured";
    }
    "ready"
}

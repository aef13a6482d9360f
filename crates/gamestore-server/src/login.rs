use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequest, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;

use gamestore_core::net::messages::{SessionResponse, SignInRequest, SignInResponse};

use crate::auth::{INVALID_CREDENTIALS, bearer_token};
use crate::error::AppError;
use crate::rate_limit::RateDecision;
use crate::state::AppState;

/// POST /api/v1/auth/sign-in: exchange email/password for a session token.
pub async fn sign_in(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<SignInResponse>, AppError> {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

    if let RateDecision::Limited(wait) = state.sign_in_limiter.check(ip).await {
        tracing::warn!(%ip, "sign-in rate limit reached");
        let message = match wait {
            Some(wait) => format!(
                "too many sign-in attempts, try again in {}s",
                wait.as_secs().max(1)
            ),
            None => "too many sign-in attempts".to_string(),
        };
        return Err(AppError::TooManyRequests(message));
    }

    let Json(body) = Json::<SignInRequest>::from_request(request, &state)
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;

    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let Some(user) = state.accounts.authenticate(&body.email, &body.password) else {
        tracing::info!(%ip, "sign-in rejected");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let token = state.sessions.write().await.create(user.clone());
    tracing::info!(email = %user.email, "admin signed in");
    Ok(Json(SignInResponse { token, user }))
}

/// POST /api/v1/auth/sign-out: revoke the caller's token. Always 204, so
/// signing out twice is harmless.
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers)
        && state.sessions.write().await.revoke(token)
    {
        tracing::info!("admin signed out");
    }
    StatusCode::NO_CONTENT
}

/// GET /api/v1/auth/session: who the caller's token belongs to, if anyone.
pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<SessionResponse> {
    let user = match bearer_token(&headers) {
        Some(token) => state.sessions.write().await.resolve(token),
        None => None,
    };
    Json(SessionResponse { user })
}

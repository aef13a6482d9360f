use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use gamestore_core::game::{GameDoc, GameFields};
use gamestore_core::net::messages::InsertResponse;
use gamestore_core::snapshot::Snapshot;

use crate::auth::AuthUser;
use crate::collection::CollectionError;
use crate::error::AppError;
use crate::state::AppState;

fn validate(fields: &GameFields) -> Result<(), AppError> {
    fields
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// GET /api/v1/games: the full collection in backend order.
pub async fn list_games(State(state): State<AppState>) -> Json<Snapshot> {
    let games = state.games.read().await;
    Json(games.snapshot())
}

/// GET /api/v1/games/{id}
pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameDoc>, AppError> {
    let games = state.games.read().await;
    games
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Game {id} not found")))
}

/// POST /api/v1/games: insert a new game; the id is assigned here.
pub async fn create_game(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(fields): Json<GameFields>,
) -> Result<(StatusCode, Json<InsertResponse>), AppError> {
    validate(&fields)?;
    let mut games = state.games.write().await;
    let id = games.insert(fields).map_err(|e| match e {
        CollectionError::Full(_) => AppError::Conflict(e.to_string()),
    })?;
    tracing::info!(game_id = %id, by = %user.email, "game created");
    Ok((StatusCode::CREATED, Json(InsertResponse { id })))
}

/// PUT /api/v1/games/{id}: replace the four mutable fields.
pub async fn update_game(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(fields): Json<GameFields>,
) -> Result<Json<GameDoc>, AppError> {
    validate(&fields)?;
    let mut games = state.games.write().await;
    if !games.update(&id, fields) {
        return Err(AppError::NotFound(format!("Game {id} not found")));
    }
    tracing::info!(game_id = %id, by = %user.email, "game updated");
    games
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Game {id} not found")))
}

/// DELETE /api/v1/games/{id}
pub async fn delete_game(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut games = state.games.write().await;
    if !games.delete(&id) {
        return Err(AppError::NotFound(format!("Game {id} not found")));
    }
    tracing::info!(game_id = %id, by = %user.email, "game deleted");
    Ok(StatusCode::NO_CONTENT)
}

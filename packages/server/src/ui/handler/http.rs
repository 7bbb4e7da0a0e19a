//! HTTP API endpoint handlers (read-only, for operators).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{
        GameDetailResponse, GameSummary, GamesResponse, HealthResponse, LobbyResponse,
    },
    ui::state::AppState,
    usecase::GetGameError,
};

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = state.get_server_status_usecase.execute().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        connections: status.connections,
        waiting: status.waiting,
        games: status.games,
    })
}

/// Waiting players of the lobby
pub async fn get_lobby(State(state): State<Arc<AppState>>) -> Json<LobbyResponse> {
    let snapshot = state.get_lobby_state_usecase.execute().await;
    // Domain Model から DTO への変換
    Json(snapshot.into())
}

/// Get list of running games
pub async fn get_games(State(state): State<Arc<AppState>>) -> Json<GamesResponse> {
    let views = state.get_games_usecase.execute().await;
    Json(GamesResponse {
        games: views.iter().map(GameSummary::from).collect(),
    })
}

/// Get game detail by ID
pub async fn get_game_detail(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<GameDetailResponse>, StatusCode> {
    match state.get_games_usecase.find(game_id).await {
        Ok(view) => Ok(Json(view.into())),
        Err(GetGameError::GameNotFound) => Err(StatusCode::NOT_FOUND),
    }
}

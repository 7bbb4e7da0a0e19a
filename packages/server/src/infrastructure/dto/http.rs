//! HTTP API レスポンス DTO

use serde::{Deserialize, Serialize};

use super::websocket::PlayerState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub connections: usize,
    pub waiting: usize,
    pub games: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyResponse {
    pub room_id: String,
    pub capacity: usize,
    pub player_count: usize,
    pub players: Vec<WaitingPlayerDto>,
}

/// ロビーで待っている参加者（参加時刻は JST の RFC 3339）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingPlayerDto {
    pub connection_id: String,
    pub user_name: String,
    pub user_id: String,
    pub joined_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_id: String,
    pub phase: String,
    pub player_count: usize,
    pub current_turn_index: usize,
    pub word_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamesResponse {
    pub games: Vec<GameSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetailResponse {
    pub game_id: String,
    pub phase: String,
    pub players: Vec<PlayerState>,
    pub current_turn_index: usize,
    pub word_chain: Vec<String>,
    pub continuation_char: String,
    pub goal: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<usize>,
}

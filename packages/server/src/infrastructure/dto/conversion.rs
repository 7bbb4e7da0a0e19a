//! ドメインモデル → DTO の変換

use crate::domain::{
    GamePhase, GameStateView, LobbyEntry, LobbySnapshot, Player, RejectReason, TurnOutcome,
    Verdict,
};
use crate::infrastructure::dto::{http, websocket as dto};
use shiritori_shared::time::timestamp_to_jst_rfc3339;

impl From<LobbyEntry> for dto::LobbyPlayer {
    fn from(entry: LobbyEntry) -> Self {
        Self {
            connection_id: entry.connection_id.into_string(),
            user_name: entry.display_name,
            user_id: entry.external_user_id,
            joined_at: entry.joined_at,
        }
    }
}

impl From<LobbyEntry> for http::WaitingPlayerDto {
    fn from(entry: LobbyEntry) -> Self {
        Self {
            joined_at: timestamp_to_jst_rfc3339(entry.joined_at),
            connection_id: entry.connection_id.into_string(),
            user_name: entry.display_name,
            user_id: entry.external_user_id,
        }
    }
}

impl From<Player> for dto::PlayerState {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            turn_order: player.turn_order,
            connection_id: player.connection_id.into_string(),
            user_name: player.user_name,
            position: player.position,
        }
    }
}

/// ロビーの状態 → `playerUpdate`
impl From<LobbySnapshot> for dto::ServerMessage {
    fn from(snapshot: LobbySnapshot) -> Self {
        dto::ServerMessage::PlayerUpdate {
            room_id: snapshot.room_id.to_string(),
            player_count: snapshot.player_count(),
            capacity: snapshot.capacity,
            players: snapshot.entries.into_iter().map(Into::into).collect(),
        }
    }
}

/// 盤面 → `updateGameState`
impl From<GameStateView> for dto::ServerMessage {
    fn from(view: GameStateView) -> Self {
        dto::ServerMessage::UpdateGameState {
            room_id: view.game_id.to_string(),
            players: view.players.into_iter().map(Into::into).collect(),
            current_turn_index: view.current_turn_index,
            word_history: view.word_chain,
            last_character: view.continuation_char.to_string(),
            goal: view.goal,
        }
    }
}

/// 判定結果 → `checkResult`
impl From<&TurnOutcome> for dto::ServerMessage {
    fn from(outcome: &TurnOutcome) -> Self {
        let reason = match &outcome.verdict {
            Verdict::Accepted => None,
            Verdict::TimedOut => Some("timeUp".to_string()),
            Verdict::Rejected(reason) => Some(reject_reason_label(reason).to_string()),
        };
        dto::ServerMessage::CheckResult {
            valid: outcome.verdict.is_valid(),
            player_id: outcome.player_id,
            word: outcome.word.clone(),
            reason,
            game_over: outcome.winner.map(|_| true),
            winner: outcome.winner,
        }
    }
}

fn reject_reason_label(reason: &RejectReason) -> &'static str {
    match reason {
        RejectReason::Empty => "empty",
        RejectReason::AlreadyUsed => "alreadyUsed",
        RejectReason::ChainBroken { .. } => "chainBroken",
        RejectReason::EndsWithN => "endsWithN",
        RejectReason::TooShort => "tooShort",
        RejectReason::NotAWord => "notAWord",
    }
}

pub fn phase_label(phase: &GamePhase) -> &'static str {
    match phase {
        GamePhase::AwaitingPlayers => "awaitingPlayers",
        GamePhase::AwaitingMove => "awaitingMove",
        GamePhase::Resolving => "resolving",
        GamePhase::TurnAdvance { .. } => "turnAdvance",
        GamePhase::GameOver { .. } => "gameOver",
        GamePhase::TornDown => "tornDown",
    }
}

fn winner_of(phase: &GamePhase) -> Option<usize> {
    match phase {
        GamePhase::GameOver { winner } => Some(*winner),
        _ => None,
    }
}

impl From<&GameStateView> for http::GameSummary {
    fn from(view: &GameStateView) -> Self {
        Self {
            game_id: view.game_id.to_string(),
            phase: phase_label(&view.phase).to_string(),
            player_count: view.players.len(),
            current_turn_index: view.current_turn_index,
            word_count: view.word_chain.len(),
            winner: winner_of(&view.phase),
        }
    }
}

impl From<GameStateView> for http::GameDetailResponse {
    fn from(view: GameStateView) -> Self {
        Self {
            game_id: view.game_id.to_string(),
            phase: phase_label(&view.phase).to_string(),
            winner: winner_of(&view.phase),
            players: view.players.into_iter().map(Into::into).collect(),
            current_turn_index: view.current_turn_index,
            word_chain: view.word_chain,
            continuation_char: view.continuation_char.to_string(),
            goal: view.goal,
        }
    }
}

impl From<LobbySnapshot> for http::LobbyResponse {
    fn from(snapshot: LobbySnapshot) -> Self {
        Self {
            room_id: snapshot.room_id.to_string(),
            capacity: snapshot.capacity,
            player_count: snapshot.player_count(),
            players: snapshot.entries.into_iter().map(Into::into).collect(),
        }
    }
}

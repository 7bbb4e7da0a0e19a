//! WebSocket メッセージ DTO
//!
//! 1 メッセージ = 1 つの JSON オブジェクト。`type` フィールドで種類を判別する。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// クライアント → サーバー
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// ロビーへの参加、または試合開始後の着席
    Join {
        #[serde(default, alias = "order")]
        turn_order: Option<usize>,
        #[serde(default)]
        user_name: Option<String>,
        #[serde(default, deserialize_with = "string_or_number")]
        user_id: Option<String>,
    },
    CheckWord {
        word: String,
        player_id: usize,
    },
    TimeIsUp {
        order: usize,
    },
    StartRoulette,
    /// 入力途中の単語（他のプレイヤーの画面に反映する）
    InputWord {
        word: String,
    },
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// userId は文字列でも数値でも受け付ける
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// ロビーで待っている参加者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyPlayer {
    pub connection_id: String,
    pub user_name: String,
    pub user_id: String,
    pub joined_at: i64,
}

/// 試合開始時の参加者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayer {
    /// Declared では着席まで決まらない
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_order: Option<usize>,
    pub user_name: String,
    pub user_id: String,
}

/// 盤面上のプレイヤー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: usize,
    pub turn_order: usize,
    pub connection_id: String,
    pub user_name: String,
    pub position: usize,
}

/// サーバー → クライアント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    PlayerUpdate {
        room_id: String,
        player_count: usize,
        capacity: usize,
        players: Vec<LobbyPlayer>,
    },
    StartGame {
        room_id: String,
        turn_order_mode: String,
        /// 受信者自身のプレイヤー ID
        #[serde(skip_serializing_if = "Option::is_none")]
        player_id: Option<usize>,
        players: Vec<RosterPlayer>,
    },
    /// Declared での着席の確認（着席した本人にだけ送る）
    Seated {
        player_id: usize,
        turn_order: usize,
    },
    UpdateGameState {
        room_id: String,
        players: Vec<PlayerState>,
        current_turn_index: usize,
        word_history: Vec<String>,
        last_character: String,
        goal: usize,
    },
    CheckResult {
        valid: bool,
        player_id: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        word: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        game_over: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        winner: Option<usize>,
    },
    ResultMessage {
        body: String,
    },
    StartTurn {
        is_current_user_turn: bool,
        current_turn_index: usize,
    },
    RouletteResult {
        result: u8,
    },
    OverwriteWord {
        word: String,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

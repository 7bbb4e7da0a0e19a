//! Entities
//!
//! ロビーの待機エントリ、成立したロスター、ゲーム内のプレイヤー。

use serde::Serialize;

use super::{ConnectionId, GameId};

/// ゲーム内のプレイヤー
///
/// `turn_order` は手番の順序を表し、常にプレイヤー列の中での位置と一致する。
/// `position` は単調非減少で、`[0, goal]` に収まる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    /// 着席順に 0 から振られる ID（ゲーム中は不変）
    pub id: usize,
    pub turn_order: usize,
    pub connection_id: ConnectionId,
    pub user_name: String,
    pub position: usize,
}

impl Player {
    pub fn new(id: usize, turn_order: usize, connection_id: ConnectionId, user_name: String) -> Self {
        Self {
            id,
            turn_order,
            connection_id,
            user_name,
            position: 0,
        }
    }

    /// 駒を進める。ゴールを超えた分は切り捨てる。
    pub fn advance(&mut self, steps: usize, goal: usize) {
        self.position = self.position.saturating_add(steps).min(goal);
    }
}

/// ロビーで試合の成立を待っている参加者
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LobbyEntry {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub external_user_id: String,
    /// 参加時刻（JST, ミリ秒）
    pub joined_at: i64,
}

impl LobbyEntry {
    pub fn new(
        connection_id: ConnectionId,
        display_name: String,
        external_user_id: String,
        joined_at: i64,
    ) -> Self {
        Self {
            connection_id,
            display_name,
            external_user_id,
            joined_at,
        }
    }
}

/// ロビーで成立した参加者の組（不変）
///
/// エントリはロビーへの参加順（FIFO）に並ぶ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    game_id: GameId,
    entries: Vec<LobbyEntry>,
}

impl Roster {
    pub(crate) fn new(game_id: GameId, entries: Vec<LobbyEntry>) -> Self {
        Self { game_id, entries }
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn entries(&self) -> &[LobbyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.entries
            .iter()
            .map(|entry| entry.connection_id.clone())
            .collect()
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.entries
            .iter()
            .any(|entry| &entry.connection_id == connection_id)
    }
}

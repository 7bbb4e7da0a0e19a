//! Lobby: 試合成立までの待機列
//!
//! 参加者を FIFO で溜め、設定人数 N に達した瞬間に N 人分を取り出して
//! `Roster` を作り、自身は空に戻る。ロビーそのものは副作用を持たず、
//! 呼び出し側は返されたスナップショットを待機中の全接続に配信する。

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use super::{
    ConnectionId, DuplicateField, GameId, GameIdFactory, LobbyEntry, LobbyError, Roster,
};

/// ロビーの状態のスナップショット（`playerUpdate` の元データ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LobbySnapshot {
    pub room_id: GameId,
    pub capacity: usize,
    pub entries: Vec<LobbyEntry>,
}

impl LobbySnapshot {
    pub fn player_count(&self) -> usize {
        self.entries.len()
    }

    /// スナップショットを受け取るべき接続（スナップショット時点の待機者全員）
    pub fn audience(&self) -> Vec<ConnectionId> {
        self.entries
            .iter()
            .map(|entry| entry.connection_id.clone())
            .collect()
    }
}

/// 参加が受理されたときの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinAccepted {
    /// 参加直後（ロスター成立時はリセット前）の状態
    pub snapshot: LobbySnapshot,
    /// 定員に達した場合に成立したロスター
    pub roster: Option<Roster>,
}

/// 全接続で共有するロビー
pub type SharedLobby = Arc<Mutex<Lobby>>;

#[derive(Debug)]
pub struct Lobby {
    room_id: GameId,
    capacity: usize,
    entries: Vec<LobbyEntry>,
}

impl Lobby {
    /// 定員 `capacity` 人のロビーを作成（0 は 1 として扱う）
    pub fn new(capacity: usize) -> Self {
        Self {
            room_id: GameIdFactory::generate(),
            capacity: capacity.max(1),
            entries: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.entries
            .iter()
            .any(|entry| &entry.connection_id == connection_id)
    }

    pub fn snapshot(&self) -> LobbySnapshot {
        LobbySnapshot {
            room_id: self.room_id.clone(),
            capacity: self.capacity,
            entries: self.entries.clone(),
        }
    }

    /// 待機列に参加する。
    ///
    /// 同じ接続・表示名・外部ユーザー ID の待機者が既にいる場合は拒否し、状態は変えない。
    pub fn join(&mut self, entry: LobbyEntry) -> Result<JoinAccepted, LobbyError> {
        if let Some(field) = self.find_duplicate(&entry) {
            return Err(LobbyError::DuplicateIdentity(field));
        }

        self.entries.push(entry);
        let snapshot = self.snapshot();

        let roster = if self.entries.len() == self.capacity {
            Some(self.form_roster())
        } else {
            None
        };

        Ok(JoinAccepted { snapshot, roster })
    }

    /// 待機列から外れる。該当する接続がいなければ何もせず `None` を返す。
    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<LobbySnapshot> {
        let index = self
            .entries
            .iter()
            .position(|entry| &entry.connection_id == connection_id)?;
        self.entries.remove(index);
        Some(self.snapshot())
    }

    fn find_duplicate(&self, candidate: &LobbyEntry) -> Option<DuplicateField> {
        self.entries.iter().find_map(|entry| {
            if entry.connection_id == candidate.connection_id {
                Some(DuplicateField::Connection)
            } else if entry.display_name == candidate.display_name {
                Some(DuplicateField::UserName)
            } else if entry.external_user_id == candidate.external_user_id {
                Some(DuplicateField::UserId)
            } else {
                None
            }
        })
    }

    /// 待機者全員をロスターとして取り出し、新しい部屋 ID で空に戻る。
    fn form_roster(&mut self) -> Roster {
        let entries = std::mem::take(&mut self.entries);
        let game_id = std::mem::replace(&mut self.room_id, GameIdFactory::generate());
        Roster::new(game_id, entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(conn: &str, name: &str, user_id: &str) -> LobbyEntry {
        LobbyEntry::new(
            ConnectionId::new(conn.to_string()).unwrap(),
            name.to_string(),
            user_id.to_string(),
            1000,
        )
    }

    #[test]
    fn test_join_below_capacity_does_not_form_roster() {
        // テスト項目: 定員未満の参加ではロスターは成立しない
        // given (前提条件):
        let mut lobby = Lobby::new(2);

        // when (操作):
        let accepted = lobby.join(entry("c1", "alice", "1")).unwrap();

        // then (期待する結果):
        assert!(accepted.roster.is_none());
        assert_eq!(accepted.snapshot.player_count(), 1);
        assert_eq!(lobby.len(), 1);
    }

    #[test]
    fn test_join_reaching_capacity_forms_roster_in_fifo_order_and_resets() {
        // テスト項目: 定員に達するとロスターが参加順で成立し、ロビーは空になる
        // given (前提条件):
        let mut lobby = Lobby::new(2);
        let room_id = lobby.snapshot().room_id;
        lobby.join(entry("c1", "alice", "1")).unwrap();

        // when (操作):
        let accepted = lobby.join(entry("c2", "bob", "2")).unwrap();

        // then (期待する結果):
        let roster = accepted.roster.expect("roster should be formed");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.game_id(), &room_id);
        assert_eq!(roster.entries()[0].display_name, "alice");
        assert_eq!(roster.entries()[1].display_name, "bob");
        // 最後の playerUpdate は成立した 2 人に配信される
        assert_eq!(accepted.snapshot.player_count(), 2);
        assert!(lobby.is_empty());
        assert_ne!(lobby.snapshot().room_id, room_id);
    }

    #[test]
    fn test_join_rejects_duplicate_user_name() {
        // テスト項目: 同じ表示名での参加は拒否され、人数は変わらない
        // given (前提条件):
        let mut lobby = Lobby::new(3);
        lobby.join(entry("c1", "alice", "1")).unwrap();

        // when (操作):
        let result = lobby.join(entry("c2", "alice", "2"));

        // then (期待する結果):
        assert_eq!(
            result,
            Err(LobbyError::DuplicateIdentity(DuplicateField::UserName))
        );
        assert_eq!(lobby.len(), 1);
    }

    #[test]
    fn test_join_rejects_duplicate_user_id() {
        // テスト項目: 同じ外部ユーザー ID での参加は拒否される
        // given (前提条件):
        let mut lobby = Lobby::new(3);
        lobby.join(entry("c1", "alice", "1")).unwrap();

        // when (操作):
        let result = lobby.join(entry("c2", "bob", "1"));

        // then (期待する結果):
        assert_eq!(
            result,
            Err(LobbyError::DuplicateIdentity(DuplicateField::UserId))
        );
        assert_eq!(lobby.len(), 1);
    }

    #[test]
    fn test_join_rejects_second_join_from_same_connection() {
        // テスト項目: 同じ接続からの重複した参加メッセージは拒否される
        // given (前提条件):
        let mut lobby = Lobby::new(3);
        lobby.join(entry("c1", "alice", "1")).unwrap();

        // when (操作):
        let result = lobby.join(entry("c1", "alice2", "9"));

        // then (期待する結果):
        assert_eq!(
            result,
            Err(LobbyError::DuplicateIdentity(DuplicateField::Connection))
        );
        assert_eq!(lobby.len(), 1);
    }

    #[test]
    fn test_identity_is_free_again_after_roster_formed() {
        // テスト項目: ロスター成立後は同じ名前で再び参加できる
        // given (前提条件):
        let mut lobby = Lobby::new(1);
        lobby.join(entry("c1", "alice", "1")).unwrap();

        // when (操作):
        let result = lobby.join(entry("c2", "alice", "1"));

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[test]
    fn test_leave_removes_pending_entry() {
        // テスト項目: 待機中の接続が切断されるとエントリが削除される
        // given (前提条件):
        let mut lobby = Lobby::new(3);
        lobby.join(entry("c1", "alice", "1")).unwrap();
        lobby.join(entry("c2", "bob", "2")).unwrap();

        // when (操作):
        let snapshot = lobby.leave(&ConnectionId::new("c1".to_string()).unwrap());

        // then (期待する結果):
        let snapshot = snapshot.expect("entry should be removed");
        assert_eq!(snapshot.player_count(), 1);
        assert_eq!(snapshot.entries[0].display_name, "bob");
    }

    #[test]
    fn test_leave_unknown_connection_is_noop() {
        // テスト項目: 待機していない接続の離脱は何もしない
        // given (前提条件):
        let mut lobby = Lobby::new(3);
        lobby.join(entry("c1", "alice", "1")).unwrap();

        // when (操作):
        let snapshot = lobby.leave(&ConnectionId::new("zz".to_string()).unwrap());

        // then (期待する結果):
        assert!(snapshot.is_none());
        assert_eq!(lobby.len(), 1);
    }

    #[test]
    fn test_zero_capacity_is_treated_as_one() {
        // テスト項目: 定員 0 は 1 として扱われる
        // given (前提条件):

        // when (操作):
        let lobby = Lobby::new(0);

        // then (期待する結果):
        assert_eq!(lobby.capacity(), 1);
    }
}

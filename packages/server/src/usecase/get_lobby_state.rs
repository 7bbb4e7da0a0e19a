//! UseCase: ロビーの状態取得

use crate::domain::{LobbySnapshot, SharedLobby};

pub struct GetLobbyStateUseCase {
    lobby: SharedLobby,
}

impl GetLobbyStateUseCase {
    pub fn new(lobby: SharedLobby) -> Self {
        Self { lobby }
    }

    pub async fn execute(&self) -> LobbySnapshot {
        self.lobby.lock().await.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LobbyEntry;
    use crate::usecase::test_support::{Harness, conn};

    #[tokio::test]
    async fn test_snapshot_lists_waiting_entries_in_join_order() {
        // テスト項目: 待機中の参加者が参加順に取得できる
        // given (前提条件):
        let harness = Harness::new(3);
        {
            let mut lobby = harness.lobby.lock().await;
            lobby
                .join(LobbyEntry::new(conn("a"), "alice".into(), "1".into(), 0))
                .unwrap();
            lobby
                .join(LobbyEntry::new(conn("b"), "bob".into(), "2".into(), 0))
                .unwrap();
        }
        let usecase = GetLobbyStateUseCase::new(harness.lobby.clone());

        // when (操作):
        let snapshot = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(snapshot.capacity, 3);
        assert_eq!(snapshot.player_count(), 2);
        assert_eq!(snapshot.audience(), vec![conn("a"), conn("b")]);
    }
}

//! UseCase: 切断
//!
//! 接続が閉じた理由にかかわらず呼ばれる。
//!
//! 1. ConnectionRegistry から登録解除
//! 2. ロビーで待機中なら取り除き、残りの待機者に `playerUpdate` を配信
//! 3. 試合中なら TurnEngine から取り除き、残りのプレイヤーに盤面を配信
//!    （手番が移った場合は手番通知も）。誰もいなくなった試合は破棄する。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, DisconnectOutcome, GameId, GameRepository, MessagePusher, SharedLobby,
};

use super::broadcaster::Broadcaster;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisconnectReport {
    pub left_lobby: bool,
    pub left_game: Option<GameId>,
    pub game_closed: bool,
}

pub struct DisconnectParticipantUseCase {
    lobby: SharedLobby,
    repository: Arc<dyn GameRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    broadcaster: Arc<Broadcaster>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        lobby: SharedLobby,
        repository: Arc<dyn GameRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            lobby,
            repository,
            message_pusher,
            broadcaster,
        }
    }

    pub async fn execute(&self, connection_id: ConnectionId) -> DisconnectReport {
        self.message_pusher.unregister_client(&connection_id).await;

        let mut report = DisconnectReport::default();

        let snapshot = self.lobby.lock().await.leave(&connection_id);
        if let Some(snapshot) = snapshot {
            tracing::info!(
                "'{}' left lobby ({} waiting)",
                connection_id,
                snapshot.player_count()
            );
            report.left_lobby = true;
            self.broadcaster.lobby_update(snapshot).await;
        }

        let Some((game_id, game)) = self
            .repository
            .find_game_by_connection(&connection_id)
            .await
        else {
            return report;
        };
        self.repository.unbind_connection(&connection_id).await;
        report.left_game = Some(game_id.clone());

        let mut engine = game.lock().await;
        match engine.player_disconnected(&connection_id) {
            DisconnectOutcome::NotSeated => {}
            DisconnectOutcome::Removed { turn_passed } => {
                tracing::info!(
                    "'{}' left game '{}' ({} players remain)",
                    connection_id,
                    game_id,
                    engine.players().len()
                );
                let view = engine.view();
                self.broadcaster
                    .publish_state(view.clone(), engine.audience(), None)
                    .await;
                if turn_passed {
                    self.broadcaster.prompt(&view, engine.audience()).await;
                }
            }
            DisconnectOutcome::TornDown => {
                drop(engine);
                self.repository.remove_game(&game_id).await;
                report.game_closed = true;
                tracing::info!("Game '{}' closed, no players remain", game_id);
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EngineConfig, LobbyEntry};
    use crate::usecase::test_support::{Harness, conn, drain, types};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - ロビーからの離脱と playerUpdate
    // - 試合中の切断（手番の移動、盤面の配信、最後の 1 人の切断での破棄）
    // - どこにも属さない接続の切断
    // ========================================

    fn usecase(harness: &Harness) -> DisconnectParticipantUseCase {
        DisconnectParticipantUseCase::new(
            harness.lobby.clone(),
            harness.repository.clone(),
            harness.pusher.clone(),
            harness.broadcaster.clone(),
        )
    }

    #[tokio::test]
    async fn test_leaving_lobby_notifies_remaining_waiters() {
        // テスト項目: 待機中の切断でロビーから取り除かれ、残りの待機者に playerUpdate が届く
        // given (前提条件):
        let harness = Harness::new(3);
        let _rx_a = harness.connect("a").await;
        let mut rx_b = harness.connect("b").await;
        {
            let mut lobby = harness.lobby.lock().await;
            lobby
                .join(LobbyEntry::new(conn("a"), "alice".into(), "1".into(), 0))
                .unwrap();
            lobby
                .join(LobbyEntry::new(conn("b"), "bob".into(), "2".into(), 0))
                .unwrap();
        }

        // when (操作):
        let report = usecase(&harness).execute(conn("a")).await;

        // then (期待する結果):
        assert!(report.left_lobby);
        assert_eq!(report.left_game, None);
        let to_b = drain(&mut rx_b);
        assert_eq!(types(&to_b), vec!["playerUpdate"]);
        assert_eq!(to_b[0]["playerCount"], 1);
        assert!(harness.pusher.connected_ids().await.iter().all(|id| id != &conn("a")));
    }

    #[tokio::test]
    async fn test_current_player_disconnect_passes_turn() {
        // テスト項目: 3 人の試合で手番のプレイヤーが切断すると、次のプレイヤーに手番が移る
        // given (前提条件):
        let harness = Harness::new(3);
        let _rx_a = harness.connect("a").await;
        let mut rx_b = harness.connect("b").await;
        let mut rx_c = harness.connect("c").await;
        let game = harness
            .start_game(&["a", "b", "c"], EngineConfig::default())
            .await;

        // when (操作):
        let report = usecase(&harness).execute(conn("a")).await;

        // then (期待する結果):
        assert_eq!(report.left_game.as_ref(), Some(game.lock().await.game_id()));
        assert!(!report.game_closed);
        {
            let engine = game.lock().await;
            assert_eq!(engine.players().len(), 2);
            assert_eq!(engine.current_turn_index(), 0);
            assert_eq!(engine.current_player().unwrap().connection_id, conn("b"));
        }
        let to_b = drain(&mut rx_b);
        let to_c = drain(&mut rx_c);
        assert_eq!(types(&to_b), vec!["updateGameState", "startTurn"]);
        assert_eq!(to_b[0]["players"].as_array().unwrap().len(), 2);
        assert_eq!(to_b[1]["isCurrentUserTurn"], true);
        assert_eq!(to_c[1]["isCurrentUserTurn"], false);
        assert!(
            harness
                .repository
                .find_game_by_connection(&conn("a"))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_non_current_player_disconnect_only_updates_board() {
        // テスト項目: 手番でないプレイヤーの切断では盤面だけが配信される
        // given (前提条件):
        let harness = Harness::new(3);
        let mut rx_a = harness.connect("a").await;
        harness
            .start_game(&["a", "b", "c"], EngineConfig::default())
            .await;

        // when (操作):
        usecase(&harness).execute(conn("c")).await;

        // then (期待する結果):
        assert_eq!(types(&drain(&mut rx_a)), vec!["updateGameState"]);
    }

    #[tokio::test]
    async fn test_last_player_disconnect_closes_game() {
        // テスト項目: 最後のプレイヤーが切断すると試合は破棄される
        // given (前提条件):
        let harness = Harness::new(2);
        let game = harness
            .start_game(&["a", "b"], EngineConfig::default())
            .await;
        let game_id = game.lock().await.game_id().clone();
        let disconnect = usecase(&harness);
        disconnect.execute(conn("a")).await;

        // when (操作):
        let report = disconnect.execute(conn("b")).await;

        // then (期待する結果):
        assert!(report.game_closed);
        assert!(harness.repository.get_game(&game_id).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_connection_disconnect_is_noop() {
        // テスト項目: ロビーにも試合にもいない接続の切断は登録解除だけ行う
        // given (前提条件):
        let harness = Harness::new(2);
        let _rx = harness.connect("a").await;

        // when (操作):
        let report = usecase(&harness).execute(conn("a")).await;

        // then (期待する結果):
        assert_eq!(report, DisconnectReport::default());
        assert!(harness.pusher.connected_ids().await.is_empty());
    }
}

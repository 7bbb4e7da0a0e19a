//! UseCase: join
//!
//! 試合に参加していない接続の `join` はロビーへの参加、試合に参加済みの接続の
//! `join` は着席（手番順の申告）として扱う。
//!
//! ロビーで定員に達した場合、同じロックの下で TurnEngine を作って登録し、
//! `playerUpdate`（最後の 1 人を含む全員） → `startGame` の順に配信する。
//! 参加順モードではそのまま盤面と最初の手番通知も配信する。

use std::sync::Arc;

use shiritori_shared::time::get_jst_timestamp;

use crate::domain::{
    ConnectionId, EngineConfig, GamePhase, GameRepository, LobbyEntry, LobbyError, SeatOutcome,
    SharedLobby, TurnEngine,
};
use crate::infrastructure::dto::websocket::ServerMessage;

use super::{broadcaster::Broadcaster, error::JoinError};

/// `join` の入力（省略可能なフィールドを含む）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinRequest {
    pub turn_order: Option<usize>,
    pub user_name: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// ロビーで待機中
    Waiting { player_count: usize },
    /// 定員に達し、試合が始まった
    GameStarted { game_id: String },
    /// 試合で着席した
    Seated { player_id: usize, all_seated: bool },
}

pub struct JoinUseCase {
    lobby: SharedLobby,
    repository: Arc<dyn GameRepository>,
    broadcaster: Arc<Broadcaster>,
    engine_config: EngineConfig,
}

impl JoinUseCase {
    pub fn new(
        lobby: SharedLobby,
        repository: Arc<dyn GameRepository>,
        broadcaster: Arc<Broadcaster>,
        engine_config: EngineConfig,
    ) -> Self {
        Self {
            lobby,
            repository,
            broadcaster,
            engine_config,
        }
    }

    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        request: JoinRequest,
    ) -> Result<JoinOutcome, JoinError> {
        if self
            .repository
            .find_game_by_connection(&connection_id)
            .await
            .is_some()
        {
            return self.seat(connection_id, request.turn_order).await;
        }
        self.join_lobby(connection_id, request).await
    }

    async fn join_lobby(
        &self,
        connection_id: ConnectionId,
        request: JoinRequest,
    ) -> Result<JoinOutcome, JoinError> {
        let entry = LobbyEntry::new(
            connection_id.clone(),
            request
                .user_name
                .unwrap_or_else(|| connection_id.to_string()),
            request.user_id.unwrap_or_else(|| connection_id.to_string()),
            get_jst_timestamp(),
        );

        let mut lobby = self.lobby.lock().await;
        let accepted = lobby.join(entry).map_err(|e| match e {
            LobbyError::DuplicateIdentity(field) => {
                tracing::warn!(
                    "Join from '{}' rejected: duplicate {}",
                    connection_id,
                    field
                );
                JoinError::DuplicateIdentity(field)
            }
        })?;

        let player_count = accepted.snapshot.player_count();
        tracing::info!(
            "'{}' joined lobby ({}/{})",
            connection_id,
            player_count,
            lobby.capacity()
        );
        self.broadcaster.lobby_update(accepted.snapshot).await;

        let Some(roster) = accepted.roster else {
            return Ok(JoinOutcome::Waiting { player_count });
        };

        let game_id = roster.game_id().to_string();
        let mode = self.engine_config.turn_order_mode;
        let engine = TurnEngine::start(roster.clone(), self.engine_config.clone());
        let game = self.repository.insert_game(engine).await;
        // ロックの順序は常にロビー → 試合。startGame より先に切断が割り込まないよう、
        // 試合のロックを取ってからロビーを解放する。
        let engine = game.lock().await;
        drop(lobby);

        tracing::info!(
            "Game '{}' started with {} players",
            game_id,
            roster.len()
        );
        self.broadcaster.start_game(&roster, mode).await;
        // 参加順モードでは既に全員が着席している
        if engine.phase() == GamePhase::AwaitingMove {
            let view = engine.view();
            self.broadcaster
                .publish_state(view.clone(), engine.audience(), None)
                .await;
            self.broadcaster.prompt(&view, engine.audience()).await;
        }

        Ok(JoinOutcome::GameStarted { game_id })
    }

    async fn seat(
        &self,
        connection_id: ConnectionId,
        turn_order: Option<usize>,
    ) -> Result<JoinOutcome, JoinError> {
        let Some((game_id, game)) = self
            .repository
            .find_game_by_connection(&connection_id)
            .await
        else {
            return Err(JoinError::GameAlreadyStarted);
        };

        let mut engine = game.lock().await;
        let outcome = engine.seat(&connection_id, turn_order).map_err(|e| {
            tracing::warn!(
                "Seat request from '{}' in game '{}' rejected: {:?}",
                connection_id,
                game_id,
                e
            );
            JoinError::from(e)
        })?;

        let (player_id, all_seated) = match outcome {
            SeatOutcome::Seated { player_id } => (player_id, false),
            SeatOutcome::AllSeated { player_id } => (player_id, true),
        };
        let turn_order = engine
            .player_by_connection(&connection_id)
            .map(|p| p.turn_order)
            .unwrap_or_default();
        tracing::info!(
            "'{}' seated in game '{}' as player {} (turn order {})",
            connection_id,
            game_id,
            player_id,
            turn_order
        );

        self.broadcaster
            .send(
                &connection_id,
                &ServerMessage::Seated {
                    player_id,
                    turn_order,
                },
            )
            .await;
        let view = engine.view();
        self.broadcaster
            .publish_state(view.clone(), engine.audience(), None)
            .await;
        if all_seated {
            self.broadcaster.prompt(&view, engine.audience()).await;
        }

        Ok(JoinOutcome::Seated {
            player_id,
            all_seated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DuplicateField, TurnOrderMode};
    use crate::usecase::test_support::{Harness, conn, drain, types};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - ロビーへの参加と playerUpdate の配信
    // - 定員到達時の試合開始（playerUpdate → startGame → 盤面 → 手番通知）
    // - 重複した名前・ID の拒否
    // - Declared モードの着席
    // ========================================

    fn usecase(harness: &Harness, config: EngineConfig) -> JoinUseCase {
        JoinUseCase::new(
            harness.lobby.clone(),
            harness.repository.clone(),
            harness.broadcaster.clone(),
            config,
        )
    }

    fn named(name: &str, id: &str) -> JoinRequest {
        JoinRequest {
            turn_order: None,
            user_name: Some(name.to_string()),
            user_id: Some(id.to_string()),
        }
    }

    #[tokio::test]
    async fn test_first_join_waits_in_lobby() {
        // テスト項目: 定員未満の参加はロビーで待機し、待機者に playerUpdate が届く
        // given (前提条件):
        let harness = Harness::new(2);
        let mut rx_a = harness.connect("a").await;
        let join = usecase(&harness, EngineConfig::default());

        // when (操作):
        let result = join.execute(conn("a"), named("alice", "1")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(JoinOutcome::Waiting { player_count: 1 }));
        let messages = drain(&mut rx_a);
        assert_eq!(types(&messages), vec!["playerUpdate"]);
        assert_eq!(messages[0]["playerCount"], 1);
        assert_eq!(messages[0]["players"][0]["userName"], "alice");
    }

    #[tokio::test]
    async fn test_roster_formation_starts_game() {
        // テスト項目: 定員に達すると playerUpdate → startGame → 盤面 → 手番通知 が全員に届く
        // given (前提条件):
        let harness = Harness::new(2);
        let mut rx_a = harness.connect("a").await;
        let mut rx_b = harness.connect("b").await;
        let join = usecase(&harness, EngineConfig::default());
        join.execute(conn("a"), named("alice", "1")).await.unwrap();
        drain(&mut rx_a);

        // when (操作):
        let result = join.execute(conn("b"), named("bob", "2")).await;

        // then (期待する結果):
        assert!(matches!(result, Ok(JoinOutcome::GameStarted { .. })));
        let to_a = drain(&mut rx_a);
        let to_b = drain(&mut rx_b);
        let expected = vec!["playerUpdate", "startGame", "updateGameState", "startTurn"];
        assert_eq!(types(&to_a), expected);
        assert_eq!(types(&to_b), expected);
        assert_eq!(to_a[0]["playerCount"], 2);
        assert_eq!(to_a[1]["playerId"], 0);
        assert_eq!(to_b[1]["playerId"], 1);
        assert_eq!(to_a[3]["isCurrentUserTurn"], true);
        assert_eq!(to_b[3]["isCurrentUserTurn"], false);

        assert!(harness.lobby.lock().await.is_empty());
        assert!(
            harness
                .repository
                .find_game_by_connection(&conn("a"))
                .await
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_duplicate_user_name_is_rejected() {
        // テスト項目: 待機中の参加者と同じ名前での参加は拒否され、ロビーは変わらない
        // given (前提条件):
        let harness = Harness::new(3);
        let mut rx_b = harness.connect("b").await;
        let join = usecase(&harness, EngineConfig::default());
        join.execute(conn("a"), named("alice", "1")).await.unwrap();

        // when (操作):
        let result = join.execute(conn("b"), named("alice", "2")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(JoinError::DuplicateIdentity(DuplicateField::UserName))
        );
        assert_eq!(harness.lobby.lock().await.len(), 1);
        assert!(drain(&mut rx_b).is_empty());
    }

    #[tokio::test]
    async fn test_repeated_join_from_same_connection_is_rejected() {
        // テスト項目: 同じ接続からの 2 回目の join は重複として拒否される
        // given (前提条件):
        let harness = Harness::new(3);
        let join = usecase(&harness, EngineConfig::default());
        join.execute(conn("a"), named("alice", "1")).await.unwrap();

        // when (操作):
        let result = join.execute(conn("a"), named("alice2", "9")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(JoinError::DuplicateIdentity(DuplicateField::Connection))
        );
        assert_eq!(harness.lobby.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_identity_falls_back_to_connection_id() {
        // テスト項目: userName / userId の省略時は接続 ID を使う
        // given (前提条件):
        let harness = Harness::new(3);
        let join = usecase(&harness, EngineConfig::default());

        // when (操作):
        join.execute(conn("a"), JoinRequest::default()).await.unwrap();
        let result = join.execute(conn("b"), JoinRequest::default()).await;

        // then (期待する結果):
        assert_eq!(result, Ok(JoinOutcome::Waiting { player_count: 2 }));
        let snapshot = harness.lobby.lock().await.snapshot();
        assert_eq!(snapshot.entries[0].display_name, "a");
        assert_eq!(snapshot.entries[1].external_user_id, "b");
    }

    #[tokio::test]
    async fn test_declared_mode_seats_players_by_turn_order() {
        // テスト項目: Declared では試合開始後の join で着席し、全員揃うと手番通知が届く
        // given (前提条件):
        let harness = Harness::new(2);
        let mut rx_a = harness.connect("a").await;
        let mut rx_b = harness.connect("b").await;
        let config = EngineConfig {
            turn_order_mode: TurnOrderMode::Declared,
            ..EngineConfig::default()
        };
        let join = usecase(&harness, config);
        join.execute(conn("a"), named("alice", "1")).await.unwrap();
        join.execute(conn("b"), named("bob", "2")).await.unwrap();
        let start = drain(&mut rx_a);
        assert_eq!(types(&start), vec!["playerUpdate", "playerUpdate", "startGame"]);
        assert!(start[2].get("playerId").is_none());
        drain(&mut rx_b);

        // when (操作):
        let first = join
            .execute(
                conn("b"),
                JoinRequest {
                    turn_order: Some(0),
                    ..JoinRequest::default()
                },
            )
            .await;
        let taken = join
            .execute(
                conn("a"),
                JoinRequest {
                    turn_order: Some(0),
                    ..JoinRequest::default()
                },
            )
            .await;
        let second = join
            .execute(
                conn("a"),
                JoinRequest {
                    turn_order: Some(1),
                    ..JoinRequest::default()
                },
            )
            .await;

        // then (期待する結果):
        assert_eq!(
            first,
            Ok(JoinOutcome::Seated {
                player_id: 0,
                all_seated: false
            })
        );
        assert_eq!(taken, Err(JoinError::TurnOrderTaken));
        assert_eq!(
            second,
            Ok(JoinOutcome::Seated {
                player_id: 1,
                all_seated: true
            })
        );
        let to_b = drain(&mut rx_b);
        assert_eq!(
            types(&to_b),
            vec![
                "seated",
                "updateGameState",
                "updateGameState",
                "startTurn"
            ]
        );
        assert_eq!(to_b[3]["isCurrentUserTurn"], true);

        let (_, game) = harness
            .repository
            .find_game_by_connection(&conn("a"))
            .await
            .unwrap();
        assert_eq!(game.lock().await.phase(), GamePhase::AwaitingMove);
    }

    #[tokio::test]
    async fn test_join_after_start_in_join_order_mode_is_rejected() {
        // テスト項目: 参加順モードで試合開始後に join すると GameAlreadyStarted
        // given (前提条件):
        let harness = Harness::new(2);
        harness
            .start_game(&["a", "b"], EngineConfig::default())
            .await;
        let join = usecase(&harness, EngineConfig::default());

        // when (操作):
        let result = join.execute(conn("a"), JoinRequest::default()).await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinError::GameAlreadyStarted));
    }

    /// startGame を送る瞬間にロビーのロックが取れるかを記録する MessagePusher
    struct LobbyLockRecorder {
        inner: crate::infrastructure::message_pusher::WebSocketMessagePusher,
        lobby: SharedLobby,
        lobby_free_at_start_game: std::sync::Mutex<Vec<bool>>,
    }

    #[async_trait::async_trait]
    impl crate::domain::MessagePusher for LobbyLockRecorder {
        async fn register_client(
            &self,
            connection_id: ConnectionId,
            sender: crate::domain::PusherChannel,
        ) {
            self.inner.register_client(connection_id, sender).await;
        }

        async fn unregister_client(&self, connection_id: &ConnectionId) {
            self.inner.unregister_client(connection_id).await;
        }

        async fn push_to(
            &self,
            connection_id: &ConnectionId,
            content: &str,
        ) -> Result<(), crate::domain::MessagePushError> {
            if content.contains(r#""type":"startGame""#) {
                let free = self.lobby.try_lock().is_ok();
                self.lobby_free_at_start_game.lock().unwrap().push(free);
            }
            self.inner.push_to(connection_id, content).await
        }

        async fn broadcast(
            &self,
            targets: Vec<ConnectionId>,
            content: &str,
        ) -> Result<(), crate::domain::MessagePushError> {
            self.inner.broadcast(targets, content).await
        }

        async fn broadcast_except(&self, content: &str, exclude: Option<ConnectionId>) {
            self.inner.broadcast_except(content, exclude).await;
        }

        async fn connected_ids(&self) -> Vec<ConnectionId> {
            self.inner.connected_ids().await
        }
    }

    #[tokio::test]
    async fn test_roster_hand_off_holds_lobby_until_game_is_locked() {
        // テスト項目: startGame の送信中はロビーのロックが保持され、
        //            切断（ロビー → 試合の順にロックを取る）が playerUpdate と startGame の間に割り込めない
        // given (前提条件):
        let harness = Harness::new(2);
        let pusher = Arc::new(LobbyLockRecorder {
            inner: crate::infrastructure::message_pusher::WebSocketMessagePusher::new(),
            lobby: harness.lobby.clone(),
            lobby_free_at_start_game: std::sync::Mutex::new(Vec::new()),
        });
        let broadcaster = Arc::new(Broadcaster::new(pusher.clone()));
        let join = JoinUseCase::new(
            harness.lobby.clone(),
            harness.repository.clone(),
            broadcaster,
            EngineConfig::default(),
        );
        join.execute(conn("a"), named("alice", "1")).await.unwrap();

        // when (操作):
        let result = join.execute(conn("b"), named("bob", "2")).await;

        // then (期待する結果):
        assert!(matches!(result, Ok(JoinOutcome::GameStarted { .. })));
        assert_eq!(
            *pusher.lobby_free_at_start_game.lock().unwrap(),
            vec![false, false]
        );
    }
}

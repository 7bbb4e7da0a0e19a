//! UseCase: ルーレット（startRoulette）
//!
//! 手番の順序決めに使う。2 から 8 までの整数を一様に引き、送信元と同じ
//! 範囲（試合、ロビー、どちらでもなければ全接続）に `rouletteResult` を配信する。

use std::{ops::RangeInclusive, sync::Arc};

use rand::Rng;

use crate::{
    domain::{ConnectionId, GameRepository, SharedLobby},
    infrastructure::dto::websocket::ServerMessage,
};

use super::{
    broadcaster::Broadcaster,
    scope::{Scope, resolve_scope},
};

pub const ROULETTE_RANGE: RangeInclusive<u8> = 2..=8;

pub struct SpinRouletteUseCase {
    lobby: SharedLobby,
    repository: Arc<dyn GameRepository>,
    broadcaster: Arc<Broadcaster>,
}

impl SpinRouletteUseCase {
    pub fn new(
        lobby: SharedLobby,
        repository: Arc<dyn GameRepository>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            lobby,
            repository,
            broadcaster,
        }
    }

    /// 引いた値を返す
    pub async fn execute(&self, connection_id: ConnectionId) -> u8 {
        let result = rand::rng().random_range(ROULETTE_RANGE);
        let message = ServerMessage::RouletteResult { result };

        match resolve_scope(self.repository.as_ref(), &self.lobby, &connection_id).await {
            Scope::Game(targets) | Scope::Lobby(targets) => {
                self.broadcaster.publish(&message, targets, None).await;
            }
            Scope::Unscoped => self.broadcaster.publish_everyone(&message, None).await,
        }
        tracing::debug!("'{}' spun the roulette: {}", connection_id, result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EngineConfig, LobbyEntry};
    use crate::usecase::test_support::{Harness, conn, drain, types};

    fn usecase(harness: &Harness) -> SpinRouletteUseCase {
        SpinRouletteUseCase::new(
            harness.lobby.clone(),
            harness.repository.clone(),
            harness.broadcaster.clone(),
        )
    }

    #[tokio::test]
    async fn test_roulette_result_stays_in_range() {
        // テスト項目: 何度引いても結果は 2 以上 8 以下
        // given (前提条件):
        let harness = Harness::new(2);
        let _rx = harness.connect("a").await;
        let roulette = usecase(&harness);

        // when (操作):
        let mut results = Vec::new();
        for _ in 0..200 {
            results.push(roulette.execute(conn("a")).await);
        }

        // then (期待する結果):
        assert!(results.iter().all(|r| ROULETTE_RANGE.contains(r)));
    }

    #[tokio::test]
    async fn test_roulette_goes_to_game_members_only() {
        // テスト項目: 試合中の送信元なら、その試合の参加者だけに結果が届く
        // given (前提条件):
        let harness = Harness::new(2);
        let mut rx_a = harness.connect("a").await;
        let mut rx_b = harness.connect("b").await;
        let mut rx_other = harness.connect("other").await;
        harness
            .start_game(&["a", "b"], EngineConfig::default())
            .await;

        // when (操作):
        let result = usecase(&harness).execute(conn("a")).await;

        // then (期待する結果):
        for rx in [&mut rx_a, &mut rx_b] {
            let messages = drain(rx);
            assert_eq!(types(&messages), vec!["rouletteResult"]);
            assert_eq!(messages[0]["result"], result);
        }
        assert!(drain(&mut rx_other).is_empty());
    }

    #[tokio::test]
    async fn test_roulette_goes_to_lobby_members() {
        // テスト項目: ロビーで待機中の送信元なら、待機者全員に結果が届く
        // given (前提条件):
        let harness = Harness::new(3);
        let mut rx_a = harness.connect("a").await;
        let mut rx_b = harness.connect("b").await;
        let mut rx_other = harness.connect("other").await;
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
        usecase(&harness).execute(conn("b")).await;

        // then (期待する結果):
        assert_eq!(types(&drain(&mut rx_a)), vec!["rouletteResult"]);
        assert_eq!(types(&drain(&mut rx_b)), vec!["rouletteResult"]);
        assert!(drain(&mut rx_other).is_empty());
    }

    #[tokio::test]
    async fn test_unscoped_roulette_goes_to_everyone() {
        // テスト項目: ロビーにも試合にもいない送信元なら、全接続に結果が届く
        // given (前提条件):
        let harness = Harness::new(2);
        let mut rx_a = harness.connect("a").await;
        let mut rx_b = harness.connect("b").await;

        // when (操作):
        usecase(&harness).execute(conn("a")).await;

        // then (期待する結果):
        assert_eq!(types(&drain(&mut rx_a)), vec!["rouletteResult"]);
        assert_eq!(types(&drain(&mut rx_b)), vec!["rouletteResult"]);
    }
}

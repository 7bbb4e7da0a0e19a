//! UseCase: 制限時間切れ（timeIsUp）
//!
//! 各クライアントが自分でタイマーを持つため、同じ手番に対して複数の
//! `timeIsUp` が届くことがある。最初の 1 つだけが手番を進め、残りは
//! 古いタイマーとして無視される。

use std::sync::Arc;

use crate::domain::{ConnectionId, GameRepository, TurnOutcome};

use super::{broadcaster::Broadcaster, error::GameActionError, turn_advance::TurnAdvancer};

pub struct TimeUpUseCase {
    repository: Arc<dyn GameRepository>,
    broadcaster: Arc<Broadcaster>,
    advancer: Arc<TurnAdvancer>,
}

impl TimeUpUseCase {
    pub fn new(
        repository: Arc<dyn GameRepository>,
        broadcaster: Arc<Broadcaster>,
        advancer: Arc<TurnAdvancer>,
    ) -> Self {
        Self {
            repository,
            broadcaster,
            advancer,
        }
    }

    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        expected_turn_index: usize,
    ) -> Result<TurnOutcome, GameActionError> {
        let (game_id, game) = self
            .repository
            .find_game_by_connection(&connection_id)
            .await
            .ok_or_else(|| GameActionError::NotInGame(connection_id.to_string()))?;

        let mut engine = game.lock().await;
        let outcome = engine
            .time_up(expected_turn_index)
            .map_err(|reason| GameActionError::from_ignore(reason, expected_turn_index))?;
        tracing::info!(
            "Game '{}': time is up for player {}",
            game_id,
            outcome.player_id
        );
        self.broadcaster
            .turn_result(&outcome, engine.audience())
            .await;
        drop(engine);

        self.advancer.dispatch(game, outcome.serial).await;
        Ok(outcome)
    }
}

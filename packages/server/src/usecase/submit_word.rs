//! UseCase: 単語の提出（checkWord）
//!
//! 1. 試合のロックの下で提出を受け付ける（手番・連鎖・重複の確認）
//! 2. 辞書への問い合わせが必要なら、ロックを解放して `oracle_timeout` 以内で問い合わせる
//! 3. 再びロックを取り、提出時の手番の文脈のまま結果を適用する
//! 4. 結果を配信し、ゲームが続くなら手番交代の配信シーケンスに渡す
//!
//! 問い合わせの失敗・時間切れは「存在しない」として扱う。

use std::{sync::Arc, time::Duration};

use crate::domain::{
    ConnectionId, GameRepository, SharedGame, SubmitOutcome, TurnOutcome, WordOracle,
};

use super::{broadcaster::Broadcaster, error::GameActionError, turn_advance::TurnAdvancer};

pub struct SubmitWordUseCase {
    repository: Arc<dyn GameRepository>,
    oracle: Arc<dyn WordOracle>,
    oracle_timeout: Duration,
    broadcaster: Arc<Broadcaster>,
    advancer: Arc<TurnAdvancer>,
}

impl SubmitWordUseCase {
    pub fn new(
        repository: Arc<dyn GameRepository>,
        oracle: Arc<dyn WordOracle>,
        oracle_timeout: Duration,
        broadcaster: Arc<Broadcaster>,
        advancer: Arc<TurnAdvancer>,
    ) -> Self {
        Self {
            repository,
            oracle,
            oracle_timeout,
            broadcaster,
            advancer,
        }
    }

    /// # Returns
    ///
    /// * `Ok(Some(outcome))` - 判定が確定した
    /// * `Ok(None)` - 問い合わせ中に手番の文脈が変わり、結果を破棄した
    /// * `Err(GameActionError)` - 提出を受け付けなかった（状態は変わらない）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        player_id: usize,
        word: &str,
    ) -> Result<Option<TurnOutcome>, GameActionError> {
        let (game_id, game) = self
            .repository
            .find_game_by_connection(&connection_id)
            .await
            .ok_or_else(|| GameActionError::NotInGame(connection_id.to_string()))?;

        let ticket = {
            let mut engine = game.lock().await;
            match engine.player_by_connection(&connection_id) {
                Some(player) if player.id == player_id => {}
                _ => {
                    return Err(GameActionError::NotYourPlayer {
                        player_id,
                        connection_id: connection_id.to_string(),
                    });
                }
            }

            match engine.submit_word(player_id, word) {
                SubmitOutcome::Ignored(reason) => {
                    return Err(GameActionError::from_ignore(reason, player_id));
                }
                SubmitOutcome::Resolved(outcome) => {
                    tracing::info!(
                        "Game '{}': player {} submitted '{}': {:?}",
                        game_id,
                        player_id,
                        word,
                        outcome.verdict
                    );
                    self.broadcaster
                        .turn_result(&outcome, engine.audience())
                        .await;
                    drop(engine);
                    self.after_result(game, &outcome).await;
                    return Ok(Some(outcome));
                }
                SubmitOutcome::NeedsOracle(ticket) => ticket,
            }
        };

        let exists = self.lookup(ticket.word.as_str()).await;

        let mut engine = game.lock().await;
        let Some(outcome) = engine.complete_submission(ticket, exists) else {
            tracing::info!(
                "Game '{}': result for '{}' discarded, turn context changed",
                game_id,
                word
            );
            return Ok(None);
        };
        tracing::info!(
            "Game '{}': player {} submitted '{}': {:?}",
            game_id,
            player_id,
            word,
            outcome.verdict
        );
        self.broadcaster
            .turn_result(&outcome, engine.audience())
            .await;
        drop(engine);
        self.after_result(game, &outcome).await;
        Ok(Some(outcome))
    }

    async fn lookup(&self, word: &str) -> bool {
        match tokio::time::timeout(self.oracle_timeout, self.oracle.word_exists(word)).await {
            Ok(Ok(exists)) => exists,
            Ok(Err(e)) => {
                tracing::warn!("Word lookup for '{}' failed, treated as invalid: {}", word, e);
                false
            }
            Err(_) => {
                tracing::warn!(
                    "Word lookup for '{}' timed out after {:?}, treated as invalid",
                    word,
                    self.oracle_timeout
                );
                false
            }
        }
    }

    async fn after_result(&self, game: SharedGame, outcome: &TurnOutcome) {
        match outcome.winner {
            Some(winner) => tracing::info!("Game over, winner: player {}", winner),
            None => self.advancer.dispatch(game, outcome.serial).await,
        }
    }
}

//! UseCase: 試合の一覧・詳細取得

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{GameId, GameRepository, GameStateView};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetGameError {
    #[error("Game not found")]
    GameNotFound,
}

pub struct GetGamesUseCase {
    repository: Arc<dyn GameRepository>,
}

impl GetGamesUseCase {
    pub fn new(repository: Arc<dyn GameRepository>) -> Self {
        Self { repository }
    }

    /// 進行中の試合すべて（試合 ID 順）
    pub async fn execute(&self) -> Vec<GameStateView> {
        let mut views = Vec::new();
        for (_, game) in self.repository.list_games().await {
            views.push(game.lock().await.view());
        }
        views.sort_by(|a, b| a.game_id.as_str().cmp(b.game_id.as_str()));
        views
    }

    pub async fn find(&self, game_id: String) -> Result<GameStateView, GetGameError> {
        let game_id = GameId::new(game_id).map_err(|_| GetGameError::GameNotFound)?;
        let game = self
            .repository
            .get_game(&game_id)
            .await
            .ok_or(GetGameError::GameNotFound)?;
        let view = game.lock().await.view();
        Ok(view)
    }
}

//! InMemory Game Repository 実装
//!
//! 進行中の試合を HashMap に保持する。試合 ID → TurnEngine と、
//! 接続 ID → 試合 ID の 2 つの表を 1 つのロックの下で更新する。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, GameId, GameRepository, SharedGame, TurnEngine};

#[derive(Default)]
struct Tables {
    games: HashMap<GameId, SharedGame>,
    connections: HashMap<ConnectionId, GameId>,
}

#[derive(Default)]
pub struct InMemoryGameRepository {
    tables: Mutex<Tables>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn insert_game(&self, engine: TurnEngine) -> SharedGame {
        let game_id = engine.game_id().clone();
        let connection_ids = engine.roster().connection_ids();
        let game = Arc::new(Mutex::new(engine));

        let mut tables = self.tables.lock().await;
        for connection_id in connection_ids {
            tables.connections.insert(connection_id, game_id.clone());
        }
        tables.games.insert(game_id.clone(), game.clone());
        tracing::debug!("Game '{}' stored ({} games)", game_id, tables.games.len());
        game
    }

    async fn get_game(&self, game_id: &GameId) -> Option<SharedGame> {
        let tables = self.tables.lock().await;
        tables.games.get(game_id).cloned()
    }

    async fn find_game_by_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Option<(GameId, SharedGame)> {
        let tables = self.tables.lock().await;
        let game_id = tables.connections.get(connection_id)?;
        tables
            .games
            .get(game_id)
            .map(|game| (game_id.clone(), game.clone()))
    }

    async fn unbind_connection(&self, connection_id: &ConnectionId) {
        let mut tables = self.tables.lock().await;
        tables.connections.remove(connection_id);
    }

    async fn remove_game(&self, game_id: &GameId) {
        let mut tables = self.tables.lock().await;
        if tables.games.remove(game_id).is_some() {
            tables.connections.retain(|_, bound| bound != game_id);
            tracing::debug!("Game '{}' removed ({} games)", game_id, tables.games.len());
        }
    }

    async fn list_games(&self) -> Vec<(GameId, SharedGame)> {
        let tables = self.tables.lock().await;
        tables
            .games
            .iter()
            .map(|(id, game)| (id.clone(), game.clone()))
            .collect()
    }
}

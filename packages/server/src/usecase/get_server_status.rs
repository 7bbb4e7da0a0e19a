//! UseCase: サーバーの稼働状況（ヘルスチェック用）

use std::sync::Arc;

use crate::domain::{GameRepository, MessagePusher, SharedLobby};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerStatus {
    pub connections: usize,
    pub waiting: usize,
    pub games: usize,
}

pub struct GetServerStatusUseCase {
    lobby: SharedLobby,
    repository: Arc<dyn GameRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl GetServerStatusUseCase {
    pub fn new(
        lobby: SharedLobby,
        repository: Arc<dyn GameRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            lobby,
            repository,
            message_pusher,
        }
    }

    pub async fn execute(&self) -> ServerStatus {
        ServerStatus {
            connections: self.message_pusher.connected_ids().await.len(),
            waiting: self.lobby.lock().await.len(),
            games: self.repository.list_games().await.len(),
        }
    }
}

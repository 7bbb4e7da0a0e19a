//! UseCase: 入力中の単語の中継（inputWord）
//!
//! 送信元と同じ範囲の他の接続に `overwriteWord` として原文のまま届ける。
//! 試合の状態には触れない。

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, GameRepository, SharedLobby},
    infrastructure::dto::websocket::ServerMessage,
};

use super::{
    broadcaster::Broadcaster,
    scope::{Scope, resolve_scope},
};

pub struct RelayInputUseCase {
    lobby: SharedLobby,
    repository: Arc<dyn GameRepository>,
    broadcaster: Arc<Broadcaster>,
}

impl RelayInputUseCase {
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

    pub async fn execute(&self, connection_id: ConnectionId, word: String) {
        let message = ServerMessage::OverwriteWord { word };

        match resolve_scope(self.repository.as_ref(), &self.lobby, &connection_id).await {
            Scope::Game(targets) | Scope::Lobby(targets) => {
                self.broadcaster
                    .publish(&message, targets, Some(&connection_id))
                    .await;
            }
            Scope::Unscoped => {
                self.broadcaster
                    .publish_everyone(&message, Some(connection_id))
                    .await;
            }
        }
    }
}

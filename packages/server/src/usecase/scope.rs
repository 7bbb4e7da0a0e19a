//! ルーレットと入力中の単語の配信範囲
//!
//! 送信元が試合中ならその試合の参加者、ロビーで待機中ならロビーの待機者。
//! どちらでもなければ登録中の全接続が対象になる。

use crate::domain::{ConnectionId, GameRepository, SharedLobby};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Game(Vec<ConnectionId>),
    Lobby(Vec<ConnectionId>),
    Unscoped,
}

pub async fn resolve_scope(
    repository: &dyn GameRepository,
    lobby: &SharedLobby,
    connection_id: &ConnectionId,
) -> Scope {
    if let Some((_, game)) = repository.find_game_by_connection(connection_id).await {
        let engine = game.lock().await;
        return Scope::Game(engine.audience());
    }
    let lobby = lobby.lock().await;
    if lobby.contains(connection_id) {
        return Scope::Lobby(lobby.snapshot().audience());
    }
    Scope::Unscoped
}

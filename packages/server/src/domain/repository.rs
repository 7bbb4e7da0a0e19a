//! Repository trait 定義
//!
//! 進行中の試合の保管場所。UseCase 層はこの trait に依存し、
//! Infrastructure 層の具体的な実装には依存しない。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ConnectionId, GameId, TurnEngine};

/// 試合ごとに排他される TurnEngine
///
/// 1 試合の状態変更はこのロックの下で直列に行われる。
pub type SharedGame = Arc<Mutex<TurnEngine>>;

#[async_trait]
pub trait GameRepository: Send + Sync {
    /// 試合を登録し、ロスターの全接続をこの試合に紐付ける
    async fn insert_game(&self, engine: TurnEngine) -> SharedGame;

    async fn get_game(&self, game_id: &GameId) -> Option<SharedGame>;

    /// 接続が参加している試合
    async fn find_game_by_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Option<(GameId, SharedGame)>;

    /// 接続と試合の紐付けを外す
    async fn unbind_connection(&self, connection_id: &ConnectionId);

    /// 試合を取り除き、紐付いた接続もすべて外す
    async fn remove_game(&self, game_id: &GameId);

    async fn list_games(&self) -> Vec<(GameId, SharedGame)>;
}

//! MessagePusher trait 定義
//!
//! 接続中のクライアントへのメッセージ送信（ConnectionRegistry）のインターフェース。
//! 具体的な実装は Infrastructure 層が提供する。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// クライアントへの送信チャンネル
///
/// UI 層の pusher_loop がこのチャンネルから取り出して WebSocket に書き込む。
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続を登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続を登録解除（未登録なら何もしない）
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続に送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続に送信
    ///
    /// 一部の接続への送信失敗は記録して続行する。
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 登録中の全接続に送信（`exclude` を除く）
    async fn broadcast_except(&self, content: &str, exclude: Option<ConnectionId>);

    /// 登録中の接続 ID
    async fn connected_ids(&self) -> Vec<ConnectionId>;
}

#[cfg(test)]
mockall::mock! {
    pub MessagePusher {}

    #[async_trait]
    impl MessagePusher for MessagePusher {
        async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);
        async fn unregister_client(&self, connection_id: &ConnectionId);
        async fn push_to(
            &self,
            connection_id: &ConnectionId,
            content: &str,
        ) -> Result<(), MessagePushError>;
        async fn broadcast(
            &self,
            targets: Vec<ConnectionId>,
            content: &str,
        ) -> Result<(), MessagePushError>;
        async fn broadcast_except(&self, content: &str, exclude: Option<ConnectionId>);
        async fn connected_ids(&self) -> Vec<ConnectionId>;
    }
}

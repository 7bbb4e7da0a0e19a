//! UseCase: 接続
//!
//! WebSocket の接続ごとにサーバーが発行した接続 ID と送信チャンネルを
//! ConnectionRegistry に登録する。ロビーへの参加は `join` を受け取るまで行わない。

use std::sync::Arc;

use shiritori_shared::time::get_jst_timestamp;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel};

pub struct ConnectParticipantUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 接続を登録し、接続時刻（JST, ミリ秒）を返す
    pub async fn execute(&self, connection_id: ConnectionId, sender: PusherChannel) -> i64 {
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
        get_jst_timestamp()
    }
}

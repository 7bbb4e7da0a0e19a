//! WebSocket を使った MessagePusher 実装（ConnectionRegistry）
//!
//! ## 責務
//!
//! - 接続 ID と WebSocket 送信チャンネル（`PusherChannel`）の対応を管理
//! - 特定の接続への送信、複数接続への送信
//!
//! WebSocket の受付と送信チャンネルの生成は UI 層（`ui/handler/websocket.rs`）が行い、
//! ここでは生成済みのチャンネルを受け取って送信に使うだけにする。
//!
//! 送信時は対象のチャンネルを複製してからロックを解放する。送信中に別のタスクが
//! 登録・登録解除を行っても送信ループは影響を受けない。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

pub struct WebSocketMessagePusher {
    /// Key: 接続 ID, Value: 送信チャンネル
    clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 対象の送信チャンネルを複製して取り出す
    async fn snapshot(&self, targets: &[ConnectionId]) -> Vec<(ConnectionId, Option<PusherChannel>)> {
        let clients = self.clients.lock().await;
        targets
            .iter()
            .map(|id| (id.clone(), clients.get(id).cloned()))
            .collect()
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

fn deliver(connection_id: &ConnectionId, sender: &PusherChannel, content: &str) {
    // 一部の送信失敗（切断済みのピア）は許容
    if let Err(e) = sender.send(content.to_string()) {
        tracing::warn!("Failed to push message to client '{}': {}", connection_id, e);
    } else {
        tracing::debug!("Pushed message to client '{}'", connection_id);
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        if clients.insert(connection_id.clone(), sender).is_some() {
            tracing::warn!("Client '{}' was already registered, replaced", connection_id);
        }
        tracing::debug!("Client '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(connection_id).is_some() {
            tracing::debug!("Client '{}' unregistered from MessagePusher", connection_id);
        }
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let sender = {
            let clients = self.clients.lock().await;
            clients.get(connection_id).cloned()
        };

        let sender =
            sender.ok_or_else(|| MessagePushError::ClientNotFound(connection_id.to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to client '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        for (target, sender) in self.snapshot(&targets).await {
            match sender {
                Some(sender) => deliver(&target, &sender, content),
                None => tracing::warn!(
                    "Client '{}' not found during broadcast, skipping",
                    target
                ),
            }
        }
        Ok(())
    }

    async fn broadcast_except(&self, content: &str, exclude: Option<ConnectionId>) {
        let senders: Vec<(ConnectionId, PusherChannel)> = {
            let clients = self.clients.lock().await;
            clients
                .iter()
                .filter(|(id, _)| Some(*id) != exclude.as_ref())
                .map(|(id, sender)| (id.clone(), sender.clone()))
                .collect()
        };
        for (id, sender) in senders {
            deliver(&id, &sender, content);
        }
    }

    async fn connected_ids(&self) -> Vec<ConnectionId> {
        let clients = self.clients.lock().await;
        let mut ids: Vec<ConnectionId> = clients.keys().cloned().collect();
        ids.sort();
        ids
    }
}

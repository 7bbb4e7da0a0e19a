//! UseCase のテスト用の組み立て

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{
        ConnectionId, EngineConfig, GameIdFactory, GameRepository, Lobby, LobbyEntry,
        MessagePusher, Roster, SharedGame, SharedLobby, TurnEngine,
    },
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryGameRepository,
    },
};

use super::{
    broadcaster::Broadcaster,
    turn_advance::{Pacing, TurnAdvancer},
};

pub fn conn(id: &str) -> ConnectionId {
    ConnectionId::new(id.to_string()).unwrap()
}

/// 受信済みのメッセージをすべて取り出す
pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<Value> {
    let mut messages = Vec::new();
    while let Ok(text) = rx.try_recv() {
        messages.push(serde_json::from_str(&text).unwrap());
    }
    messages
}

pub fn types(messages: &[Value]) -> Vec<String> {
    messages
        .iter()
        .map(|m| m["type"].as_str().unwrap_or_default().to_string())
        .collect()
}

pub struct Harness {
    pub pusher: Arc<WebSocketMessagePusher>,
    pub lobby: SharedLobby,
    pub repository: Arc<InMemoryGameRepository>,
    pub broadcaster: Arc<Broadcaster>,
    pub advancer: Arc<TurnAdvancer>,
}

impl Harness {
    pub fn new(capacity: usize) -> Self {
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let broadcaster = Arc::new(Broadcaster::new(pusher.clone()));
        let advancer = Arc::new(TurnAdvancer::new(broadcaster.clone(), Pacing::IMMEDIATE));
        Self {
            pusher,
            lobby: Arc::new(Mutex::new(Lobby::new(capacity))),
            repository: Arc::new(InMemoryGameRepository::new()),
            broadcaster,
            advancer,
        }
    }

    pub async fn connect(&self, id: &str) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.pusher.register_client(conn(id), tx).await;
        rx
    }

    /// ロビーを経ずに試合を開始する
    pub async fn start_game(&self, ids: &[&str], config: EngineConfig) -> SharedGame {
        let entries = ids
            .iter()
            .map(|id| LobbyEntry::new(conn(id), id.to_string(), id.to_string(), 0))
            .collect();
        let engine = TurnEngine::start(Roster::new(GameIdFactory::generate(), entries), config);
        self.repository.insert_game(engine).await
    }
}

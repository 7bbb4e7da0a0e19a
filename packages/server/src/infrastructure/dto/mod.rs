//! Data Transfer Objects
//!
//! - `websocket`: WebSocket で送受信するメッセージ
//! - `http`: 運用向け HTTP API のレスポンス
//! - `conversion`: ドメインモデルからの変換

pub mod conversion;
pub mod http;
pub mod websocket;

//! メッセージ送信（ConnectionRegistry）の実装
//!
//! - `websocket`: WebSocket の送信チャンネルを管理する実装

pub mod websocket;

pub use websocket::WebSocketMessagePusher;

//! HTTP / WebSocket handlers.

mod http;
mod websocket;

pub use http::{get_game_detail, get_games, get_lobby, health_check};
pub use websocket::websocket_handler;

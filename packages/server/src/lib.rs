//! Multiplayer shiritori (word-chain) game server.
//!
//! Players join a lobby over WebSocket; once the lobby is full a game starts and
//! players take turns submitting words that continue the chain. Words are checked
//! against a dictionary service and the first player to reach the goal wins.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;

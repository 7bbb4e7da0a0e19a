//! Infrastructure 層
//!
//! ドメイン層が定義するインターフェースの具体的な実装と、通信用の DTO。

pub mod dto;
pub mod message_pusher;
pub mod repository;
pub mod word_oracle;

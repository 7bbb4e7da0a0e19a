//! ドメイン層
//!
//! 値オブジェクト・エンティティ・試合のステートマシンと、
//! 外部とのやり取り（送信、辞書、保管）のインターフェースを定義する。

pub mod entity;
pub mod error;
pub mod kana;
pub mod lobby;
pub mod message_pusher;
pub mod repository;
pub mod turn_engine;
pub mod value_object;
pub mod word_oracle;

pub use entity::{LobbyEntry, Player, Roster};
pub use error::{DuplicateField, LobbyError, MessagePushError, OracleError, ValueObjectError};
pub use kana::{continuation_char, normalize_kana};
pub use lobby::{JoinAccepted, Lobby, LobbySnapshot, SharedLobby};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{GameRepository, SharedGame};
pub use turn_engine::{
    AdvanceStage, DisconnectOutcome, EngineConfig, GamePhase, GameStateView, IgnoreReason,
    RejectReason, ResolutionTicket, SeatError, SeatOutcome, SubmitOutcome, TurnEngine,
    TurnOrderMode, TurnOutcome, Verdict,
};
pub use value_object::{ConnectionId, GameId, GameIdFactory, Word};
pub use word_oracle::WordOracle;

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
#[cfg(test)]
pub use word_oracle::MockWordOracle;

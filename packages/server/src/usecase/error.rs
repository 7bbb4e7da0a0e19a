//! UseCase 層のエラー
//!
//! どのエラーも接続を閉じる理由にはならない。UI 層はログに残し、
//! `JoinError` だけは `error` メッセージとして送信元に返す。

use thiserror::Error;

use crate::domain::{DuplicateField, IgnoreReason, SeatError};

/// 試合中の操作（単語の提出、時間切れ）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameActionError {
    #[error("Connection '{0}' is not in a game")]
    NotInGame(String),

    #[error("Unknown player id {0}")]
    UnknownPlayer(usize),

    #[error("Player {player_id} does not belong to connection '{connection_id}'")]
    NotYourPlayer {
        player_id: usize,
        connection_id: String,
    },

    #[error("Not this player's turn")]
    OutOfTurn,

    #[error("Game is not awaiting a move")]
    NotAwaitingMove,

    #[error("Stale timer for turn {0}")]
    StaleTimer(usize),
}

impl GameActionError {
    /// `subject` は提出ならプレイヤー ID、時間切れなら手番の添字
    pub(crate) fn from_ignore(reason: IgnoreReason, subject: usize) -> Self {
        match reason {
            IgnoreReason::NotAwaitingMove => GameActionError::NotAwaitingMove,
            IgnoreReason::UnknownPlayer => GameActionError::UnknownPlayer(subject),
            IgnoreReason::OutOfTurn => GameActionError::OutOfTurn,
            IgnoreReason::StaleTimer => GameActionError::StaleTimer(subject),
        }
    }
}

/// `join` のエラー（送信元に `error` メッセージとして返す）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("Username or ID already taken.")]
    DuplicateIdentity(DuplicateField),

    #[error("Turn order is out of range.")]
    TurnOrderOutOfRange,

    #[error("Turn order is already taken.")]
    TurnOrderTaken,

    #[error("Already seated.")]
    AlreadySeated,

    #[error("The game has already started.")]
    GameAlreadyStarted,
}

impl From<SeatError> for JoinError {
    fn from(e: SeatError) -> Self {
        match e {
            SeatError::TurnOrderOutOfRange => JoinError::TurnOrderOutOfRange,
            SeatError::TurnOrderTaken => JoinError::TurnOrderTaken,
            SeatError::AlreadySeated => JoinError::AlreadySeated,
            SeatError::NotSeating | SeatError::NotInRoster => JoinError::GameAlreadyStarted,
        }
    }
}

//! コマンドライン引数と設定
//!
//! `ServerArgs`（clap）を受け取り、各層が使う `GameConfig` に変換する。

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};

use crate::{
    domain::{EngineConfig, TurnOrderMode},
    usecase::Pacing,
};

/// 手番順の決め方
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TurnOrderArg {
    /// ロビーへの参加順
    Join,
    /// 試合開始後に各プレイヤーが申告する
    Declared,
}

impl From<TurnOrderArg> for TurnOrderMode {
    fn from(arg: TurnOrderArg) -> Self {
        match arg {
            TurnOrderArg::Join => TurnOrderMode::JoinOrder,
            TurnOrderArg::Declared => TurnOrderMode::Declared,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "shiritori-server")]
#[command(about = "Multiplayer shiritori game server over WebSocket", long_about = None)]
pub struct ServerArgs {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = 8080)]
    pub port: u16,

    /// Number of players in one game
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u16).range(1..))]
    pub match_size: u16,

    /// Position a player has to reach to win
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u16).range(1..))]
    pub goal: u16,

    /// Character the first word of a game must start with
    #[arg(long, default_value_t = 'り')]
    pub start_char: char,

    /// How the turn order is decided
    #[arg(long, value_enum, default_value_t = TurnOrderArg::Join)]
    pub turn_order: TurnOrderArg,

    /// Timeout of one dictionary lookup in milliseconds
    #[arg(long, default_value_t = 3000)]
    pub oracle_timeout_ms: u64,

    /// Word list file (one word per line). Replaces the Weblio lookup when set
    #[arg(long)]
    pub dictionary: Option<PathBuf>,

    /// Pause between the result and the board in milliseconds
    #[arg(long, default_value_t = 3000)]
    pub result_pause_ms: u64,

    /// Pause between the board and the turn prompt in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub board_pause_ms: u64,

    /// Also reject words ending in "ん" and single-character words
    #[arg(long)]
    pub strict_words: bool,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "debug")]
    pub log_level: String,
}

/// 実行時の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub host: String,
    pub port: u16,
    pub match_size: usize,
    pub engine: EngineConfig,
    pub oracle_timeout: Duration,
    pub dictionary: Option<PathBuf>,
    pub pacing: Pacing,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            match_size: 2,
            engine: EngineConfig::default(),
            oracle_timeout: Duration::from_millis(3000),
            dictionary: None,
            pacing: Pacing::default(),
        }
    }
}

impl From<ServerArgs> for GameConfig {
    fn from(args: ServerArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            match_size: usize::from(args.match_size),
            engine: EngineConfig {
                goal: usize::from(args.goal),
                start_char: args.start_char,
                turn_order_mode: args.turn_order.into(),
                strict_words: args.strict_words,
            },
            oracle_timeout: Duration::from_millis(args.oracle_timeout_ms),
            dictionary: args.dictionary,
            pacing: Pacing {
                result_pause: Duration::from_millis(args.result_pause_ms),
                board_pause: Duration::from_millis(args.board_pause_ms),
            },
        }
    }
}

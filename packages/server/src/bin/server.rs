//! Shiritori game server.
//!
//! Players connect over WebSocket, wait in the lobby until it is full and then
//! take turns continuing the word chain.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin shiritori-server
//! cargo run --bin shiritori-server -- --host 0.0.0.0 --port 3000 --match-size 3
//! cargo run --bin shiritori-server -- --dictionary words.txt --result-pause-ms 0
//! ```

use std::sync::Arc;

use clap::Parser;
use shiritori_server::{
    config::{GameConfig, ServerArgs},
    domain::WordOracle,
    infrastructure::word_oracle::{DictionaryWordOracle, WeblioWordOracle},
    ui::{Server, state::AppState},
};
use shiritori_shared::logger::setup_logger;

/// `--dictionary` があれば単語リスト、なければ Weblio で判定する
fn build_oracle(config: &GameConfig) -> Result<Arc<dyn WordOracle>, Box<dyn std::error::Error>> {
    match &config.dictionary {
        Some(path) => {
            let oracle = DictionaryWordOracle::from_path(path)?;
            tracing::info!(
                "Using word list {} ({} words)",
                path.display(),
                oracle.len()
            );
            Ok(Arc::new(oracle))
        }
        None => {
            tracing::info!("Using Weblio for word lookups");
            Ok(Arc::new(WeblioWordOracle::new(config.oracle_timeout)?))
        }
    }
}

#[tokio::main]
async fn main() {
    let args = ServerArgs::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = GameConfig::from(args);
    tracing::debug!("{:?}", config);

    // Initialize dependencies in order:
    // 1. WordOracle
    // 2. Repository, Lobby, MessagePusher, UseCases (AppState)
    // 3. Server
    let oracle = match build_oracle(&config) {
        Ok(oracle) => oracle,
        Err(e) => {
            tracing::error!("Failed to set up the word oracle: {}", e);
            std::process::exit(1);
        }
    };
    let state = AppState::new(&config, oracle);
    tracing::info!(
        "{} players per game, goal {}, first character '{}'",
        config.match_size,
        config.engine.goal,
        config.engine.start_char
    );

    let server = Server::new(state);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

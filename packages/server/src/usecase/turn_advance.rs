//! 手番交代の配信シーケンス（結果 → 盤面 → 手番通知）
//!
//! 結果の配信後、`result_pause` 待って盤面を、さらに `board_pause` 待って
//! 手番通知を配信する。待機中に手番の文脈が変わった場合（手番のプレイヤーの切断）、
//! TurnEngine が古い `serial` を拒否するので残りの段は何もしない。
//!
//! 待ち時間がどちらも 0 の場合は別タスクを立てずにその場で実行する。

use std::{sync::Arc, time::Duration};

use crate::domain::SharedGame;

use super::broadcaster::Broadcaster;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub result_pause: Duration,
    pub board_pause: Duration,
}

impl Pacing {
    pub const IMMEDIATE: Pacing = Pacing {
        result_pause: Duration::ZERO,
        board_pause: Duration::ZERO,
    };

    pub fn is_immediate(&self) -> bool {
        self.result_pause.is_zero() && self.board_pause.is_zero()
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            result_pause: Duration::from_millis(3000),
            board_pause: Duration::from_millis(1000),
        }
    }
}

pub struct TurnAdvancer {
    broadcaster: Arc<Broadcaster>,
    pacing: Pacing,
}

impl TurnAdvancer {
    pub fn new(broadcaster: Arc<Broadcaster>, pacing: Pacing) -> Self {
        Self {
            broadcaster,
            pacing,
        }
    }

    /// 結果の配信後に呼ぶ。試合のロックは解放しておくこと。
    pub async fn dispatch(&self, game: SharedGame, serial: u64) {
        if self.pacing.is_immediate() {
            advance(&self.broadcaster, self.pacing, &game, serial).await;
        } else {
            let broadcaster = self.broadcaster.clone();
            let pacing = self.pacing;
            tokio::spawn(async move {
                advance(&broadcaster, pacing, &game, serial).await;
            });
        }
    }
}

async fn advance(broadcaster: &Broadcaster, pacing: Pacing, game: &SharedGame, serial: u64) {
    if !pacing.result_pause.is_zero() {
        tokio::time::sleep(pacing.result_pause).await;
    }
    {
        let mut engine = game.lock().await;
        let Some(view) = engine.take_board(serial) else {
            tracing::debug!("Board step for serial {} is stale, skipped", serial);
            return;
        };
        broadcaster
            .publish_state(view, engine.audience(), None)
            .await;
    }

    if !pacing.board_pause.is_zero() {
        tokio::time::sleep(pacing.board_pause).await;
    }
    {
        let mut engine = game.lock().await;
        let Some(view) = engine.take_prompt(serial) else {
            tracing::debug!("Prompt step for serial {} is stale, skipped", serial);
            return;
        };
        broadcaster.prompt(&view, engine.audience()).await;
        tracing::debug!(
            "Game '{}': turn {} started",
            engine.game_id(),
            view.current_turn_index
        );
    }
}

//! Broadcaster: ServerMessage の直列化と配信
//!
//! 配信先の選定と送信失敗の扱いをここに集める。送信失敗（切断済みのピア）は
//! ログに残して握りつぶし、残りの配信先への送信を続ける。

use std::sync::Arc;

use crate::{
    domain::{
        ConnectionId, GameStateView, LobbySnapshot, MessagePusher, Roster, TurnOrderMode,
        TurnOutcome, Verdict,
    },
    infrastructure::dto::websocket::{RosterPlayer, ServerMessage},
};

/// `resultMessage` の本文
pub fn result_body(outcome: &TurnOutcome) -> String {
    match (&outcome.verdict, outcome.word.as_deref()) {
        (Verdict::TimedOut, _) => "時間切れ！失敗！".to_string(),
        (Verdict::Accepted, Some(word)) => format!("「{}」\n正解！", word),
        (_, word) => format!("「{}」\n失敗！", word.unwrap_or_default()),
    }
}

pub fn turn_order_mode_label(mode: TurnOrderMode) -> &'static str {
    match mode {
        TurnOrderMode::JoinOrder => "join",
        TurnOrderMode::Declared => "declared",
    }
}

fn encode(message: &ServerMessage) -> Option<String> {
    match message.to_json() {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!("Failed to serialize {:?}: {}", message, e);
            None
        }
    }
}

pub struct Broadcaster {
    message_pusher: Arc<dyn MessagePusher>,
}

impl Broadcaster {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 1 つの接続に送信
    pub async fn send(&self, target: &ConnectionId, message: &ServerMessage) {
        let Some(json) = encode(message) else {
            return;
        };
        if let Err(e) = self.message_pusher.push_to(target, &json).await {
            tracing::warn!("Failed to send to '{}': {}", target, e);
        }
    }

    /// `targets` のうち `exclude` 以外に送信
    pub async fn publish(
        &self,
        message: &ServerMessage,
        targets: Vec<ConnectionId>,
        exclude: Option<&ConnectionId>,
    ) {
        let Some(json) = encode(message) else {
            return;
        };
        let targets: Vec<ConnectionId> = targets
            .into_iter()
            .filter(|target| Some(target) != exclude)
            .collect();
        if targets.is_empty() {
            return;
        }
        if let Err(e) = self.message_pusher.broadcast(targets, &json).await {
            tracing::warn!("Broadcast failed: {}", e);
        }
    }

    /// 登録中の全接続（`exclude` を除く）に送信
    pub async fn publish_everyone(&self, message: &ServerMessage, exclude: Option<ConnectionId>) {
        if let Some(json) = encode(message) {
            self.message_pusher.broadcast_except(&json, exclude).await;
        }
    }

    /// 盤面（`updateGameState`）を配信
    pub async fn publish_state(
        &self,
        view: GameStateView,
        targets: Vec<ConnectionId>,
        exclude: Option<&ConnectionId>,
    ) {
        self.publish(&view.into(), targets, exclude).await;
    }

    /// ロビーの状態（`playerUpdate`）をスナップショット時点の待機者全員に配信
    pub async fn lobby_update(&self, snapshot: LobbySnapshot) {
        let targets = snapshot.audience();
        self.publish(&snapshot.into(), targets, None).await;
    }

    /// `startGame` をロスターの各メンバーに、その人自身のプレイヤー ID を添えて送信
    pub async fn start_game(&self, roster: &Roster, mode: TurnOrderMode) {
        let seated = mode == TurnOrderMode::JoinOrder;
        let players: Vec<RosterPlayer> = roster
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| RosterPlayer {
                player_id: seated.then_some(i),
                turn_order: seated.then_some(i),
                user_name: entry.display_name.clone(),
                user_id: entry.external_user_id.clone(),
            })
            .collect();

        for (i, entry) in roster.entries().iter().enumerate() {
            let message = ServerMessage::StartGame {
                room_id: roster.game_id().to_string(),
                turn_order_mode: turn_order_mode_label(mode).to_string(),
                player_id: seated.then_some(i),
                players: players.clone(),
            };
            self.send(&entry.connection_id, &message).await;
        }
    }

    /// 判定結果（`checkResult` → `resultMessage`）を配信
    pub async fn turn_result(&self, outcome: &TurnOutcome, targets: Vec<ConnectionId>) {
        self.publish(&outcome.into(), targets.clone(), None).await;
        let body = ServerMessage::ResultMessage {
            body: result_body(outcome),
        };
        self.publish(&body, targets, None).await;
    }

    /// 次の手番の通知（`startTurn`）を配信。手番の本人にだけ `isCurrentUserTurn = true`。
    pub async fn prompt(&self, view: &GameStateView, targets: Vec<ConnectionId>) {
        let current = view.current_connection();
        for target in targets {
            let message = ServerMessage::StartTurn {
                is_current_user_turn: current == Some(&target),
                current_turn_index: view.current_turn_index,
            };
            self.send(&target, &message).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        GameIdFactory, GamePhase, LobbyEntry, MessagePushError, MockMessagePusher, Player,
    };
    use crate::infrastructure::message_pusher::WebSocketMessagePusher;
    use serde_json::Value;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 結果メッセージの本文
    // - startTurn / startGame が受信者ごとに内容を変えること
    // - 一部の送信失敗で他の配信先への送信が止まらないこと
    // ========================================

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    async fn registered(
        pusher: &WebSocketMessagePusher,
        id: &str,
    ) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        pusher.register_client(conn(id), tx).await;
        rx
    }

    fn json(text: Option<String>) -> Value {
        serde_json::from_str(&text.unwrap()).unwrap()
    }

    fn outcome(verdict: Verdict, word: Option<&str>) -> TurnOutcome {
        TurnOutcome {
            player_id: 0,
            word: word.map(str::to_string),
            verdict,
            winner: None,
            serial: 1,
        }
    }

    #[test]
    fn test_result_body() {
        // テスト項目: 正解・失敗・時間切れの本文
        // given (前提条件):
        let accepted = outcome(Verdict::Accepted, Some("りんご"));
        let rejected = outcome(
            Verdict::Rejected(crate::domain::RejectReason::NotAWord),
            Some("りんごん"),
        );
        let timed_out = outcome(Verdict::TimedOut, None);

        // when (操作):

        // then (期待する結果):
        assert_eq!(result_body(&accepted), "「りんご」\n正解！");
        assert_eq!(result_body(&rejected), "「りんごん」\n失敗！");
        assert_eq!(result_body(&timed_out), "時間切れ！失敗！");
    }

    #[tokio::test]
    async fn test_prompt_marks_only_current_player() {
        // テスト項目: startTurn は手番の本人にだけ true を送る
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let mut rx_a = registered(&pusher, "a").await;
        let mut rx_b = registered(&pusher, "b").await;
        let broadcaster = Broadcaster::new(pusher.clone());
        let view = GameStateView {
            game_id: GameIdFactory::generate(),
            players: vec![
                Player::new(0, 0, conn("a"), "alice".to_string()),
                Player::new(1, 1, conn("b"), "bob".to_string()),
            ],
            current_turn_index: 1,
            word_chain: vec![],
            continuation_char: 'り',
            goal: 100,
            phase: GamePhase::AwaitingMove,
        };

        // when (操作):
        broadcaster
            .prompt(&view, vec![conn("a"), conn("b")])
            .await;

        // then (期待する結果):
        assert_eq!(json(rx_a.recv().await)["isCurrentUserTurn"], false);
        assert_eq!(json(rx_b.recv().await)["isCurrentUserTurn"], true);
    }

    #[tokio::test]
    async fn test_turn_result_sends_check_result_then_result_message() {
        // テスト項目: 判定結果は checkResult → resultMessage の順で届く
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let mut rx = registered(&pusher, "a").await;
        let broadcaster = Broadcaster::new(pusher.clone());

        // when (操作):
        broadcaster
            .turn_result(&outcome(Verdict::Accepted, Some("りんご")), vec![conn("a")])
            .await;

        // then (期待する結果):
        let first = json(rx.recv().await);
        let second = json(rx.recv().await);
        assert_eq!(first["type"], "checkResult");
        assert_eq!(first["valid"], true);
        assert_eq!(second["type"], "resultMessage");
        assert_eq!(second["body"], "「りんご」\n正解！");
    }

    #[tokio::test]
    async fn test_start_game_tells_each_member_its_player_id() {
        // テスト項目: startGame は受信者ごとに自分のプレイヤー ID を含む
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let mut rx_a = registered(&pusher, "a").await;
        let mut rx_b = registered(&pusher, "b").await;
        let broadcaster = Broadcaster::new(pusher.clone());
        let roster = Roster::new(
            GameIdFactory::generate(),
            vec![
                LobbyEntry::new(conn("a"), "alice".to_string(), "1".to_string(), 0),
                LobbyEntry::new(conn("b"), "bob".to_string(), "2".to_string(), 0),
            ],
        );

        // when (操作):
        broadcaster
            .start_game(&roster, TurnOrderMode::JoinOrder)
            .await;

        // then (期待する結果):
        let to_a = json(rx_a.recv().await);
        let to_b = json(rx_b.recv().await);
        assert_eq!(to_a["type"], "startGame");
        assert_eq!(to_a["roomId"], roster.game_id().to_string());
        assert_eq!(to_a["playerId"], 0);
        assert_eq!(to_b["playerId"], 1);
        assert_eq!(to_b["players"][1]["userName"], "bob");
    }

    #[tokio::test]
    async fn test_publish_excludes_sender() {
        // テスト項目: exclude に指定した接続には送らない
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let mut rx_a = registered(&pusher, "a").await;
        let mut rx_b = registered(&pusher, "b").await;
        let broadcaster = Broadcaster::new(pusher.clone());

        // when (操作):
        broadcaster
            .publish(
                &ServerMessage::OverwriteWord {
                    word: "りん".to_string(),
                },
                vec![conn("a"), conn("b")],
                Some(&conn("a")),
            )
            .await;

        // then (期待する結果):
        assert_eq!(json(rx_b.recv().await)["word"], "りん");
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_failure_does_not_stop_prompt_fanout() {
        // テスト項目: ある接続への送信が失敗しても、残りの接続への送信は続く
        // given (前提条件):
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .withf(|target, _| target.as_str() == "gone")
            .times(1)
            .returning(|target, _| Err(MessagePushError::ClientNotFound(target.to_string())));
        pusher
            .expect_push_to()
            .withf(|target, _| target.as_str() == "alive")
            .times(1)
            .returning(|_, _| Ok(()));
        let broadcaster = Broadcaster::new(Arc::new(pusher));
        let view = GameStateView {
            game_id: GameIdFactory::generate(),
            players: vec![Player::new(0, 0, conn("alive"), "alice".to_string())],
            current_turn_index: 0,
            word_chain: vec![],
            continuation_char: 'り',
            goal: 100,
            phase: GamePhase::AwaitingMove,
        };

        // when (操作):
        broadcaster
            .prompt(&view, vec![conn("gone"), conn("alive")])
            .await;

        // then (期待する結果): mock の期待回数が満たされる
    }
}

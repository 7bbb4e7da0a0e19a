//! TurnEngine: 1 試合分の手番制ステートマシン
//!
//! プレイヤー列・手番・単語の連鎖・各プレイヤーの進み具合を所有し、
//! プレイヤーの操作を受けて次に配信すべき状態を返す。
//! エンジン自身は I/O を行わない。単語辞書への問い合わせと配信は
//! 呼び出し側（UseCase 層）が、エンジンの返す結果に従って行う。
//!
//! ## 状態遷移
//!
//! ```text
//! AwaitingPlayers ──(全員着席)──▶ AwaitingMove ──(submit)──▶ Resolving
//!                                   ▲      │                    │
//!                                   │      └──(time up)──┐      │
//!                                   │                    ▼      ▼
//!                                   └──(prompt)── TurnAdvance ◀─┘
//!                                                        (valid & goal) ──▶ GameOver
//! ```
//!
//! 手番が誰にあるかが変わるたびに `turn_serial` が増える。辞書問い合わせの
//! チケットや遅延配信はこの値を持ち回り、完了時に一致しなければ破棄される。

use std::collections::HashSet;

use serde::Serialize;

use super::{
    ConnectionId, GameId, Player, Roster, Word,
    kana::{continuation_char, normalize_kana},
};

/// 手番順の決め方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TurnOrderMode {
    /// ロビーへの参加順がそのまま手番順になり、ロスター成立と同時に着席する
    JoinOrder,
    /// ロスター成立後、各プレイヤーが `join` で自分の手番順を申告して着席する
    Declared,
}

/// エンジンの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub goal: usize,
    /// 連鎖が空のときに最初の単語が始まるべき文字
    pub start_char: char,
    pub turn_order_mode: TurnOrderMode,
    /// 「ん」で終わる単語と 1 文字の単語も不正とする
    pub strict_words: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            goal: 100,
            start_char: 'り',
            turn_order_mode: TurnOrderMode::JoinOrder,
            strict_words: false,
        }
    }
}

/// ターン進行中の配信段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AdvanceStage {
    /// 結果は配信済み、盤面の配信待ち
    Board,
    /// 盤面は配信済み、次の手番の通知待ち
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum GamePhase {
    AwaitingPlayers,
    AwaitingMove,
    Resolving,
    TurnAdvance { stage: AdvanceStage },
    GameOver { winner: usize },
    TornDown,
}

/// 単語が不正とされた理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Empty,
    AlreadyUsed,
    ChainBroken { expected: char, found: char },
    EndsWithN,
    TooShort,
    /// 辞書に存在しない、または辞書で確認できなかった
    NotAWord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
    TimedOut,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// 1 手番の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub player_id: usize,
    pub word: Option<String>,
    pub verdict: Verdict,
    /// ゴールに到達した場合の勝者
    pub winner: Option<usize>,
    /// 結果適用後の turn_serial。後続の遅延配信はこの値で照合する。
    pub serial: u64,
}

impl TurnOutcome {
    pub fn is_game_over(&self) -> bool {
        self.winner.is_some()
    }
}

/// 辞書問い合わせ中の提出を表すチケット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionTicket {
    pub serial: u64,
    pub player_id: usize,
    pub word: Word,
}

/// 操作が無視された理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotAwaitingMove,
    UnknownPlayer,
    OutOfTurn,
    StaleTimer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 状態は変わらず、配信もしない
    Ignored(IgnoreReason),
    /// 辞書に問い合わせるまでもなく決着した（不正な単語）
    Resolved(TurnOutcome),
    /// 辞書への問い合わせが必要。エンジンは Resolving で待つ。
    NeedsOracle(ResolutionTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatError {
    NotSeating,
    NotInRoster,
    AlreadySeated,
    TurnOrderOutOfRange,
    TurnOrderTaken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatOutcome {
    /// 着席したが、まだ全員は揃っていない
    Seated { player_id: usize },
    /// 最後の 1 人が着席し、最初の手番が始まった
    AllSeated { player_id: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// この試合のプレイヤーではなかった
    NotSeated,
    /// プレイヤーを取り除いた。`turn_passed` なら次の手番の通知も必要。
    Removed { turn_passed: bool },
    /// プレイヤーがいなくなり、試合は終了した（以後配信しない）
    TornDown,
}

/// 配信用の読み取り専用の投影
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub game_id: GameId,
    pub players: Vec<Player>,
    pub current_turn_index: usize,
    pub word_chain: Vec<String>,
    pub continuation_char: char,
    pub goal: usize,
    pub phase: GamePhase,
}

impl GameStateView {
    /// 現在の手番のプレイヤーの接続
    pub fn current_connection(&self) -> Option<&ConnectionId> {
        self.players
            .iter()
            .find(|p| p.turn_order == self.current_turn_index)
            .map(|p| &p.connection_id)
    }
}

#[derive(Debug)]
pub struct TurnEngine {
    game_id: GameId,
    config: EngineConfig,
    roster: Roster,
    /// turn_order 順に並ぶ（着席完了後は turn_order == 添字）
    players: Vec<Player>,
    current_turn_index: usize,
    word_chain: Vec<String>,
    phase: GamePhase,
    turn_serial: u64,
    /// 着席前に切断したロスターの接続
    departed: HashSet<ConnectionId>,
    next_player_id: usize,
}

impl TurnEngine {
    /// ロスターから試合を開始する。
    ///
    /// `JoinOrder` ではロスターの順に全員を着席させて最初の手番を待つ。
    /// `Declared` では全員の着席を待つ。
    pub fn start(roster: Roster, config: EngineConfig) -> Self {
        let (players, phase): (Vec<Player>, _) = match config.turn_order_mode {
            TurnOrderMode::JoinOrder => {
                let players = roster
                    .entries()
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| {
                        Player::new(
                            i,
                            i,
                            entry.connection_id.clone(),
                            entry.display_name.clone(),
                        )
                    })
                    .collect();
                (players, GamePhase::AwaitingMove)
            }
            TurnOrderMode::Declared => (Vec::new(), GamePhase::AwaitingPlayers),
        };
        let next_player_id = players.len();

        Self {
            game_id: roster.game_id().clone(),
            config,
            roster,
            players,
            current_turn_index: 0,
            word_chain: Vec::new(),
            phase,
            turn_serial: 0,
            departed: HashSet::new(),
            next_player_id,
        }
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_turn_index(&self) -> usize {
        self.current_turn_index
    }

    pub fn word_chain(&self) -> &[String] {
        &self.word_chain
    }

    pub fn turn_serial(&self) -> u64 {
        self.turn_serial
    }

    pub fn is_torn_down(&self) -> bool {
        self.phase == GamePhase::TornDown
    }

    /// 次の単語が始まるべき文字
    pub fn continuation_char(&self) -> char {
        continuation_char(&self.word_chain, self.config.start_char)
    }

    pub fn player_by_connection(&self, connection_id: &ConnectionId) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| &p.connection_id == connection_id)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.turn_order == self.current_turn_index)
    }

    /// 配信先。着席待ちの間はロスターのうち切断していない全員、以降は着席者全員。
    pub fn audience(&self) -> Vec<ConnectionId> {
        match self.phase {
            GamePhase::AwaitingPlayers => self
                .roster
                .connection_ids()
                .into_iter()
                .filter(|id| !self.departed.contains(id))
                .collect(),
            GamePhase::TornDown => Vec::new(),
            _ => self.players.iter().map(|p| p.connection_id.clone()).collect(),
        }
    }

    pub fn view(&self) -> GameStateView {
        GameStateView {
            game_id: self.game_id.clone(),
            players: self.players.clone(),
            current_turn_index: self.current_turn_index,
            word_chain: self.word_chain.clone(),
            continuation_char: self.continuation_char(),
            goal: self.config.goal,
            phase: self.phase,
        }
    }

    /// 手番順を申告して着席する（`Declared` のみ）。
    ///
    /// `turn_order` を省略した場合は空いている最小の順番に座る。
    pub fn seat(
        &mut self,
        connection_id: &ConnectionId,
        turn_order: Option<usize>,
    ) -> Result<SeatOutcome, SeatError> {
        if self.phase != GamePhase::AwaitingPlayers {
            return Err(SeatError::NotSeating);
        }
        if !self.roster.contains(connection_id) || self.departed.contains(connection_id) {
            return Err(SeatError::NotInRoster);
        }
        if self.player_by_connection(connection_id).is_some() {
            return Err(SeatError::AlreadySeated);
        }

        let seats = self.roster.len();
        let taken = |order: usize| self.players.iter().any(|p| p.turn_order == order);
        let turn_order = match turn_order {
            Some(order) if order >= seats => return Err(SeatError::TurnOrderOutOfRange),
            Some(order) if taken(order) => return Err(SeatError::TurnOrderTaken),
            Some(order) => order,
            None => (0..seats)
                .find(|order| !taken(*order))
                .ok_or(SeatError::TurnOrderTaken)?,
        };

        let user_name = self
            .roster
            .entries()
            .iter()
            .find(|entry| &entry.connection_id == connection_id)
            .map(|entry| entry.display_name.clone())
            .unwrap_or_else(|| connection_id.to_string());

        let player_id = self.next_player_id;
        self.next_player_id += 1;
        self.players.push(Player::new(
            player_id,
            turn_order,
            connection_id.clone(),
            user_name,
        ));
        self.players.sort_by_key(|p| p.turn_order);

        if self.all_seated() {
            self.begin_play();
            Ok(SeatOutcome::AllSeated { player_id })
        } else {
            Ok(SeatOutcome::Seated { player_id })
        }
    }

    /// 単語を提出する。
    pub fn submit_word(&mut self, player_id: usize, raw_word: &str) -> SubmitOutcome {
        if self.phase != GamePhase::AwaitingMove {
            return SubmitOutcome::Ignored(IgnoreReason::NotAwaitingMove);
        }
        let Some(player) = self.players.iter().find(|p| p.id == player_id) else {
            return SubmitOutcome::Ignored(IgnoreReason::UnknownPlayer);
        };
        if player.turn_order != self.current_turn_index {
            return SubmitOutcome::Ignored(IgnoreReason::OutOfTurn);
        }

        let word = match Word::new(raw_word) {
            Ok(word) => word,
            Err(_) => {
                let outcome = self.resolve(
                    player_id,
                    Some(raw_word.to_string()),
                    Verdict::Rejected(RejectReason::Empty),
                );
                return SubmitOutcome::Resolved(outcome);
            }
        };

        if let Some(reason) = self.precheck(&word) {
            let outcome = self.resolve(
                player_id,
                Some(word.as_str().to_string()),
                Verdict::Rejected(reason),
            );
            return SubmitOutcome::Resolved(outcome);
        }

        self.phase = GamePhase::Resolving;
        SubmitOutcome::NeedsOracle(ResolutionTicket {
            serial: self.turn_serial,
            player_id,
            word,
        })
    }

    /// 辞書の判定結果を適用する。
    ///
    /// 問い合わせ中に手番の文脈が変わっていた場合（手番のプレイヤーの切断など）は
    /// 何もせず `None` を返す。
    pub fn complete_submission(
        &mut self,
        ticket: ResolutionTicket,
        exists: bool,
    ) -> Option<TurnOutcome> {
        if self.phase != GamePhase::Resolving || ticket.serial != self.turn_serial {
            return None;
        }
        if !self.players.iter().any(|p| p.id == ticket.player_id) {
            return None;
        }

        let verdict = if exists {
            Verdict::Accepted
        } else {
            Verdict::Rejected(RejectReason::NotAWord)
        };
        Some(self.resolve(
            ticket.player_id,
            Some(ticket.word.as_str().to_string()),
            verdict,
        ))
    }

    /// 制限時間切れ。`expected_turn_index` が現在の手番と一致する場合のみ有効。
    pub fn time_up(&mut self, expected_turn_index: usize) -> Result<TurnOutcome, IgnoreReason> {
        if self.phase != GamePhase::AwaitingMove || expected_turn_index != self.current_turn_index
        {
            return Err(IgnoreReason::StaleTimer);
        }
        let player_id = self
            .current_player()
            .map(|p| p.id)
            .ok_or(IgnoreReason::StaleTimer)?;
        Ok(self.resolve(player_id, None, Verdict::TimedOut))
    }

    /// 遅延配信の第 1 段（盤面）を取り出す。文脈が古ければ `None`。
    pub fn take_board(&mut self, serial: u64) -> Option<GameStateView> {
        if serial != self.turn_serial
            || self.phase
                != (GamePhase::TurnAdvance {
                    stage: AdvanceStage::Board,
                })
        {
            return None;
        }
        self.phase = GamePhase::TurnAdvance {
            stage: AdvanceStage::Prompt,
        };
        Some(self.view())
    }

    /// 遅延配信の第 2 段（次の手番の通知）を取り出し、手番待ちに戻る。
    pub fn take_prompt(&mut self, serial: u64) -> Option<GameStateView> {
        if serial != self.turn_serial
            || self.phase
                != (GamePhase::TurnAdvance {
                    stage: AdvanceStage::Prompt,
                })
        {
            return None;
        }
        self.phase = GamePhase::AwaitingMove;
        Some(self.view())
    }

    /// プレイヤーの切断。
    pub fn player_disconnected(&mut self, connection_id: &ConnectionId) -> DisconnectOutcome {
        match self.phase {
            GamePhase::TornDown => DisconnectOutcome::NotSeated,
            GamePhase::AwaitingPlayers => self.leave_before_start(connection_id),
            _ => self.leave_during_play(connection_id),
        }
    }

    fn leave_before_start(&mut self, connection_id: &ConnectionId) -> DisconnectOutcome {
        if !self.roster.contains(connection_id) || !self.departed.insert(connection_id.clone()) {
            return DisconnectOutcome::NotSeated;
        }
        self.players.retain(|p| &p.connection_id != connection_id);

        if self.expected_seats() == 0 {
            self.tear_down();
            return DisconnectOutcome::TornDown;
        }
        if self.all_seated() {
            self.begin_play();
            return DisconnectOutcome::Removed { turn_passed: true };
        }
        DisconnectOutcome::Removed { turn_passed: false }
    }

    fn leave_during_play(&mut self, connection_id: &ConnectionId) -> DisconnectOutcome {
        let Some(removed_order) = self
            .players
            .iter()
            .position(|p| &p.connection_id == connection_id)
        else {
            return DisconnectOutcome::NotSeated;
        };
        self.players.remove(removed_order);

        if self.players.is_empty() {
            self.tear_down();
            return DisconnectOutcome::TornDown;
        }
        self.renumber_turn_orders();

        let player_count = self.players.len();
        let mut turn_passed = false;
        if removed_order == self.current_turn_index {
            // 次の順番だったプレイヤーが同じ添字に繰り上がる
            self.current_turn_index %= player_count;
            if !matches!(self.phase, GamePhase::GameOver { .. }) {
                self.turn_serial += 1;
                self.phase = GamePhase::AwaitingMove;
                turn_passed = true;
            }
        } else if removed_order < self.current_turn_index {
            self.current_turn_index -= 1;
        }

        DisconnectOutcome::Removed { turn_passed }
    }

    /// 辞書に問い合わせる前に判定できる規則を確認する。
    fn precheck(&self, word: &Word) -> Option<RejectReason> {
        if self.word_chain.iter().any(|w| w == word.as_str()) {
            return Some(RejectReason::AlreadyUsed);
        }

        let expected = self.continuation_char();
        let found = normalize_kana(word.first_char());
        if found != expected {
            return Some(RejectReason::ChainBroken { expected, found });
        }

        if self.config.strict_words {
            if word.last_char() == 'ん' {
                return Some(RejectReason::EndsWithN);
            }
            if word.char_len() < 2 {
                return Some(RejectReason::TooShort);
            }
        }

        None
    }

    /// 結果を状態に反映する。成否にかかわらず手番は消費される。
    fn resolve(&mut self, player_id: usize, word: Option<String>, verdict: Verdict) -> TurnOutcome {
        let goal = self.config.goal;
        let mut winner = None;

        if let (Verdict::Accepted, Some(accepted)) = (&verdict, &word) {
            self.word_chain.push(accepted.clone());
            let steps = accepted.chars().count();
            if let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) {
                player.advance(steps, goal);
                if player.position == goal {
                    winner = Some(player_id);
                }
            }
        }

        match winner {
            Some(winner) => self.phase = GamePhase::GameOver { winner },
            None => self.rotate_turn(),
        }

        TurnOutcome {
            player_id,
            word,
            verdict,
            winner,
            serial: self.turn_serial,
        }
    }

    fn rotate_turn(&mut self) {
        if self.players.is_empty() {
            self.tear_down();
            return;
        }
        self.current_turn_index = (self.current_turn_index + 1) % self.players.len();
        self.turn_serial += 1;
        self.phase = GamePhase::TurnAdvance {
            stage: AdvanceStage::Board,
        };
    }

    fn tear_down(&mut self) {
        self.phase = GamePhase::TornDown;
        self.turn_serial += 1;
    }

    fn begin_play(&mut self) {
        self.renumber_turn_orders();
        self.current_turn_index = 0;
        self.turn_serial += 1;
        self.phase = GamePhase::AwaitingMove;
    }

    fn renumber_turn_orders(&mut self) {
        self.players.sort_by_key(|p| p.turn_order);
        for (order, player) in self.players.iter_mut().enumerate() {
            player.turn_order = order;
        }
    }

    fn expected_seats(&self) -> usize {
        self.roster.len() - self.departed.len()
    }

    fn all_seated(&self) -> bool {
        self.players.len() == self.expected_seats()
    }
}

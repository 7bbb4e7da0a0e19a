//! Shared application state.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    config::GameConfig,
    domain::{GameRepository, Lobby, MessagePusher, SharedLobby, WordOracle},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryGameRepository,
    },
    usecase::{
        Broadcaster, ConnectParticipantUseCase, DisconnectParticipantUseCase, GetGamesUseCase,
        GetLobbyStateUseCase, GetServerStatusUseCase, JoinUseCase, RelayInputUseCase,
        SpinRouletteUseCase, SubmitWordUseCase, TimeUpUseCase, TurnAdvancer,
    },
};

/// ハンドラーから使う UseCase 一式
pub struct AppState {
    /// 接続時の登録
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// 切断時の後始末（ロビー・試合からの離脱）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub join_usecase: Arc<JoinUseCase>,
    pub submit_word_usecase: Arc<SubmitWordUseCase>,
    pub time_up_usecase: Arc<TimeUpUseCase>,
    pub spin_roulette_usecase: Arc<SpinRouletteUseCase>,
    pub relay_input_usecase: Arc<RelayInputUseCase>,
    pub get_lobby_state_usecase: Arc<GetLobbyStateUseCase>,
    pub get_games_usecase: Arc<GetGamesUseCase>,
    pub get_server_status_usecase: Arc<GetServerStatusUseCase>,
    /// `join` の拒否を送信元に返すため
    pub broadcaster: Arc<Broadcaster>,
}

impl AppState {
    /// 依存関係を組み立てる
    ///
    /// 1. Repository / Lobby / MessagePusher
    /// 2. Broadcaster / TurnAdvancer
    /// 3. UseCases
    pub fn new(config: &GameConfig, oracle: Arc<dyn WordOracle>) -> Self {
        // 1. In-memory state and the connection registry
        let repository: Arc<dyn GameRepository> = Arc::new(InMemoryGameRepository::new());
        let lobby: SharedLobby = Arc::new(Mutex::new(Lobby::new(config.match_size)));
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());

        // 2. Fan-out
        let broadcaster = Arc::new(Broadcaster::new(message_pusher.clone()));
        let advancer = Arc::new(TurnAdvancer::new(broadcaster.clone(), config.pacing));

        // 3. UseCases
        Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                message_pusher.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                lobby.clone(),
                repository.clone(),
                message_pusher.clone(),
                broadcaster.clone(),
            )),
            join_usecase: Arc::new(JoinUseCase::new(
                lobby.clone(),
                repository.clone(),
                broadcaster.clone(),
                config.engine.clone(),
            )),
            submit_word_usecase: Arc::new(SubmitWordUseCase::new(
                repository.clone(),
                oracle,
                config.oracle_timeout,
                broadcaster.clone(),
                advancer.clone(),
            )),
            time_up_usecase: Arc::new(TimeUpUseCase::new(
                repository.clone(),
                broadcaster.clone(),
                advancer,
            )),
            spin_roulette_usecase: Arc::new(SpinRouletteUseCase::new(
                lobby.clone(),
                repository.clone(),
                broadcaster.clone(),
            )),
            relay_input_usecase: Arc::new(RelayInputUseCase::new(
                lobby.clone(),
                repository.clone(),
                broadcaster.clone(),
            )),
            get_lobby_state_usecase: Arc::new(GetLobbyStateUseCase::new(lobby.clone())),
            get_games_usecase: Arc::new(GetGamesUseCase::new(repository.clone())),
            get_server_status_usecase: Arc::new(GetServerStatusUseCase::new(
                lobby,
                repository,
                message_pusher,
            )),
            broadcaster,
        }
    }
}

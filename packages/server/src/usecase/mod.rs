//! UseCase 層
//!
//! 1 つの操作につき 1 つの構造体。ドメインの型とトレイトだけに依存し、
//! 配信は `Broadcaster` を通す。

mod broadcaster;
mod connect_participant;
mod disconnect_participant;
mod error;
mod get_games;
mod get_lobby_state;
mod get_server_status;
mod join;
mod relay_input;
mod scope;
mod spin_roulette;
mod submit_word;
mod time_up;
mod turn_advance;

#[cfg(test)]
mod test_support;

pub use broadcaster::{Broadcaster, result_body, turn_order_mode_label};
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::{DisconnectParticipantUseCase, DisconnectReport};
pub use error::{GameActionError, JoinError};
pub use get_games::{GetGameError, GetGamesUseCase};
pub use get_lobby_state::GetLobbyStateUseCase;
pub use get_server_status::{GetServerStatusUseCase, ServerStatus};
pub use join::{JoinOutcome, JoinRequest, JoinUseCase};
pub use relay_input::RelayInputUseCase;
pub use scope::{Scope, resolve_scope};
pub use spin_roulette::{ROULETTE_RANGE, SpinRouletteUseCase};
pub use submit_word::SubmitWordUseCase;
pub use time_up::TimeUpUseCase;
pub use turn_advance::{Pacing, TurnAdvancer};

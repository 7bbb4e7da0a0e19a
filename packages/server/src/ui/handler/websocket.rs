//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::ConnectionId,
    infrastructure::dto::websocket::{ClientMessage, ServerMessage},
    ui::state::AppState,
    usecase::JoinRequest,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// Everything the server sends to this connection (lobby updates, board, results)
/// goes through the channel registered in the ConnectionRegistry.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionId::generate();
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection and register it
    let (tx, rx) = mpsc::unbounded_channel();
    let connected_at = state
        .connect_participant_usecase
        .execute(connection_id.clone(), tx)
        .await;
    tracing::info!(
        "Connection '{}' opened at {}",
        connection_id,
        connected_at
    );

    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();

    // Spawn a task to receive messages from this connection
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from '{}': {}", connection_id_clone, text.as_str());
                    match ClientMessage::parse(text.as_str()) {
                        Ok(message) => {
                            dispatch(&state_clone, &connection_id_clone, message).await;
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Ignoring malformed message from '{}': {}",
                                connection_id_clone,
                                e
                            );
                        }
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to push server messages to this connection
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let report = state
        .disconnect_participant_usecase
        .execute(connection_id.clone())
        .await;
    tracing::info!("Connection '{}' closed: {:?}", connection_id, report);
}

/// 受信したメッセージを対応する UseCase に渡す
///
/// UseCase のエラーはログに残すだけで接続は閉じない。`join` の拒否だけは
/// 送信元に `error` メッセージで返す。
async fn dispatch(state: &AppState, connection_id: &ConnectionId, message: ClientMessage) {
    match message {
        ClientMessage::Join {
            turn_order,
            user_name,
            user_id,
        } => {
            let request = JoinRequest {
                turn_order,
                user_name,
                user_id,
            };
            match state
                .join_usecase
                .execute(connection_id.clone(), request)
                .await
            {
                Ok(outcome) => tracing::debug!("'{}' joined: {:?}", connection_id, outcome),
                Err(e) => {
                    tracing::warn!("Rejected join from '{}': {}", connection_id, e);
                    state
                        .broadcaster
                        .send(connection_id, &ServerMessage::error(e.to_string()))
                        .await;
                }
            }
        }
        ClientMessage::CheckWord { word, player_id } => {
            if let Err(e) = state
                .submit_word_usecase
                .execute(connection_id.clone(), player_id, &word)
                .await
            {
                tracing::debug!("Ignored checkWord from '{}': {}", connection_id, e);
            }
        }
        ClientMessage::TimeIsUp { order } => {
            if let Err(e) = state
                .time_up_usecase
                .execute(connection_id.clone(), order)
                .await
            {
                tracing::debug!("Ignored timeIsUp from '{}': {}", connection_id, e);
            }
        }
        ClientMessage::StartRoulette => {
            state
                .spin_roulette_usecase
                .execute(connection_id.clone())
                .await;
        }
        ClientMessage::InputWord { word } => {
            state
                .relay_input_usecase
                .execute(connection_id.clone(), word)
                .await;
        }
    }
}

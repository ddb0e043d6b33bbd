use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::{models::error::GameError, state::AppState};

/// Pushes `round_update` messages for one game. Clients only listen; whatever
/// they send is ignored.
pub async fn handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, GameError> {
    state.session(&game_id).await?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, game_id)))
}

pub async fn handle_socket(ws: WebSocket, state: AppState, game_id: String) {
    info!("New WebSocket connection established for game: {}", game_id);
    let tx = state.get_or_create_game_channel(&game_id).await;

    let (mut sender, mut receiver) = ws.split();
    let mut rx = tx.subscribe();
    let game_id_for_send = game_id.clone();

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(game_id = %game_id_for_send, skipped, "websocket client lagging");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => receive_task.abort(),
        _ = &mut receive_task => send_task.abort(),
    }
    debug!("WebSocket connection closed for game: {}", game_id);
}

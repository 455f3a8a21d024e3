//! WebSocket transport.
//!
//! Each socket gets one task that multiplexes inbound frames with the
//! participant's outbound queue.

use crate::actor::MatchHandle;
use crate::lobby::Lobby;
use crate::participant::Outbound;
use crate::protocol::ClientMessage;
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::Request;
use axum::response::Response;
use axum::routing::get;
use futures::StreamExt;
use strictly_pursuit::{Move, ParticipantId};
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

/// Builds the application router: `/ws` for play, `/health` for probes.
#[instrument(skip(lobby))]
pub fn router(lobby: Lobby) -> Router {
    Router::new()
        .route("/ws", get(upgrade))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(lobby)
}

async fn health() -> &'static str {
    "ok"
}

async fn upgrade(ws: WebSocketUpgrade, State(lobby): State<Lobby>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, lobby))
}

/// Drives one connection until either side closes it.
async fn handle_socket(mut socket: WebSocket, lobby: Lobby) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let participant = lobby.connect(tx).await;
    info!(%participant, "WebSocket connected");

    let mut current: Option<MatchHandle> = None;
    loop {
        tokio::select! {
            inbound = socket.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    handle_text(text.as_str(), participant, &lobby, current.as_ref()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(%participant, error = %e, "WebSocket receive failed");
                    break;
                }
            },
            outbound = rx.recv() => match outbound {
                Some(Outbound::Message(message)) => {
                    let text = match serde_json::to_string(&message) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(error = %e, "Failed to encode server message");
                            continue;
                        }
                    };
                    if let Err(e) = socket.send(Message::Text(text.into())).await {
                        warn!(%participant, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Some(Outbound::Assigned(handle)) => {
                    debug!(%participant, match_id = %handle.id(), "Seated in match");
                    current = Some(handle);
                }
                None => break,
            },
        }
    }

    lobby.disconnect(participant).await;
    info!(%participant, "WebSocket closed");
}

/// Routes one inbound text frame. Malformed frames are logged and dropped.
#[instrument(skip(text, lobby, current))]
async fn handle_text(
    text: &str,
    participant: ParticipantId,
    lobby: &Lobby,
    current: Option<&MatchHandle>,
) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            warn!(error = %e, "Malformed client message dropped");
            return;
        }
    };

    match message {
        ClientMessage::JoinQueue { name } => lobby.join(participant, name).await,
        ClientMessage::LeaveQueue => lobby.leave(participant).await,
        ClientMessage::DeclareMove {
            piece_id,
            destination,
            ticket,
        } => match current {
            Some(handle) => {
                handle.submit(participant, Move::new(piece_id, destination, ticket));
            }
            None => debug!("Move outside a match dropped"),
        },
    }
}

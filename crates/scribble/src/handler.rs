//! Per-connection handler: greeting, event decoding, and routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Send `connected` with the player's id
//!   2. Loop: receive client events, dispatch them to the room registry
//!   3. On exit, leave whatever room the player was in
//!
//! Outbound traffic goes through an unbounded channel drained by a writer
//! task, so room code never awaits a socket while holding a room lock.

use std::sync::Arc;

use scribble_protocol::{ClientEvent, Codec, PlayerId, PlayerName, RoomCode, ServerEvent};
use scribble_room::PlayerSender;
use scribble_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ScribbleError;
use crate::server::ServerState;

/// Drop guard that takes a player out of their room when the handler exits.
///
/// Cleanup runs even if the handler panics. Since `Drop` is synchronous,
/// we spawn a fire-and-forget task for the async leave.
struct ConnectionGuard<C: Codec + Send + Sync + 'static> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec + Send + Sync + 'static> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if let Some(left) = state.registry.leave_room(player_id).await {
                tracing::info!(
                    %player_id,
                    room = %left.code,
                    name = %left.player_name,
                    "disconnected player left room"
                );
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ScribbleError>
where
    C: Codec + Clone + Send + Sync + 'static,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let player_id = PlayerId(conn_id.into_inner());
    tracing::info!(%conn_id, %player_id, peer = %conn.peer_addr(), "player connected");

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(write_events(Arc::clone(&conn), state.codec.clone(), rx));

    let _guard = ConnectionGuard {
        player_id,
        state: Arc::clone(&state),
    };

    let _ = tx.send(ServerEvent::Connected {
        player_id,
        message: "Connected to server".to_string(),
    });

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%player_id, "connection idle, closing");
                let _ = conn.close().await;
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode client event");
                send_error(&tx, "invalid message");
                continue;
            }
        };

        if let Err(e) = dispatch(&state, player_id, &tx, event).await {
            tracing::debug!(%player_id, error = %e, "client event rejected");
            send_error(&tx, e.to_string());
        }
    }

    // The room's clone of `tx` goes away when the guard's leave runs;
    // the writer then drains what is queued and exits.
    Ok(())
}

/// Routes one decoded client event to the registry.
async fn dispatch<C: Codec>(
    state: &ServerState<C>,
    player_id: PlayerId,
    tx: &PlayerSender,
    event: ClientEvent,
) -> Result<(), ScribbleError> {
    let registry = &state.registry;
    match event {
        ClientEvent::CreateRoom { player_name } => {
            let name = PlayerName::normalize(player_name.as_deref());
            registry.create_room(player_id, name, tx.clone()).await?;
        }
        ClientEvent::JoinRoom {
            room_id,
            player_name,
        } => {
            let code = RoomCode::parse(&room_id)?;
            let name = PlayerName::normalize(player_name.as_deref());
            registry.join_room(&code, player_id, name, tx.clone()).await?;
        }
        ClientEvent::LeaveRoom => {
            if let Some(left) = registry.leave_room(player_id).await {
                tracing::debug!(%player_id, room = %left.code, "left room on request");
            }
        }
        ClientEvent::StartGame => registry.start_game_by(player_id).await?,
        ClientEvent::SendMessage { message } => {
            registry.post_message(player_id, &message).await?;
        }
        ClientEvent::Ping => {
            let _ = tx.send(ServerEvent::Pong);
        }
        other => match other.into_canvas_update() {
            Ok(update) => registry.relay_canvas(player_id, update).await?,
            Err(event) => {
                tracing::debug!(%player_id, ?event, "ignoring unroutable event");
            }
        },
    }
    Ok(())
}

/// Encodes queued events and writes them to the socket until the channel
/// closes or the peer goes away.
async fn write_events<C: Codec>(
    conn: Arc<WebSocketConnection>,
    codec: C,
    mut rx: mpsc::UnboundedReceiver<ServerEvent>,
) {
    while let Some(event) = rx.recv().await {
        let bytes = match codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(conn_id = %conn.id(), error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed, stopping writer");
            break;
        }
    }
}

/// Queues an `error` event for this connection.
fn send_error(tx: &PlayerSender, message: impl Into<String>) {
    let _ = tx.send(ServerEvent::error(message));
}

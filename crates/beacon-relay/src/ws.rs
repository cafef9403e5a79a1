//! `WebSocket` push channel for observers.
//!
//! Clients connect to `GET /ws` and immediately receive the current alert
//! as a JSON [`AlertEvent`], followed by one message per raise or clear.
//! A client may pass `?session_id=<uuid>` when reconnecting; the new
//! connection then replaces any connection still registered under that ID.
//!
//! Client-to-server messages are ignored apart from ping and close.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use beacon_types::{AlertEvent, SessionId};
use futures::{Sink, SinkExt};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Query parameters for the `WebSocket` upgrade.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ConnectQuery {
    /// Session ID to reuse on reconnect.
    pub session_id: Option<Uuid>,
}

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming alert events.
///
/// # Route
///
/// `GET /ws` (also `GET /ws/alerts`)
pub async fn ws_alerts(
    ws: WebSocketUpgrade,
    Query(query): Query<ConnectQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let id = query.session_id.map_or_else(SessionId::new, SessionId::from);
    ws.on_upgrade(move |socket| handle_ws(socket, state, id))
}

/// Why a connection loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    /// The relay dropped the session (replaced, failed delivery, shutdown).
    Dropped,
    /// The client closed or the socket errored.
    ClientGone,
    /// A write did not complete in time.
    SendFailed,
}

/// Handle the `WebSocket` lifecycle: register with the relay, forward
/// each event as a text frame, and release the session on exit.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, id: SessionId) {
    let mut handle = state.relay.connect(id).await;

    let exit = loop {
        tokio::select! {
            event = handle.recv() => {
                let Some(event) = event else {
                    break Exit::Dropped;
                };
                if !send_event(&mut socket, &event, state.send_timeout).await {
                    break Exit::SendFailed;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break Exit::ClientGone,
                    Some(Ok(Message::Ping(data))) => {
                        if !send_bounded(&mut socket, Message::Pong(data), state.send_timeout).await {
                            break Exit::SendFailed;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(session_id = %id, "WebSocket error: {e}");
                        break Exit::ClientGone;
                    }
                    // Observers are passive; anything else is ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    };

    if exit == Exit::Dropped {
        send_bounded(&mut socket, Message::Close(None), state.send_timeout).await;
    }
    debug!(session_id = %id, ?exit, "WebSocket connection ended");
    state.relay.release(&handle).await;
}

/// Serialize and write one event, bounded by `timeout`.
///
/// Returns `false` if the connection should be dropped.
async fn send_event(socket: &mut WebSocket, event: &AlertEvent, timeout: Duration) -> bool {
    let json = match serde_json::to_string(event) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize alert event: {e}");
            return true;
        }
    };

    send_bounded(socket, Message::Text(json.into()), timeout).await
}

/// Write one frame, giving up after `timeout`.
///
/// Every write to an observer goes through here, so a client that stops
/// reading can hold its task for at most one timeout per frame.
/// Returns `false` if the write failed or timed out.
async fn send_bounded<S>(sink: &mut S, msg: Message, timeout: Duration) -> bool
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    match tokio::time::timeout(timeout, sink.send(msg)).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            debug!("WebSocket send failed: {e}");
            false
        }
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis(), "WebSocket send timed out");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::*;

    /// A sink whose peer never drains it.
    struct Stalled;

    impl Sink<Message> for Stalled {
        type Error = Infallible;

        fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }

        fn start_send(self: Pin<&mut Self>, _item: Message) -> Result<(), Self::Error> {
            Ok(())
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }
    }

    #[tokio::test]
    async fn write_to_draining_sink_succeeds() {
        let mut sink = futures::sink::drain();
        assert!(send_bounded(&mut sink, Message::Close(None), Duration::from_millis(50)).await);
    }

    #[tokio::test]
    async fn pong_to_stalled_peer_gives_up() {
        let mut sink = Stalled;
        let sent = send_bounded(
            &mut sink,
            Message::Pong(axum::body::Bytes::from_static(b"ping")),
            Duration::from_millis(20),
        )
        .await;
        assert!(!sent);
    }

    #[tokio::test]
    async fn close_to_stalled_peer_gives_up() {
        let mut sink = Stalled;
        let sent = tokio::time::timeout(
            Duration::from_secs(1),
            send_bounded(&mut sink, Message::Close(None), Duration::from_millis(20)),
        )
        .await;
        assert_eq!(sent.ok(), Some(false));
    }
}

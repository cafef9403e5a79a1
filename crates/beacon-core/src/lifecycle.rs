//! Session bootstrap and cleanup.
//!
//! Per-session state machine: `Connecting -> Connected -> Disconnected`.
//! [`Relay::connect`] covers the first transition: it registers the
//! session and queues the current state as its first event before any
//! later broadcast can reach it. A reconnect is simply another
//! `connect`, possibly with a reused [`SessionId`], which replaces the
//! previous entry.

use std::sync::atomic::Ordering;

use beacon_types::{AlertEvent, SessionId};
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::registry::Session;
use crate::relay::Relay;

/// The receiving end of one observer's event stream.
///
/// Returned by [`Relay::connect`]. The transport task reads events from
/// the handle and writes them to the connection. When the handle yields
/// `None` the relay has dropped the session (replaced, failed, or shut
/// down) and the connection should be closed.
#[derive(Debug)]
pub struct SessionHandle {
    id: SessionId,
    epoch: u64,
    rx: mpsc::Receiver<AlertEvent>,
}

impl SessionHandle {
    /// The session identifier.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Wait for the next event for this session.
    pub async fn recv(&mut self) -> Option<AlertEvent> {
        self.rx.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<AlertEvent> {
        self.rx.try_recv().ok()
    }
}

impl Relay {
    /// Register a session and queue its bootstrap event.
    ///
    /// The bootstrap is [`AlertEvent::AlertCleared`] when idle, or
    /// [`AlertEvent::AlertRaised`] with the current payload when active.
    pub async fn connect(&self, id: SessionId) -> SessionHandle {
        let (tx, rx) = mpsc::channel(self.session_buffer);
        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);
        let session = Session::new(id, epoch, tx);

        let _guard = self.dispatch_lock.lock().await;
        let bootstrap = AlertEvent::from(&self.holder.current_state());

        // Fresh queue with capacity >= 1; this only fails if `rx` is gone,
        // and `rx` is still owned here.
        if let Err(e) = session.try_deliver(bootstrap) {
            warn!(error = %e, "bootstrap push failed");
        }
        if let Some(previous) = self.registry.register(session).await {
            debug!(
                session_id = %id,
                previous_epoch = previous.epoch(),
                "replaced existing session"
            );
        }

        info!(session_id = %id, epoch, "observer connected");
        SessionHandle { id, epoch, rx }
    }

    /// Remove the session with `id`, whichever connection owns it.
    /// Unknown IDs are ignored.
    pub async fn disconnect(&self, id: SessionId) {
        if let Some(session) = self.registry.deregister(id).await {
            log_disconnect(&session);
        }
    }

    /// Remove the session behind `handle`, unless a newer connection has
    /// already taken over its ID.
    pub async fn release(&self, handle: &SessionHandle) {
        if let Some(session) = self
            .registry
            .deregister_epoch(handle.id, handle.epoch)
            .await
        {
            log_disconnect(&session);
        }
    }
}

fn log_disconnect(session: &Session) {
    let connected_secs = Utc::now()
        .signed_duration_since(session.connected_at())
        .num_seconds();
    info!(
        session_id = %session.id(),
        epoch = session.epoch(),
        connected_secs,
        "observer disconnected"
    );
}

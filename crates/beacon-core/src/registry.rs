//! Registry of connected observer sessions.
//!
//! The registry is the only owner of [`Session`] entries. The broadcast
//! engine works from [`SessionRegistry::snapshot`], a point-in-time copy,
//! so sessions joining or leaving mid-broadcast never tear the iteration.
//!
//! Outside this crate the registry is read-only. Sessions enter through
//! [`Relay::connect`](crate::Relay::connect), which pairs registration
//! with the bootstrap push.

use std::collections::HashMap;
use std::time::Duration;

use beacon_types::{AlertEvent, SessionId};
use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};

use crate::error::{DeliveryError, DeliveryFailure};

/// One observer's outbound delivery handle.
///
/// Cloning a session clones the sender half of its outbound queue; the
/// queue closes once the registry entry and every in-flight clone are
/// dropped.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    epoch: u64,
    outbound: mpsc::Sender<AlertEvent>,
    connected_at: DateTime<Utc>,
}

impl Session {
    /// Create a session around the sender half of its outbound queue.
    ///
    /// `epoch` distinguishes two connections that share the same ID, so a
    /// stale connection cannot remove the entry of its replacement.
    pub fn new(id: SessionId, epoch: u64, outbound: mpsc::Sender<AlertEvent>) -> Self {
        Self {
            id,
            epoch,
            outbound,
            connected_at: Utc::now(),
        }
    }

    /// The session identifier.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The connection epoch this entry belongs to.
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// When the session was registered.
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Queue `event` for this session, waiting at most `timeout` for room.
    pub async fn deliver(&self, event: AlertEvent, timeout: Duration) -> Result<(), DeliveryError> {
        self.outbound
            .send_timeout(event, timeout)
            .await
            .map_err(|e| DeliveryError {
                session_id: self.id,
                failure: match e {
                    mpsc::error::SendTimeoutError::Timeout(_) => DeliveryFailure::Timeout,
                    mpsc::error::SendTimeoutError::Closed(_) => DeliveryFailure::Closed,
                },
            })
    }

    /// Queue `event` only if there is room right now.
    ///
    /// A full queue is reported as [`DeliveryFailure::Full`].
    pub fn try_deliver(&self, event: AlertEvent) -> Result<(), DeliveryError> {
        self.outbound.try_send(event).map_err(|e| DeliveryError {
            session_id: self.id,
            failure: match e {
                mpsc::error::TrySendError::Full(_) => DeliveryFailure::Full,
                mpsc::error::TrySendError::Closed(_) => DeliveryFailure::Closed,
            },
        })
    }
}

/// Shared map of all currently connected sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `session`, replacing any entry with the same ID.
    ///
    /// Returns the replaced session, if any. Dropping it closes the old
    /// connection's queue once no other clone is held.
    pub(crate) async fn register(&self, session: Session) -> Option<Session> {
        self.sessions.write().await.insert(session.id(), session)
    }

    /// Remove the session with `id`. Absent IDs are ignored.
    pub(crate) async fn deregister(&self, id: SessionId) -> Option<Session> {
        self.sessions.write().await.remove(&id)
    }

    /// Remove the session with `id` only if it still belongs to `epoch`.
    pub(crate) async fn deregister_epoch(&self, id: SessionId, epoch: u64) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&id) {
            Some(session) if session.epoch() == epoch => sessions.remove(&id),
            _ => None,
        }
    }

    /// Point-in-time copy of every registered session.
    pub async fn snapshot(&self) -> Vec<Session> {
        self.sessions.read().await.values().cloned().collect()
    }

    /// Whether a session with `id` is registered.
    pub async fn contains(&self, id: SessionId) -> bool {
        self.sessions.read().await.contains_key(&id)
    }

    /// Number of registered sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are registered.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Remove every session, returning how many were dropped.
    pub(crate) async fn clear(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        sessions.clear();
        count
    }
}

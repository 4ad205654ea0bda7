//! Live push channel.
//!
//! [`RoomHub`] keeps one `tokio::sync::broadcast` sender per user id. Each
//! live connection holds a [`RoomSubscription`]; dropping it leaves the room
//! and the room disappears with its last member. Emitting to a room nobody
//! is in is a no-op. A subscriber that falls behind the buffer skips the
//! oldest messages; the persisted notification remains the record.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pfy_core::entities::Notification;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::PushError;

/// Per-room buffer when none is given.
pub const DEFAULT_ROOM_CAPACITY: usize = 64;

/// One frame delivered to a live connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PushMessage {
    pub event: String,
    pub payload: Notification,
}

impl PushMessage {
    /// JSON text frame for the socket.
    ///
    /// # Errors
    ///
    /// Returns `PushError::Encode` if serialization fails.
    pub fn to_json(&self) -> Result<String, PushError> {
        serde_json::to_string(self).map_err(|e| PushError::Encode(e.to_string()))
    }
}

/// Delivers a notification to every live connection of a user.
///
/// Injected into the dispatcher; implementations must not block.
pub trait PushChannel: Send + Sync {
    /// Returns the number of connections the message reached (0 when the
    /// user is offline).
    ///
    /// # Errors
    ///
    /// Returns `PushError` on a transport failure.
    fn emit(&self, user_id: &str, event: &str, payload: &Notification) -> Result<usize, PushError>;
}

/// In-process room table.
pub struct RoomHub {
    rooms: Mutex<HashMap<String, broadcast::Sender<PushMessage>>>,
    capacity: usize,
}

impl RoomHub {
    #[must_use]
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            rooms: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        })
    }

    fn rooms(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<PushMessage>>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Join the room of `user_id`. The caller must already have verified
    /// that the connection belongs to this user.
    #[must_use]
    pub fn join(self: &Arc<Self>, user_id: &str) -> RoomSubscription {
        let rx = {
            let mut rooms = self.rooms();
            rooms
                .entry(user_id.to_string())
                .or_insert_with(|| broadcast::channel(self.capacity).0)
                .subscribe()
        };
        tracing::debug!(user_id, "joined room");
        RoomSubscription {
            hub: Arc::clone(self),
            user_id: user_id.to_string(),
            rx: Some(rx),
        }
    }

    /// Live connections currently in the room of `user_id`.
    #[must_use]
    pub fn connections(&self, user_id: &str) -> usize {
        self.rooms()
            .get(user_id)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Number of rooms with at least one member.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms().len()
    }

    fn leave(&self, user_id: &str) {
        let mut rooms = self.rooms();
        if rooms
            .get(user_id)
            .is_some_and(|tx| tx.receiver_count() == 0)
        {
            rooms.remove(user_id);
        }
        tracing::debug!(user_id, "left room");
    }
}

impl PushChannel for RoomHub {
    fn emit(&self, user_id: &str, event: &str, payload: &Notification) -> Result<usize, PushError> {
        let Some(tx) = self.rooms().get(user_id).cloned() else {
            return Ok(0);
        };
        let message = PushMessage {
            event: event.to_string(),
            payload: payload.clone(),
        };
        // A send error only means every receiver left since the lookup.
        Ok(tx.send(message).unwrap_or(0))
    }
}

/// Membership of one connection in one room.
pub struct RoomSubscription {
    hub: Arc<RoomHub>,
    user_id: String,
    rx: Option<broadcast::Receiver<PushMessage>>,
}

impl RoomSubscription {
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Next message for this room. Returns `None` once the room is closed.
    pub async fn recv(&mut self) -> Option<PushMessage> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(user_id = %self.user_id, skipped, "push subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for RoomSubscription {
    fn drop(&mut self) {
        // Release the receiver first so the hub sees the updated count.
        drop(self.rx.take());
        self.hub.leave(&self.user_id);
    }
}

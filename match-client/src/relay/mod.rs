//! Relay abstraction.
//!
//! The relay is the external matchmaking and realtime service. This module
//! defines only what the session needs from it; authentication, sockets,
//! reconnection and encryption live behind the trait.
//!
//! # Design
//!
//! The trait is async and connection-oriented:
//! - `authenticate()` obtains a user session
//! - `connect()` opens the realtime connection
//! - `subscribe()` hands out the two inbound event channels
//! - `create_match()` / `join_match()` acquire a match
//! - `send_match_data()` transmits a move (fire-and-forget)
//! - `leave_match()` / `disconnect()` tear down
//!
//! # Example
//!
//! ```ignore
//! let relay = MockRelay::new();
//! let auth = relay.authenticate("player_1").await?;
//! relay.connect("local", &auth).await?;
//! let events = relay.subscribe()?;
//! let handle = relay.create_match(Some(&RoomId::default())).await?;
//! ```

mod local;
mod mock;

pub use local::{LocalRelay, LocalRelayHub, ROOM_CAPACITY};
pub use mock::MockRelay;

use async_trait::async_trait;
use thiserror::Error;
use tictac_match_types::{
    MatchData, MatchHandle, MatchId, MoveMessage, ParticipantId, PresenceEvent, RoomId,
};
use tokio::sync::mpsc;

/// Relay errors.
///
/// The session only distinguishes success from failure; the variants exist
/// for logs and status lines.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Credentials rejected.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Not connected.
    #[error("not connected")]
    NotConnected,

    /// Event channels already handed out.
    #[error("already subscribed")]
    AlreadySubscribed,

    /// A match with that name already exists.
    #[error("room already exists: {0}")]
    RoomExists(String),

    /// No match with that name.
    #[error("room not found: {0}")]
    RoomNotFound(String),

    /// The match already has two participants.
    #[error("room is full: {0}")]
    RoomFull(String),

    /// Request refused for another reason.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Connection closed.
    #[error("connection closed")]
    ConnectionClosed,
}

/// An authenticated user session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Participant id the relay will use for this user.
    pub user_id: ParticipantId,
    /// Name the user authenticated with.
    pub username: String,
}

/// Inbound event channels, one per event kind.
///
/// Each channel preserves the relay's delivery order. Dropping or closing the
/// receivers cancels delivery.
#[derive(Debug)]
pub struct RelayEvents {
    /// Opponent moves and other match data.
    pub match_data: mpsc::UnboundedReceiver<MatchData>,
    /// Join/leave notifications.
    pub presence: mpsc::UnboundedReceiver<PresenceEvent>,
}

impl RelayEvents {
    /// Stop accepting further events.
    pub fn close(&mut self) {
        self.match_data.close();
        self.presence.close();
    }
}

/// Relay trait for match acquisition and realtime messaging.
///
/// Implementations handle the underlying service (a hosted relay, the
/// in-process [`LocalRelayHub`], a mock, etc).
#[async_trait]
pub trait Relay: Send + Sync {
    /// Authenticate a user by name.
    async fn authenticate(&self, username: &str) -> Result<AuthSession, RelayError>;

    /// Open the realtime connection for an authenticated user.
    async fn connect(&self, address: &str, auth: &AuthSession) -> Result<(), RelayError>;

    /// Take the inbound event channels.
    ///
    /// Must be called before any create or join so that a presence event
    /// delivered immediately after joining is not lost.
    fn subscribe(&self) -> Result<RelayEvents, RelayError>;

    /// Create a match, named after `room` or with a relay-generated id.
    ///
    /// Fails if a match with that name already exists.
    async fn create_match(&self, room: Option<&RoomId>) -> Result<MatchHandle, RelayError>;

    /// Join an existing match by name.
    ///
    /// Fails if it does not exist or is full.
    async fn join_match(&self, room: &RoomId) -> Result<MatchHandle, RelayError>;

    /// Send match data. No delivery acknowledgement.
    async fn send_match_data(&self, message: &MoveMessage) -> Result<(), RelayError>;

    /// Leave a match.
    async fn leave_match(&self, match_id: &MatchId) -> Result<(), RelayError>;

    /// Check if currently connected.
    fn is_connected(&self) -> bool;

    /// Close the connection. Never blocks; safe to call more than once.
    fn disconnect(&self);
}

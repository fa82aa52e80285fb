//! Session - the main interface for a tic-tac-toe match.
//!
//! This module provides [`Session`], which takes a player from "not
//! connected" to "playing" and then keeps the board in sync with the
//! opponent.
//!
//! # Architecture
//!
//! The session uses the pure state machines from `tictac-match-core` for all
//! decisions and interprets their output to perform I/O via the [`Relay`]
//! trait.
//!
//! ```text
//! Presentation → Session → Relay → Network
//!                   ↓
//!        match-core (acquisition, presence, turns)
//! ```
//!
//! Inbound events are consumed one at a time from a single task. When a
//! presence event and match data are both ready, the presence event is
//! handled first so a role assignment always precedes a move that arrived
//! alongside it.
//!
//! # Example
//!
//! ```ignore
//! use tictac_match_client::{MockRelay, Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default(), MockRelay::new());
//! session.start().await?;
//! session.play(4).await;
//! while let Some(event) = session.next_event().await {
//!     println!("{}", session.status());
//! }
//! ```

use thiserror::Error;
use tictac_match_core::{
    Acquired, AcquisitionError, AcquisitionPath, GameOutcome, PresenceAction,
    PresenceInterpreter, Status, TurnCoordinator, TurnPhase, TurnState,
};
use tictac_match_types::{
    Board, MatchData, MatchId, OpCode, ParticipantId, PresenceEvent, Role, RoomId,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::acquisition;
use crate::relay::{Relay, RelayError, RelayEvents};

/// Default relay address.
pub const DEFAULT_RELAY_ADDRESS: &str = "local";

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The relay refused the credentials.
    #[error("authentication failed: {0}")]
    AuthFailure(#[source] RelayError),

    /// The realtime connection could not be opened.
    #[error("connection failed: {0}")]
    Connection(#[source] RelayError),

    /// The inbound event channels could not be obtained.
    #[error("subscription failed: {0}")]
    Subscribe(#[source] RelayError),

    /// Create, join and fresh create all failed.
    #[error("{attempts}")]
    AcquisitionFailed {
        /// Cause of each attempt.
        attempts: AcquisitionError,
        /// The last relay error.
        #[source]
        cause: Option<RelayError>,
    },

    /// `start` was called twice.
    #[error("session already started")]
    AlreadyStarted,

    /// No match yet, or the match was left.
    #[error("session not started")]
    NotStarted,

    /// Relay error outside of start-up.
    #[error("relay error: {0}")]
    Relay(#[from] RelayError),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Configuration for a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Well-known room both players race for.
    pub room: RoomId,
    /// Name used to authenticate.
    pub username: String,
    /// Address of the relay.
    pub relay_address: String,
}

impl SessionConfig {
    /// Configuration for `room` with a random `player_<n>` username.
    pub fn new(room: RoomId) -> Self {
        Self {
            room,
            username: random_username(),
            relay_address: DEFAULT_RELAY_ADDRESS.to_string(),
        }
    }

    /// Set the username.
    pub fn with_username(mut self, username: &str) -> Self {
        self.username = username.to_string();
        self
    }

    /// Set the relay address.
    pub fn with_relay_address(mut self, address: &str) -> Self {
        self.relay_address = address.to_string();
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(RoomId::default())
    }
}

/// `player_<n>` with `n` below 10000.
fn random_username() -> String {
    let mut buf = [0u8; 4];
    let n = match getrandom::getrandom(&mut buf) {
        Ok(()) => u32::from_le_bytes(buf),
        Err(_) => std::process::id(),
    };
    format!("player_{}", n % 10_000)
}

/// One inbound relay event, as handled by [`Session::next_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A join/leave notification.
    Presence(PresenceEvent),
    /// A move or other match data.
    MatchData(MatchData),
}

/// A player's session: connection, match and board.
pub struct Session<R: Relay> {
    config: SessionConfig,
    relay: R,
    started: bool,
    acquired: Option<Acquired>,
    events: Option<RelayEvents>,
    presence: PresenceInterpreter,
    turns: TurnCoordinator,
    status: watch::Sender<Status>,
}

impl<R: Relay> Session<R> {
    /// Create a session. Nothing happens until [`start`](Self::start).
    pub fn new(config: SessionConfig, relay: R) -> Self {
        let (status, _) = watch::channel(Status::Connecting);
        Self {
            config,
            relay,
            started: false,
            acquired: None,
            events: None,
            presence: PresenceInterpreter::new(),
            turns: TurnCoordinator::new(),
            status,
        }
    }

    /// Authenticate, connect, subscribe and acquire a match.
    ///
    /// On error the status becomes [`Status::Failed`] and the session cannot
    /// be started again.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        if self.started {
            return Err(SessionError::AlreadyStarted);
        }
        self.started = true;
        self.set_status(Status::Connecting);

        let result = self.establish().await;
        if let Err(e) = &result {
            warn!(error = %e, "Session start failed");
            self.set_status(Status::Failed(e.to_string()));
        }
        result
    }

    async fn establish(&mut self) -> Result<(), SessionError> {
        let auth = self
            .relay
            .authenticate(&self.config.username)
            .await
            .map_err(SessionError::AuthFailure)?;
        info!(user = %auth.user_id, "Authenticated");
        self.set_status(Status::Authenticated);

        self.relay
            .connect(&self.config.relay_address, &auth)
            .await
            .map_err(SessionError::Connection)?;

        // Subscribe before acquiring so the join echo is not missed
        let events = self.relay.subscribe().map_err(SessionError::Subscribe)?;
        self.events = Some(events);
        info!(address = %self.config.relay_address, "Connected");
        self.set_status(Status::Connected);

        let acquired = acquisition::acquire(&self.relay, &self.config.room).await?;
        self.install(acquired);
        Ok(())
    }

    fn install(&mut self, acquired: Acquired) {
        self.presence.seed(&acquired.handle);
        self.turns.attach_match(acquired.handle.match_id.clone());
        if let Some(mark) = acquired.role().mark() {
            self.turns.assign_role(mark);
        }
        self.turns.reset_turn(acquired.initial_turn());
        self.set_status(acquired.status());
        self.acquired = Some(acquired);
    }

    /// Attempt a move at `cell` (0..9, row-major).
    ///
    /// Returns `true` if the move was accepted locally. Rejections (no role,
    /// wrong turn, occupied cell, ...) are silent no-ops. An accepted move is
    /// sent once; a send failure is logged and not retried.
    pub async fn play(&mut self, cell: usize) -> bool {
        let message = match self.turns.local_move(cell) {
            Ok(message) => message,
            Err(reason) => {
                debug!(cell, %reason, "Move rejected");
                return false;
            }
        };

        debug!(cell, match_id = %message.match_id, "Sending move");
        if let Err(e) = self.relay.send_match_data(&message).await {
            warn!(error = %e, "Failed to send move");
        }
        self.set_status(self.turns.turn_status());
        true
    }

    /// Wait for the next inbound event and handle it.
    ///
    /// Returns `None` once both event channels are closed or the session was
    /// never started. Channels closed by the relay end the session with
    /// [`Status::Closed`].
    pub async fn next_event(&mut self) -> Option<InboundEvent> {
        let events = self.events.as_mut()?;
        let received = tokio::select! {
            biased;
            Some(presence) = events.presence.recv() => Some(InboundEvent::Presence(presence)),
            Some(data) = events.match_data.recv() => Some(InboundEvent::MatchData(data)),
            else => None,
        };
        let Some(event) = received else {
            info!("Relay closed the event channels");
            self.events = None;
            self.set_status(Status::Closed);
            return None;
        };
        self.handle_event(&event);
        Some(event)
    }

    /// Handle every event that is already queued, presence first.
    ///
    /// Returns the number of events handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let Some(events) = self.events.as_mut() else {
                return handled;
            };
            let event = if let Ok(presence) = events.presence.try_recv() {
                InboundEvent::Presence(presence)
            } else if let Ok(data) = events.match_data.try_recv() {
                InboundEvent::MatchData(data)
            } else {
                return handled;
            };
            self.handle_event(&event);
            handled += 1;
        }
    }

    fn handle_event(&mut self, event: &InboundEvent) {
        match event {
            InboundEvent::Presence(presence) => self.handle_presence(presence),
            InboundEvent::MatchData(data) => self.handle_match_data(data),
        }
    }

    /// Apply a presence event to roles and turns.
    pub fn handle_presence(&mut self, event: &PresenceEvent) {
        if !self.is_current_match(event.match_id.as_ref()) {
            debug!(match_id = ?event.match_id, "Ignoring presence for another match");
            return;
        }

        let actions = self.presence.interpret(self.turns.role(), event);
        for action in actions {
            match action {
                PresenceAction::AssignRole(mark) => {
                    if self.turns.assign_role(mark) {
                        info!(role = %mark, "Role assigned");
                    } else {
                        warn!(role = %mark, current = %self.turns.role(), "Role already set");
                    }
                }
                PresenceAction::ResetTurn(mark) => self.turns.reset_turn(mark),
                PresenceAction::Resume => self.turns.resume(),
                PresenceAction::Pause => self.turns.pause(),
                PresenceAction::RejectJoin(participant) => {
                    warn!(%participant, "Match is full, ignoring join");
                }
                PresenceAction::EmitStatus(status) => self.set_status(status),
            }
        }
    }

    /// Apply inbound match data. Only [`OpCode::MOVE`] is understood.
    pub fn handle_match_data(&mut self, data: &MatchData) {
        if !self.is_current_match(Some(&data.match_id)) {
            debug!(match_id = %data.match_id, "Ignoring data for another match");
            return;
        }
        if data.op_code != OpCode::MOVE {
            debug!(op_code = data.op_code.0, "Ignoring unknown opcode");
            return;
        }

        match self.turns.apply_remote(&data.data) {
            Ok(board) => {
                debug!(filled = board.filled(), "Applied remote snapshot");
                if let Some(outcome) = self.turns.outcome() {
                    info!(%outcome, "Game over");
                }
                self.set_status(self.turns.turn_status());
            }
            Err(e) => {
                warn!(error = %e, sender = ?data.sender, "Dropping malformed move");
            }
        }
    }

    fn is_current_match(&self, match_id: Option<&MatchId>) -> bool {
        match (self.turns.match_id(), match_id) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(current), Some(id)) => current == id,
        }
    }

    /// Leave the current match but stay connected.
    ///
    /// If the relay refuses, the match is kept and the call may be retried.
    pub async fn leave(&mut self) -> Result<(), SessionError> {
        let match_id = self
            .turns
            .match_id()
            .cloned()
            .ok_or(SessionError::NotStarted)?;
        info!(%match_id, "Leaving match");
        self.relay.leave_match(&match_id).await?;
        self.turns.detach_match();
        self.set_status(Status::LeftMatch);
        Ok(())
    }

    /// Leave the match (if any), disconnect and stop receiving events.
    pub async fn shutdown(mut self) {
        if let Some(match_id) = self.turns.detach_match() {
            if let Err(e) = self.relay.leave_match(&match_id).await {
                debug!(error = %e, "Leave during shutdown failed");
            }
        }
        self.close();
    }

    fn close(&mut self) {
        if let Some(mut events) = self.events.take() {
            events.close();
        }
        if self.relay.is_connected() {
            info!("Disconnecting");
            self.relay.disconnect();
            self.set_status(Status::Closed);
        }
    }

    fn set_status(&self, status: Status) {
        debug!(%status, "Status");
        self.status.send_replace(status);
    }

    /// The current status line.
    pub fn status(&self) -> Status {
        self.status.borrow().clone()
    }

    /// Subscribe to status changes.
    pub fn watch_status(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }

    /// The current board.
    pub fn board(&self) -> &Board {
        self.turns.board()
    }

    /// The local role.
    pub fn role(&self) -> Role {
        self.turns.role()
    }

    /// Whose turn it is.
    pub fn turn_state(&self) -> TurnState {
        self.turns.state()
    }

    /// Turn phase from the local point of view.
    pub fn phase(&self) -> TurnPhase {
        self.turns.phase()
    }

    /// The current match, if any.
    pub fn match_id(&self) -> Option<&MatchId> {
        self.turns.match_id()
    }

    /// The local participant as the relay knows it.
    pub fn self_id(&self) -> Option<&ParticipantId> {
        self.acquired.as_ref().map(|a| &a.handle.self_id)
    }

    /// How the match was acquired.
    pub fn acquisition_path(&self) -> Option<AcquisitionPath> {
        self.acquired.as_ref().map(|a| a.path)
    }

    /// Outcome once the game has ended.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.turns.outcome()
    }

    /// Whether moves are paused for an absent opponent.
    pub fn is_paused(&self) -> bool {
        self.turns.is_paused()
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get a reference to the underlying relay (for testing).
    pub fn relay(&self) -> &R {
        &self.relay
    }
}

impl<R: Relay> Drop for Session<R> {
    fn drop(&mut self) {
        self.close();
    }
}

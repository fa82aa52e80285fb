//! Mock relay for testing.
//!
//! Allows scripting failures, injecting inbound events and capturing sent
//! messages for verification.

use super::{AuthSession, Relay, RelayError, RelayEvents};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tictac_match_types::{
    MatchData, MatchHandle, MatchId, MoveMessage, ParticipantId, PresenceEvent, RoomId,
};
use tokio::sync::mpsc;

/// Mock relay for testing.
///
/// Clones share state, so a test can keep one clone while the session owns
/// another.
#[derive(Debug, Default)]
pub struct MockRelay {
    inner: Arc<Mutex<MockRelayInner>>,
}

#[derive(Debug, Default)]
struct MockRelayInner {
    connected: bool,
    connected_address: Option<String>,
    user: Option<ParticipantId>,
    calls: Vec<String>,
    sent_messages: Vec<MoveMessage>,
    left_matches: Vec<MatchId>,
    existing_presences: Vec<ParticipantId>,
    match_data_tx: Option<mpsc::UnboundedSender<MatchData>>,
    presence_tx: Option<mpsc::UnboundedSender<PresenceEvent>>,
    subscribed: bool,
    fresh_matches: u32,
    fail_next_auth: Option<String>,
    fail_next_connect: Option<String>,
    fail_creates: VecDeque<String>,
    fail_next_join: Option<String>,
    fail_next_send: Option<String>,
}

impl MockRelay {
    /// Create a new mock relay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Participants reported as already present by the next join.
    pub fn set_existing_presences(&self, presences: Vec<ParticipantId>) {
        let mut inner = self.inner.lock().unwrap();
        inner.existing_presences = presences;
    }

    /// Deliver a presence event to the subscriber.
    ///
    /// Returns `false` if nobody is subscribed or the receiver is gone.
    pub fn push_presence(&self, event: PresenceEvent) -> bool {
        let inner = self.inner.lock().unwrap();
        inner
            .presence_tx
            .as_ref()
            .is_some_and(|tx| tx.send(event).is_ok())
    }

    /// Deliver match data to the subscriber.
    ///
    /// Returns `false` if nobody is subscribed or the receiver is gone.
    pub fn push_match_data(&self, data: MatchData) -> bool {
        let inner = self.inner.lock().unwrap();
        inner
            .match_data_tx
            .as_ref()
            .is_some_and(|tx| tx.send(data).is_ok())
    }

    /// Every relay call made so far, in order (`"create:room1"`, `"join:room1"`, ...).
    pub fn calls(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.calls.clone()
    }

    /// Get all messages that were sent.
    pub fn sent_messages(&self) -> Vec<MoveMessage> {
        let inner = self.inner.lock().unwrap();
        inner.sent_messages.clone()
    }

    /// Get the last message that was sent.
    pub fn last_sent(&self) -> Option<MoveMessage> {
        let inner = self.inner.lock().unwrap();
        inner.sent_messages.last().cloned()
    }

    /// Matches left so far.
    pub fn left_matches(&self) -> Vec<MatchId> {
        let inner = self.inner.lock().unwrap();
        inner.left_matches.clone()
    }

    /// Get the address that was connected to.
    pub fn connected_address(&self) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.connected_address.clone()
    }

    /// Cause the next authenticate() to fail with the given error.
    pub fn fail_next_auth(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_auth = Some(error.to_string());
    }

    /// Cause the next connect() to fail with the given error.
    pub fn fail_next_connect(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_connect = Some(error.to_string());
    }

    /// Queue a failure for a create_match() call.
    ///
    /// Failures are consumed one per call, so queueing twice fails both the
    /// named and the fresh create.
    pub fn fail_next_create(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_creates.push_back(error.to_string());
    }

    /// Cause the next join_match() to fail with the given error.
    pub fn fail_next_join(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_join = Some(error.to_string());
    }

    /// Cause the next send_match_data() to fail with the given error.
    pub fn fail_next_send(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_send = Some(error.to_string());
    }

    fn handle(inner: &MockRelayInner, match_id: MatchId, presences: Vec<ParticipantId>) -> MatchHandle {
        MatchHandle {
            match_id,
            self_id: inner
                .user
                .clone()
                .unwrap_or_else(|| ParticipantId::new("mock-user")),
            presences,
        }
    }
}

impl Clone for MockRelay {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Relay for MockRelay {
    async fn authenticate(&self, username: &str) -> Result<AuthSession, RelayError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("authenticate".to_string());

        if let Some(error) = inner.fail_next_auth.take() {
            return Err(RelayError::AuthenticationFailed(error));
        }

        let user_id = ParticipantId::new(username);
        inner.user = Some(user_id.clone());
        Ok(AuthSession {
            user_id,
            username: username.to_string(),
        })
    }

    async fn connect(&self, address: &str, _auth: &AuthSession) -> Result<(), RelayError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("connect".to_string());

        if let Some(error) = inner.fail_next_connect.take() {
            return Err(RelayError::ConnectionFailed(error));
        }

        inner.connected = true;
        inner.connected_address = Some(address.to_string());
        Ok(())
    }

    fn subscribe(&self) -> Result<RelayEvents, RelayError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("subscribe".to_string());

        if inner.subscribed {
            return Err(RelayError::AlreadySubscribed);
        }

        let (match_data_tx, match_data) = mpsc::unbounded_channel();
        let (presence_tx, presence) = mpsc::unbounded_channel();
        inner.match_data_tx = Some(match_data_tx);
        inner.presence_tx = Some(presence_tx);
        inner.subscribed = true;
        Ok(RelayEvents {
            match_data,
            presence,
        })
    }

    async fn create_match(&self, room: Option<&RoomId>) -> Result<MatchHandle, RelayError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(match room {
            Some(room) => format!("create:{}", room),
            None => "create:-".to_string(),
        });

        if !inner.connected {
            return Err(RelayError::NotConnected);
        }
        if let Some(error) = inner.fail_creates.pop_front() {
            return Err(RelayError::Rejected(error));
        }

        let match_id = match room {
            Some(room) => MatchId::new(room.as_str()),
            None => {
                inner.fresh_matches += 1;
                MatchId::new(format!("mock-match-{:08}", inner.fresh_matches))
            }
        };
        Ok(Self::handle(&inner, match_id, Vec::new()))
    }

    async fn join_match(&self, room: &RoomId) -> Result<MatchHandle, RelayError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("join:{}", room));

        if !inner.connected {
            return Err(RelayError::NotConnected);
        }
        if let Some(error) = inner.fail_next_join.take() {
            return Err(RelayError::Rejected(error));
        }

        let presences = std::mem::take(&mut inner.existing_presences);
        Ok(Self::handle(&inner, MatchId::new(room.as_str()), presences))
    }

    async fn send_match_data(&self, message: &MoveMessage) -> Result<(), RelayError> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.connected {
            return Err(RelayError::NotConnected);
        }

        // Check for forced failure
        if let Some(error) = inner.fail_next_send.take() {
            return Err(RelayError::SendFailed(error));
        }

        inner.sent_messages.push(message.clone());
        Ok(())
    }

    async fn leave_match(&self, match_id: &MatchId) -> Result<(), RelayError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("leave:{}", match_id));

        if !inner.connected {
            return Err(RelayError::NotConnected);
        }
        inner.left_matches.push(match_id.clone());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.connected
    }

    fn disconnect(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.connected {
            inner.calls.push("disconnect".to_string());
        }
        inner.connected = false;
        inner.match_data_tx = None;
        inner.presence_tx = None;
    }
}

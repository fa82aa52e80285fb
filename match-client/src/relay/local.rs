//! In-process relay.
//!
//! [`LocalRelayHub`] plays the part of the matchmaking service for several
//! clients living in one process. Each client gets its own [`LocalRelay`]
//! handle. Semantics follow what the session core relies on:
//! - a named create fails if the room exists
//! - a join fails if the room is missing or already has two participants
//! - a join is announced to every member, the joiner included
//! - a leave is announced to the remaining members
//! - match data goes to every member except the sender

use super::{AuthSession, Relay, RelayError, RelayEvents};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tictac_match_types::{
    MatchData, MatchHandle, MatchId, MoveMessage, ParticipantId, Payload, PresenceEvent, RoomId,
};
use tokio::sync::mpsc;

/// Seats per match.
pub const ROOM_CAPACITY: usize = 2;

/// Shared state of the in-process relay.
#[derive(Debug, Clone, Default)]
pub struct LocalRelayHub {
    inner: Arc<Mutex<HubInner>>,
}

#[derive(Debug, Default)]
struct HubInner {
    rooms: HashMap<MatchId, Vec<Member>>,
    users: u64,
}

#[derive(Debug, Clone)]
struct Member {
    id: ParticipantId,
    match_data: mpsc::UnboundedSender<MatchData>,
    presence: mpsc::UnboundedSender<PresenceEvent>,
}

impl LocalRelayHub {
    /// A hub with no rooms.
    pub fn new() -> Self {
        Self::default()
    }

    /// A new client handle attached to this hub.
    pub fn client(&self) -> LocalRelay {
        LocalRelay {
            hub: self.clone(),
            state: Mutex::new(ClientState::default()),
        }
    }

    /// Number of participants in a match, `None` if it does not exist.
    pub fn room_size(&self, match_id: &MatchId) -> Option<usize> {
        self.lock().rooms.get(match_id).map(Vec::len)
    }

    /// Number of open matches.
    pub fn room_count(&self) -> usize {
        self.lock().rooms.len()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove_member(&self, match_id: &MatchId, id: &ParticipantId) -> bool {
        let mut hub = self.lock();
        let Some(members) = hub.rooms.get_mut(match_id) else {
            return false;
        };
        let before = members.len();
        members.retain(|m| m.id != *id);
        if members.len() == before {
            return false;
        }

        let event = PresenceEvent::left([id.clone()]).in_match(match_id.clone());
        for member in members.iter() {
            let _ = member.presence.send(event.clone());
        }
        if members.is_empty() {
            hub.rooms.remove(match_id);
        }
        true
    }
}

#[derive(Debug, Default)]
struct ClientState {
    user: Option<ParticipantId>,
    connected: bool,
    subscribed: bool,
    match_data_tx: Option<mpsc::UnboundedSender<MatchData>>,
    presence_tx: Option<mpsc::UnboundedSender<PresenceEvent>>,
    matches: Vec<MatchId>,
}

/// One client's connection to a [`LocalRelayHub`].
#[derive(Debug)]
pub struct LocalRelay {
    hub: LocalRelayHub,
    state: Mutex<ClientState>,
}

impl LocalRelay {
    fn state(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// This client as a room member, if connected and subscribed.
    fn member(&self) -> Result<Member, RelayError> {
        let state = self.state();
        if !state.connected {
            return Err(RelayError::NotConnected);
        }
        let id = state.user.clone().ok_or(RelayError::NotConnected)?;
        match (&state.match_data_tx, &state.presence_tx) {
            (Some(match_data), Some(presence)) => Ok(Member {
                id,
                match_data: match_data.clone(),
                presence: presence.clone(),
            }),
            _ => Err(RelayError::Rejected("subscribe before joining a match".into())),
        }
    }
}

#[async_trait]
impl Relay for LocalRelay {
    async fn authenticate(&self, username: &str) -> Result<AuthSession, RelayError> {
        if username.trim().is_empty() {
            return Err(RelayError::AuthenticationFailed("empty username".into()));
        }

        let serial = {
            let mut hub = self.hub.lock();
            hub.users += 1;
            hub.users
        };
        let user_id = ParticipantId::new(format!("{}#{}", username, serial));
        self.state().user = Some(user_id.clone());
        Ok(AuthSession {
            user_id,
            username: username.to_string(),
        })
    }

    async fn connect(&self, _address: &str, auth: &AuthSession) -> Result<(), RelayError> {
        let mut state = self.state();
        if state.user.as_ref() != Some(&auth.user_id) {
            return Err(RelayError::ConnectionFailed("unknown session".into()));
        }
        state.connected = true;
        Ok(())
    }

    fn subscribe(&self) -> Result<RelayEvents, RelayError> {
        let mut state = self.state();
        if !state.connected {
            return Err(RelayError::NotConnected);
        }
        if state.subscribed {
            return Err(RelayError::AlreadySubscribed);
        }

        let (match_data_tx, match_data) = mpsc::unbounded_channel();
        let (presence_tx, presence) = mpsc::unbounded_channel();
        state.match_data_tx = Some(match_data_tx);
        state.presence_tx = Some(presence_tx);
        state.subscribed = true;
        Ok(RelayEvents {
            match_data,
            presence,
        })
    }

    async fn create_match(&self, room: Option<&RoomId>) -> Result<MatchHandle, RelayError> {
        let member = self.member()?;
        let match_id = match room {
            Some(room) => MatchId::new(room.as_str()),
            None => MatchId::generate(),
        };

        {
            let mut hub = self.hub.lock();
            if hub.rooms.contains_key(&match_id) {
                return Err(RelayError::RoomExists(match_id.to_string()));
            }
            hub.rooms.insert(match_id.clone(), vec![member.clone()]);
        }

        self.state().matches.push(match_id.clone());
        Ok(MatchHandle {
            match_id,
            self_id: member.id,
            presences: Vec::new(),
        })
    }

    async fn join_match(&self, room: &RoomId) -> Result<MatchHandle, RelayError> {
        let member = self.member()?;
        let match_id = MatchId::new(room.as_str());

        let presences = {
            let mut hub = self.hub.lock();
            let members = hub
                .rooms
                .get_mut(&match_id)
                .ok_or_else(|| RelayError::RoomNotFound(room.to_string()))?;
            if members.iter().any(|m| m.id == member.id) {
                return Err(RelayError::Rejected("already in match".into()));
            }
            if members.len() >= ROOM_CAPACITY {
                return Err(RelayError::RoomFull(room.to_string()));
            }

            let presences: Vec<ParticipantId> = members.iter().map(|m| m.id.clone()).collect();
            members.push(member.clone());

            let event = PresenceEvent::joined([member.id.clone()]).in_match(match_id.clone());
            for m in members.iter() {
                let _ = m.presence.send(event.clone());
            }
            presences
        };

        self.state().matches.push(match_id.clone());
        Ok(MatchHandle {
            match_id,
            self_id: member.id,
            presences,
        })
    }

    async fn send_match_data(&self, message: &MoveMessage) -> Result<(), RelayError> {
        let member = self.member()?;
        let hub = self.hub.lock();
        let members = hub
            .rooms
            .get(&message.match_id)
            .ok_or_else(|| RelayError::SendFailed(format!("no match {}", message.match_id)))?;
        if !members.iter().any(|m| m.id == member.id) {
            return Err(RelayError::SendFailed("not a member of the match".into()));
        }

        let data = MatchData {
            match_id: message.match_id.clone(),
            op_code: message.op_code,
            sender: Some(member.id.clone()),
            data: Payload::Bytes(message.payload.clone()),
        };
        for m in members.iter().filter(|m| m.id != member.id) {
            let _ = m.match_data.send(data.clone());
        }
        Ok(())
    }

    async fn leave_match(&self, match_id: &MatchId) -> Result<(), RelayError> {
        let id = {
            let mut state = self.state();
            if !state.connected {
                return Err(RelayError::NotConnected);
            }
            state.matches.retain(|m| m != match_id);
            state.user.clone().ok_or(RelayError::NotConnected)?
        };
        if !self.hub.remove_member(match_id, &id) {
            return Err(RelayError::Rejected(format!("not in match {}", match_id)));
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state().connected
    }

    fn disconnect(&self) {
        let (id, matches) = {
            let mut state = self.state();
            state.connected = false;
            state.match_data_tx = None;
            state.presence_tx = None;
            (state.user.clone(), std::mem::take(&mut state.matches))
        };
        if let Some(id) = id {
            for match_id in &matches {
                self.hub.remove_member(match_id, &id);
            }
        }
    }
}

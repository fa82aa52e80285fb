//! Match acquisition state machine.
//!
//! Two clients that start at about the same time both try to create the
//! well-known room. Whoever lands first owns it; the other falls back to
//! joining it. If joining fails too, a fresh match with a relay-generated id
//! is created and its id has to be shared by hand.
//!
//! ```text
//! Idle ─Start→ CreatingNamed ─fail→ JoiningNamed ─fail→ CreatingFresh ─fail→ Failed
//!                   │ok                 │ok                  │ok
//!                   ▼                   ▼                    ▼
//!            Acquired(X)     Acquired(unassigned)      Acquired(X)
//! ```
//!
//! Steps run strictly one after another. The machine only says what to try
//! next; the client performs the relay calls and feeds back the results.

use std::fmt;
use thiserror::Error;
use tictac_match_types::{Mark, MatchHandle, Role, RoomId};

use crate::Status;

/// All three acquisition attempts failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "match acquisition failed (create: {create}; join: {join}; fresh create: {fresh})"
)]
pub struct AcquisitionError {
    /// Why creating the named room failed.
    pub create: String,
    /// Why joining the named room failed.
    pub join: String,
    /// Why creating a fresh match failed.
    pub fresh: String,
}

/// Which step produced the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionPath {
    /// Created the well-known room.
    Created,
    /// Joined the well-known room.
    Joined,
    /// Created a fresh match with a generated id.
    CreatedFresh,
}

impl fmt::Display for AcquisitionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionPath::Created => f.write_str("created"),
            AcquisitionPath::Joined => f.write_str("joined"),
            AcquisitionPath::CreatedFresh => f.write_str("created fresh"),
        }
    }
}

/// A successfully acquired match and the initial role hypothesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquired {
    /// The match handle returned by the relay.
    pub handle: MatchHandle,
    /// How it was obtained.
    pub path: AcquisitionPath,
}

impl Acquired {
    /// Creators play X; a joiner's role is settled later by presence.
    pub fn role(&self) -> Role {
        match self.path {
            AcquisitionPath::Created | AcquisitionPath::CreatedFresh => Role::X,
            AcquisitionPath::Joined => Role::Unassigned,
        }
    }

    /// X always moves first.
    pub fn initial_turn(&self) -> Mark {
        Mark::X
    }

    /// Status line for the new match.
    pub fn status(&self) -> Status {
        match self.path {
            AcquisitionPath::Created => Status::MatchCreated,
            AcquisitionPath::Joined => Status::JoinedAwaitingRole,
            AcquisitionPath::CreatedFresh => {
                Status::ShareMatchId(self.handle.match_id.short().to_string())
            }
        }
    }
}

/// Acquisition state - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionState {
    /// Not started.
    Idle {
        /// Well-known room to race for.
        room: RoomId,
    },
    /// Waiting for `create(room)`.
    CreatingNamed {
        /// Well-known room.
        room: RoomId,
    },
    /// Create failed; waiting for `join(room)`.
    JoiningNamed {
        /// Well-known room.
        room: RoomId,
        /// Why create failed.
        create_error: String,
    },
    /// Join failed; waiting for `create()` without a name.
    CreatingFresh {
        /// Why create failed.
        create_error: String,
        /// Why join failed.
        join_error: String,
    },
    /// Done.
    Acquired(Acquired),
    /// Every step failed.
    Failed(AcquisitionError),
}

/// Inputs to the acquisition machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionEvent {
    /// Begin the fallback chain.
    Start,
    /// The pending relay call returned a match.
    Succeeded(MatchHandle),
    /// The pending relay call failed.
    Failed {
        /// Error message describing the failure.
        error: String,
    },
}

/// Relay calls and results the client must act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionAction {
    /// Call `create` with the room name, or with no name for a fresh match.
    Create(Option<RoomId>),
    /// Call `join` with the room name.
    Join(RoomId),
    /// Acquisition finished.
    Complete(Acquired),
    /// Acquisition failed for good.
    Abort(AcquisitionError),
}

impl AcquisitionState {
    /// A machine that will race for `room`.
    pub fn new(room: RoomId) -> Self {
        Self::Idle { room }
    }

    /// Process an event and return the new state plus actions to execute.
    pub fn on_event(self, event: AcquisitionEvent) -> (Self, Vec<AcquisitionAction>) {
        match (self, event) {
            (Self::Idle { room }, AcquisitionEvent::Start) => {
                let action = AcquisitionAction::Create(Some(room.clone()));
                (Self::CreatingNamed { room }, vec![action])
            }

            // Step 1: create the well-known room
            (Self::CreatingNamed { .. }, AcquisitionEvent::Succeeded(handle)) => {
                complete(handle, AcquisitionPath::Created)
            }
            (Self::CreatingNamed { room }, AcquisitionEvent::Failed { error }) => {
                let action = AcquisitionAction::Join(room.clone());
                (
                    Self::JoiningNamed {
                        room,
                        create_error: error,
                    },
                    vec![action],
                )
            }

            // Step 2: join it
            (Self::JoiningNamed { .. }, AcquisitionEvent::Succeeded(handle)) => {
                complete(handle, AcquisitionPath::Joined)
            }
            (Self::JoiningNamed { create_error, .. }, AcquisitionEvent::Failed { error }) => (
                Self::CreatingFresh {
                    create_error,
                    join_error: error,
                },
                vec![AcquisitionAction::Create(None)],
            ),

            // Step 3: create a fresh match
            (Self::CreatingFresh { .. }, AcquisitionEvent::Succeeded(handle)) => {
                complete(handle, AcquisitionPath::CreatedFresh)
            }
            (
                Self::CreatingFresh {
                    create_error,
                    join_error,
                },
                AcquisitionEvent::Failed { error },
            ) => {
                let err = AcquisitionError {
                    create: create_error,
                    join: join_error,
                    fresh: error,
                };
                (
                    Self::Failed(err.clone()),
                    vec![AcquisitionAction::Abort(err)],
                )
            }

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// Whether a relay call is outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::CreatingNamed { .. } | Self::JoiningNamed { .. } | Self::CreatingFresh { .. }
        )
    }

    /// Whether the machine reached a final state.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Acquired(_) | Self::Failed(_))
    }
}

fn complete(
    handle: MatchHandle,
    path: AcquisitionPath,
) -> (AcquisitionState, Vec<AcquisitionAction>) {
    let acquired = Acquired { handle, path };
    (
        AcquisitionState::Acquired(acquired.clone()),
        vec![AcquisitionAction::Complete(acquired)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictac_match_types::{MatchId, ParticipantId};

    fn room() -> RoomId {
        RoomId::new("room1")
    }

    fn handle(id: &str) -> MatchHandle {
        MatchHandle {
            match_id: MatchId::new(id),
            self_id: ParticipantId::new("me"),
            presences: vec![],
        }
    }

    fn failed(error: &str) -> AcquisitionEvent {
        AcquisitionEvent::Failed {
            error: error.into(),
        }
    }

    #[test]
    fn start_creates_named_room() {
        let (state, actions) = AcquisitionState::new(room()).on_event(AcquisitionEvent::Start);

        assert!(matches!(state, AcquisitionState::CreatingNamed { .. }));
        assert_eq!(actions, vec![AcquisitionAction::Create(Some(room()))]);
        assert!(state.is_pending());
    }

    #[test]
    fn create_success_makes_creator_x() {
        let (state, _) = AcquisitionState::new(room()).on_event(AcquisitionEvent::Start);
        let (state, actions) = state.on_event(AcquisitionEvent::Succeeded(handle("room1")));

        assert!(state.is_finished());
        match &actions[..] {
            [AcquisitionAction::Complete(acquired)] => {
                assert_eq!(acquired.path, AcquisitionPath::Created);
                assert_eq!(acquired.role(), Role::X);
                assert_eq!(acquired.initial_turn(), Mark::X);
                assert_eq!(acquired.status(), Status::MatchCreated);
            }
            other => panic!("Expected Complete, got {:?}", other),
        }
    }

    #[test]
    fn create_failure_falls_back_to_join() {
        let (state, _) = AcquisitionState::new(room()).on_event(AcquisitionEvent::Start);
        let (state, actions) = state.on_event(failed("room exists"));

        assert!(matches!(state, AcquisitionState::JoiningNamed { .. }));
        assert_eq!(actions, vec![AcquisitionAction::Join(room())]);
    }

    #[test]
    fn join_success_leaves_role_unassigned() {
        let (state, _) = AcquisitionState::new(room()).on_event(AcquisitionEvent::Start);
        let (state, _) = state.on_event(failed("room exists"));
        let (_, actions) = state.on_event(AcquisitionEvent::Succeeded(handle("room1")));

        match &actions[..] {
            [AcquisitionAction::Complete(acquired)] => {
                assert_eq!(acquired.path, AcquisitionPath::Joined);
                assert_eq!(acquired.role(), Role::Unassigned);
                assert_eq!(acquired.status(), Status::JoinedAwaitingRole);
            }
            other => panic!("Expected Complete, got {:?}", other),
        }
    }

    #[test]
    fn join_failure_creates_fresh_match() {
        let (state, _) = AcquisitionState::new(room()).on_event(AcquisitionEvent::Start);
        let (state, _) = state.on_event(failed("room exists"));
        let (state, actions) = state.on_event(failed("room full"));

        assert!(matches!(state, AcquisitionState::CreatingFresh { .. }));
        assert_eq!(actions, vec![AcquisitionAction::Create(None)]);

        let (_, actions) =
            state.on_event(AcquisitionEvent::Succeeded(handle("0123456789abcdef")));
        match &actions[..] {
            [AcquisitionAction::Complete(acquired)] => {
                assert_eq!(acquired.path, AcquisitionPath::CreatedFresh);
                assert_eq!(acquired.role(), Role::X);
                assert_eq!(acquired.status(), Status::ShareMatchId("01234567".into()));
            }
            other => panic!("Expected Complete, got {:?}", other),
        }
    }

    #[test]
    fn all_failures_abort_with_every_cause() {
        let (state, _) = AcquisitionState::new(room()).on_event(AcquisitionEvent::Start);
        let (state, _) = state.on_event(failed("room exists"));
        let (state, _) = state.on_event(failed("room full"));
        let (state, actions) = state.on_event(failed("relay down"));

        assert!(matches!(state, AcquisitionState::Failed(_)));
        let expected = AcquisitionError {
            create: "room exists".into(),
            join: "room full".into(),
            fresh: "relay down".into(),
        };
        assert_eq!(actions, vec![AcquisitionAction::Abort(expected.clone())]);
        assert!(expected.to_string().contains("relay down"));
    }

    #[test]
    fn events_before_start_are_ignored() {
        let state = AcquisitionState::new(room());
        let (state, actions) = state.on_event(AcquisitionEvent::Succeeded(handle("x")));
        assert!(matches!(state, AcquisitionState::Idle { .. }));
        assert!(actions.is_empty());
    }

    #[test]
    fn finished_machine_ignores_further_events() {
        let (state, _) = AcquisitionState::new(room()).on_event(AcquisitionEvent::Start);
        let (state, _) = state.on_event(AcquisitionEvent::Succeeded(handle("room1")));
        let (state, actions) = state.on_event(failed("late"));

        assert!(matches!(state, AcquisitionState::Acquired(_)));
        assert!(actions.is_empty());
    }
}

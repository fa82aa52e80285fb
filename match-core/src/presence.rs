//! Presence interpretation.
//!
//! Turns join/leave notifications into role and turn transitions. The
//! interpreter only decides; the caller applies the returned
//! [`PresenceAction`]s to its [`TurnCoordinator`](crate::TurnCoordinator)
//! and status line, in order.
//!
//! A match has two seats. The interpreter remembers the local participant and
//! the opponent; a join from anybody else while an opponent is known is
//! rejected instead of reshuffling roles.

use tictac_match_types::{Mark, MatchHandle, ParticipantId, PresenceEvent, Role};

use crate::Status;

/// Instruction produced by the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceAction {
    /// Set the local role (only ever O; X is assigned at creation).
    AssignRole(Mark),
    /// Set the mark expected to move next.
    ResetTurn(Mark),
    /// Two participants present again: accept local moves.
    Resume,
    /// Opponent gone: refuse local moves.
    Pause,
    /// A third participant tried to take a seat.
    RejectJoin(ParticipantId),
    /// Show a new status line.
    EmitStatus(Status),
}

/// Tracks who occupies the two seats of a match.
#[derive(Debug, Clone, Default)]
pub struct PresenceInterpreter {
    local: Option<ParticipantId>,
    opponent: Option<ParticipantId>,
    rejected: Vec<ParticipantId>,
}

impl PresenceInterpreter {
    /// An interpreter that knows nobody yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the local participant and anyone already present from a freshly
    /// acquired match.
    pub fn seed(&mut self, handle: &MatchHandle) {
        self.local = Some(handle.self_id.clone());
        self.opponent = handle
            .presences
            .iter()
            .find(|p| **p != handle.self_id)
            .cloned();
        self.rejected.clear();
    }

    /// The known opponent, if any.
    pub fn opponent(&self) -> Option<&ParticipantId> {
        self.opponent.as_ref()
    }

    /// Interpret one presence event given the current local role.
    pub fn interpret(&mut self, role: Role, event: &PresenceEvent) -> Vec<PresenceAction> {
        let mut actions = Vec::new();

        let mut accepted = false;
        for participant in &event.joins {
            if self.local.as_ref() == Some(participant) {
                accepted = true;
                continue;
            }
            match &self.opponent {
                None => {
                    self.opponent = Some(participant.clone());
                    accepted = true;
                }
                Some(known) if known == participant => accepted = true,
                Some(_) => {
                    if !self.rejected.contains(participant) {
                        self.rejected.push(participant.clone());
                    }
                    actions.push(PresenceAction::RejectJoin(participant.clone()));
                }
            }
        }

        if accepted {
            actions.push(PresenceAction::Resume);
            match role {
                Role::Unassigned => {
                    // The pre-existing participant must be X and has not moved.
                    actions.push(PresenceAction::AssignRole(Mark::O));
                    actions.push(PresenceAction::ResetTurn(Mark::X));
                    actions.push(PresenceAction::EmitStatus(Status::WaitingForX));
                }
                Role::X => {
                    // Unconditional, even if a move is already in flight.
                    actions.push(PresenceAction::ResetTurn(Mark::X));
                    actions.push(PresenceAction::EmitStatus(Status::OpponentJoinedYourTurn));
                }
                Role::O => {
                    actions.push(PresenceAction::EmitStatus(Status::OpponentJoined));
                }
            }
        }

        let mut opponent_left = false;
        for participant in &event.leaves {
            if self.local.as_ref() == Some(participant) {
                continue;
            }
            if let Some(pos) = self.rejected.iter().position(|r| r == participant) {
                self.rejected.remove(pos);
                continue;
            }
            if self.opponent.as_ref() == Some(participant) {
                self.opponent = None;
            }
            opponent_left = true;
        }

        if opponent_left {
            actions.push(PresenceAction::Pause);
            actions.push(PresenceAction::EmitStatus(Status::OpponentLeft));
        }

        actions
    }
}

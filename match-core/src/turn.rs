//! Turn coordination for a single match.
//!
//! [`TurnCoordinator`] owns the board, the local role and whose turn it is.
//! It accepts or rejects local moves and applies remote snapshots. Like the
//! rest of this crate it performs no I/O: an accepted local move yields a
//! [`MoveMessage`] that the caller is responsible for sending.

use thiserror::Error;
use tictac_match_types::{
    codec, Board, Mark, MatchId, MalformedPayload, MoveMessage, Payload, Role,
};

use crate::{outcome, GameOutcome, Status};

/// Whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnState {
    /// The mark expected to move next.
    pub active_role: Mark,
    /// Whether the next move must come from the opponent.
    pub awaiting_remote: bool,
}

/// Turn phase from the local player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Local role not assigned yet.
    Unassigned,
    /// The local player (holding this mark) may move.
    LocalTurn(Mark),
    /// The opponent is expected to move; carries the local mark.
    RemoteTurn(Mark),
}

/// Why a local move was not accepted.
///
/// These are UI-level guards, not protocol faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejected {
    /// No match has been acquired yet.
    #[error("no match acquired")]
    NoMatch,
    /// Role not assigned yet.
    #[error("role not assigned")]
    RoleUnassigned,
    /// The opponent left; waiting for a new join.
    #[error("opponent absent")]
    OpponentAbsent,
    /// The game already ended.
    #[error("game is over")]
    GameOver,
    /// It is the opponent's turn.
    #[error("not your turn")]
    NotYourTurn,
    /// Cell index beyond the board.
    #[error("cell {0} is out of range")]
    OutOfRange(usize),
    /// Cell already holds a mark.
    #[error("cell {0} is occupied")]
    CellOccupied(usize),
}

/// Board and turn state for one match.
#[derive(Debug, Clone)]
pub struct TurnCoordinator {
    board: Board,
    role: Role,
    active: Mark,
    match_id: Option<MatchId>,
    paused: bool,
    outcome: Option<GameOutcome>,
}

impl TurnCoordinator {
    /// Empty board, unassigned role, X to move, no match.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            role: Role::Unassigned,
            active: Mark::X,
            match_id: None,
            paused: false,
            outcome: None,
        }
    }

    /// Record the acquired match. Moves are refused until this is called.
    pub fn attach_match(&mut self, match_id: MatchId) {
        self.match_id = Some(match_id);
    }

    /// Forget the match (explicit leave).
    pub fn detach_match(&mut self) -> Option<MatchId> {
        self.match_id.take()
    }

    /// Assign the local role.
    ///
    /// Roles are immutable once set: returns `false` and keeps the existing
    /// role if a different one was already assigned.
    pub fn assign_role(&mut self, mark: Mark) -> bool {
        match self.role.mark() {
            None => {
                self.role = Role::from(mark);
                true
            }
            Some(existing) => existing == mark,
        }
    }

    /// Set the mark expected to move next.
    pub fn reset_turn(&mut self, active: Mark) {
        self.active = active;
    }

    /// Refuse local moves until [`resume`](Self::resume).
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Accept local moves again.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Attempt a local move at `cell`.
    ///
    /// On success the board is updated, the turn passes to the opponent and
    /// the returned message carries the full snapshot to transmit. On
    /// rejection nothing changes.
    pub fn local_move(&mut self, cell: usize) -> Result<MoveMessage, MoveRejected> {
        let match_id = self.match_id.clone().ok_or(MoveRejected::NoMatch)?;
        if self.outcome.is_some() {
            return Err(MoveRejected::GameOver);
        }
        if self.paused {
            return Err(MoveRejected::OpponentAbsent);
        }
        let mine = self.role.mark().ok_or(MoveRejected::RoleUnassigned)?;
        if self.active != mine {
            return Err(MoveRejected::NotYourTurn);
        }
        if cell >= self.board.cells().len() {
            return Err(MoveRejected::OutOfRange(cell));
        }
        let board = self
            .board
            .with_mark(cell, mine)
            .ok_or(MoveRejected::CellOccupied(cell))?;

        self.board = board;
        self.active = mine.opponent();
        self.outcome = outcome::evaluate(&self.board);
        Ok(MoveMessage::new(match_id, &self.board))
    }

    /// Decode a remote payload and apply it.
    ///
    /// On a decode error the board and turn are left untouched.
    pub fn apply_remote(&mut self, payload: &Payload) -> Result<&Board, MalformedPayload> {
        let board = codec::decode(payload)?;
        self.apply_snapshot(board);
        Ok(&self.board)
    }

    /// Replace the board wholesale with a remote snapshot and pass the turn.
    ///
    /// Snapshots are authoritative: move counts are not checked, so an out of
    /// order or hostile snapshot is applied as-is.
    pub fn apply_snapshot(&mut self, board: Board) {
        self.board = board;
        self.active = self.active.opponent();
        self.outcome = outcome::evaluate(&self.board);
    }

    /// Current turn state.
    pub fn state(&self) -> TurnState {
        TurnState {
            active_role: self.active,
            awaiting_remote: self.role.mark() != Some(self.active),
        }
    }

    /// Current phase from the local point of view.
    pub fn phase(&self) -> TurnPhase {
        match self.role.mark() {
            None => TurnPhase::Unassigned,
            Some(mine) if mine == self.active => TurnPhase::LocalTurn(mine),
            Some(mine) => TurnPhase::RemoteTurn(mine),
        }
    }

    /// Status line describing the current turn.
    pub fn turn_status(&self) -> Status {
        if let Some(outcome) = self.outcome {
            return Status::Finished(outcome);
        }
        match self.phase() {
            TurnPhase::Unassigned => Status::JoinedAwaitingRole,
            TurnPhase::LocalTurn(_) => Status::YourTurn,
            TurnPhase::RemoteTurn(_) => Status::OpponentsTurn,
        }
    }

    /// The current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The local role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The attached match, if any.
    pub fn match_id(&self) -> Option<&MatchId> {
        self.match_id.as_ref()
    }

    /// Whether moves are paused for an absent opponent.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Outcome once the game has ended.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }
}

impl Default for TurnCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

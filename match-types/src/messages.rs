//! Messages exchanged with the relay.
//!
//! Outbound moves are [`MoveMessage`]s; inbound traffic arrives as
//! [`MatchData`] and [`PresenceEvent`]. [`MatchHandle`] is what a successful
//! create or join returns.

use serde::{Deserialize, Serialize};

use crate::{codec, Board, MatchId, ParticipantId, Payload};

/// Application-defined tag distinguishing the purpose of match data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpCode(pub i64);

impl OpCode {
    /// A move carrying a full board snapshot.
    pub const MOVE: OpCode = OpCode(1);
}

/// A locally accepted move, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveMessage {
    /// Match the move belongs to
    pub match_id: MatchId,
    /// Always [`OpCode::MOVE`]
    pub op_code: OpCode,
    /// The entire board after the move, encoded by [`codec::encode`]
    pub payload: Vec<u8>,
}

impl MoveMessage {
    /// Build a move message for the given board snapshot.
    pub fn new(match_id: MatchId, board: &Board) -> Self {
        Self {
            match_id,
            op_code: OpCode::MOVE,
            payload: codec::encode(board),
        }
    }
}

/// Inbound match data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchData {
    /// Match the data was sent in
    pub match_id: MatchId,
    /// Purpose of the data
    pub op_code: OpCode,
    /// Sender, when the relay reports it
    pub sender: Option<ParticipantId>,
    /// Untyped body
    pub data: Payload,
}

/// Participants joining or leaving a match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceEvent {
    /// Match the event belongs to
    pub match_id: Option<MatchId>,
    /// Participants that arrived
    pub joins: Vec<ParticipantId>,
    /// Participants that departed
    pub leaves: Vec<ParticipantId>,
}

impl PresenceEvent {
    /// A presence event with only joins.
    pub fn joined(joins: impl IntoIterator<Item = ParticipantId>) -> Self {
        Self {
            match_id: None,
            joins: joins.into_iter().collect(),
            leaves: Vec::new(),
        }
    }

    /// A presence event with only leaves.
    pub fn left(leaves: impl IntoIterator<Item = ParticipantId>) -> Self {
        Self {
            match_id: None,
            joins: Vec::new(),
            leaves: leaves.into_iter().collect(),
        }
    }

    /// Tag the event with its match.
    pub fn in_match(mut self, match_id: MatchId) -> Self {
        self.match_id = Some(match_id);
        self
    }
}

/// A match acquired by create or join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchHandle {
    /// Relay identifier of the match
    pub match_id: MatchId,
    /// The local participant as the relay knows it
    pub self_id: ParticipantId,
    /// Other participants already present at acquisition time
    pub presences: Vec<ParticipantId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mark;

    #[test]
    fn move_message_uses_move_opcode() {
        let board = Board::new().with_mark(4, Mark::X).unwrap();
        let msg = MoveMessage::new(MatchId::new("m1"), &board);
        assert_eq!(msg.op_code, OpCode::MOVE);
        assert_eq!(msg.op_code.0, 1);
        assert_eq!(codec::decode(&Payload::Bytes(msg.payload)).unwrap(), board);
    }

    #[test]
    fn presence_builders() {
        let joined = PresenceEvent::joined([ParticipantId::new("b")]).in_match(MatchId::new("m"));
        assert_eq!(joined.joins.len(), 1);
        assert!(joined.leaves.is_empty());
        assert_eq!(joined.match_id, Some(MatchId::new("m")));

        let left = PresenceEvent::left([ParticipantId::new("b")]);
        assert!(left.joins.is_empty());
        assert_eq!(left.leaves, vec![ParticipantId::new("b")]);
    }
}

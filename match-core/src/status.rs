//! Human-readable session status for the presentation layer.

use std::fmt;
use tictac_match_types::Mark;

use crate::GameOutcome;

/// Status line shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Session not started yet.
    Connecting,
    /// Authentication succeeded.
    Authenticated,
    /// Transport connected, acquiring a match.
    Connected,
    /// Created the well-known room; playing X.
    MatchCreated,
    /// Joined the well-known room; role not known yet.
    JoinedAwaitingRole,
    /// Created a fresh match that must be shared by hand.
    ShareMatchId(String),
    /// Assigned O; X moves first.
    WaitingForX,
    /// Playing X and an opponent arrived.
    OpponentJoinedYourTurn,
    /// An opponent arrived (role already settled).
    OpponentJoined,
    /// Opponent left; moves are paused.
    OpponentLeft,
    /// Local player may move.
    YourTurn,
    /// Waiting for the opponent's move.
    OpponentsTurn,
    /// Game over.
    Finished(GameOutcome),
    /// Left the match; still connected.
    LeftMatch,
    /// Disconnected from the relay.
    Closed,
    /// Fatal error; the session cannot continue.
    Failed(String),
}

impl Status {
    /// Whether this status ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Failed(_) | Status::Closed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Connecting => f.write_str("connecting"),
            Status::Authenticated => f.write_str("authenticated"),
            Status::Connected => f.write_str("connected, creating or joining match"),
            Status::MatchCreated => write!(
                f,
                "match created, you are {}, waiting for opponent",
                Mark::X
            ),
            Status::JoinedAwaitingRole => f.write_str("joined match, waiting to be assigned symbol"),
            Status::ShareMatchId(id) => {
                write!(f, "match created, share this id with opponent: {}", id)
            }
            Status::WaitingForX => f.write_str("waiting for X"),
            Status::OpponentJoinedYourTurn => f.write_str("opponent joined, your turn"),
            Status::OpponentJoined => f.write_str("opponent joined"),
            Status::OpponentLeft => f.write_str("opponent left"),
            Status::YourTurn => f.write_str("your turn"),
            Status::OpponentsTurn => f.write_str("opponent's turn"),
            Status::Finished(outcome) => write!(f, "game over: {}", outcome),
            Status::LeftMatch => f.write_str("left match"),
            Status::Closed => f.write_str("disconnected"),
            Status::Failed(reason) => write!(f, "error: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_statuses_match_protocol_wording() {
        assert_eq!(Status::WaitingForX.to_string(), "waiting for X");
        assert_eq!(
            Status::OpponentJoinedYourTurn.to_string(),
            "opponent joined, your turn"
        );
        assert_eq!(Status::OpponentLeft.to_string(), "opponent left");
    }

    #[test]
    fn share_status_includes_id() {
        let status = Status::ShareMatchId("01234567".into());
        assert!(status.to_string().ends_with("01234567"));
    }

    #[test]
    fn terminal_statuses() {
        assert!(Status::Failed("boom".into()).is_terminal());
        assert!(Status::Closed.is_terminal());
        assert!(!Status::Finished(GameOutcome::Draw).is_terminal());
        assert!(!Status::YourTurn.is_terminal());
    }
}

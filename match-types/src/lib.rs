//! # match-types
//!
//! Wire format types for the two-player tic-tac-toe match protocol.
//!
//! This crate provides the foundational types used across all match crates:
//! - [`MatchId`], [`RoomId`], [`ParticipantId`] - Identity types
//! - [`Board`], [`Mark`], [`Role`] - Game state
//! - [`codec`] - Board snapshot encoding (JSON array, UTF-8)
//! - [`MoveMessage`], [`MatchData`], [`PresenceEvent`], [`MatchHandle`] - Relay messages
//! - [`MalformedPayload`] - Decode errors

#![warn(missing_docs)]
#![warn(clippy::all)]

mod board;
pub mod codec;
mod error;
mod ids;
mod messages;

pub use board::{Board, Mark, Role, BOARD_CELLS};
pub use codec::Payload;
pub use error::MalformedPayload;
pub use ids::{MatchId, ParticipantId, RoomId, DEFAULT_ROOM, SHORT_ID_LEN};
pub use messages::{MatchData, MatchHandle, MoveMessage, OpCode, PresenceEvent};

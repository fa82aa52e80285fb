//! Identity types for the match protocol.
//!
//! All identifiers are opaque strings owned by the external relay. They are
//! wrapped in newtypes so a room name can never be passed where a match id is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known room name both clients race to create.
pub const DEFAULT_ROOM: &str = "tictactoe_room_1";

/// Number of leading characters shown when a match id is shared by hand.
pub const SHORT_ID_LEN: usize = 8;

/// Identifier of a match on the relay.
///
/// Either derived from a well-known room name or generated by the relay
/// (UUID v4 format) when no name is given.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchId(String);

impl MatchId {
    /// Wrap an identifier issued by the relay.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first [`SHORT_ID_LEN`] characters, for out-of-band sharing.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(SHORT_ID_LEN) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MatchId({})", self.short())
    }
}

/// A well-known room name used for matchmaking-by-name.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    /// Create a room name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The room name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new(DEFAULT_ROOM)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoomId({})", self.0)
    }
}

/// A participant in a match, as identified by the relay.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Wrap a participant identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticipantId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_match_ids_are_unique() {
        let a = MatchId::generate();
        let b = MatchId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn short_id_truncates_to_eight_chars() {
        let id = MatchId::new("0123456789abcdef");
        assert_eq!(id.short(), "01234567");
    }

    #[test]
    fn short_id_keeps_short_ids_whole() {
        let id = MatchId::new("abc");
        assert_eq!(id.short(), "abc");
    }

    #[test]
    fn match_id_debug_is_abbreviated() {
        let id = MatchId::new("0123456789abcdef");
        assert_eq!(format!("{:?}", id), "MatchId(01234567)");
    }

    #[test]
    fn default_room_is_well_known() {
        assert_eq!(RoomId::default().as_str(), "tictactoe_room_1");
    }
}

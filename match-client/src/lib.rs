//! # tictac-match-client
//!
//! Client session core for two-player tic-tac-toe over a realtime relay.
//!
//! This is the library a presentation layer drives: it connects, races for
//! a well-known room, settles who plays X and O, and keeps both boards in
//! sync by exchanging full board snapshots.
//!
//! ## Features
//!
//! - **Deterministic matchmaking**: create the named room, else join it, else
//!   create a fresh match whose id is shared by hand
//! - **Presence-driven roles**: the creator plays X, the joiner becomes O
//!   when the relay echoes its join
//! - **Relay Abstraction**: pluggable relay (in-process hub, mock)
//! - **Pure State Machines**: uses `tictac-match-core` for side-effect-free logic
//!
//! ## Example
//!
//! ```ignore
//! use tictac_match_client::{LocalRelayHub, Session, SessionConfig};
//!
//! let hub = LocalRelayHub::new();
//! let mut session = Session::new(SessionConfig::default(), hub.client());
//! session.start().await?;
//!
//! // X opens in the centre
//! session.play(4).await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod acquisition;
pub mod relay;
pub mod session;

pub use acquisition::acquire;
pub use relay::{
    AuthSession, LocalRelay, LocalRelayHub, MockRelay, Relay, RelayError, RelayEvents,
    ROOM_CAPACITY,
};
pub use session::{InboundEvent, Session, SessionConfig, SessionError, DEFAULT_RELAY_ADDRESS};

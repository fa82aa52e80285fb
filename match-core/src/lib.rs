//! # match-core
//!
//! Pure match logic (no I/O, instant tests).
//!
//! This crate implements the state machines behind a two-player match
//! without any network access:
//! - [`acquisition`] - create-or-join race resolution
//! - [`presence`] - role assignment from join/leave notifications
//! - [`turn`] - board ownership, move validation, snapshot application
//! - [`outcome`] - win/draw detection
//!
//! ## Design Philosophy
//!
//! Every module takes input and produces output without side effects. The
//! relay calls are performed by `match-client`, which interprets the actions
//! produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod acquisition;
pub mod outcome;
pub mod presence;
pub mod status;
pub mod turn;

pub use acquisition::{
    Acquired, AcquisitionAction, AcquisitionError, AcquisitionEvent, AcquisitionPath,
    AcquisitionState,
};
pub use outcome::GameOutcome;
pub use presence::{PresenceAction, PresenceInterpreter};
pub use status::Status;
pub use turn::{MoveRejected, TurnCoordinator, TurnPhase, TurnState};

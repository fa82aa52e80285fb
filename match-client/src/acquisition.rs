//! Drives the acquisition state machine against a relay.
//!
//! The fallback chain itself lives in [`AcquisitionState`]; this module only
//! performs the relay calls it asks for, strictly one at a time.

use tictac_match_core::{Acquired, AcquisitionAction, AcquisitionEvent, AcquisitionState};
use tictac_match_types::RoomId;
use tracing::{debug, info, warn};

use crate::relay::{Relay, RelayError};
use crate::session::SessionError;

/// Create the well-known room, else join it, else create a fresh match.
///
/// Each step starts only after the previous one failed. On total failure the
/// error carries every step's cause and the last relay error.
pub async fn acquire<R: Relay + ?Sized>(
    relay: &R,
    room: &RoomId,
) -> Result<Acquired, SessionError> {
    let mut state = AcquisitionState::new(room.clone());
    let mut event = AcquisitionEvent::Start;
    let mut last_error: Option<RelayError> = None;

    loop {
        let (next, actions) = state.on_event(event);
        state = next;

        let Some(action) = actions.into_iter().next() else {
            return Err(SessionError::Protocol(format!(
                "acquisition stalled in state {:?}",
                state
            )));
        };

        let result = match action {
            AcquisitionAction::Create(Some(room)) => {
                debug!(room = %room, "Creating named match");
                relay.create_match(Some(&room)).await
            }
            AcquisitionAction::Create(None) => {
                debug!("Creating fresh match");
                relay.create_match(None).await
            }
            AcquisitionAction::Join(room) => {
                debug!(room = %room, "Joining named match");
                relay.join_match(&room).await
            }
            AcquisitionAction::Complete(acquired) => {
                info!(
                    match_id = %acquired.handle.match_id,
                    path = %acquired.path,
                    "Match acquired"
                );
                return Ok(acquired);
            }
            AcquisitionAction::Abort(attempts) => {
                warn!(error = %attempts, "Match acquisition failed");
                return Err(SessionError::AcquisitionFailed {
                    attempts,
                    cause: last_error,
                });
            }
        };

        event = match result {
            Ok(handle) => AcquisitionEvent::Succeeded(handle),
            Err(e) => {
                debug!(error = %e, "Acquisition step failed");
                let error = e.to_string();
                last_error = Some(e);
                AcquisitionEvent::Failed { error }
            }
        };
    }
}

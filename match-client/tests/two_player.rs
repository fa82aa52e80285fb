//! Two players (and a latecomer) sharing one in-process relay.

use std::time::Duration;

use tictac_match_client::{InboundEvent, LocalRelay, LocalRelayHub, Session, SessionConfig};
use tictac_match_core::{AcquisitionPath, GameOutcome, Status, TurnPhase};
use tictac_match_types::{codec, Mark, Role, RoomId};

const ROOM: &str = "room1";

fn session(hub: &LocalRelayHub, name: &str) -> Session<LocalRelay> {
    let config = SessionConfig::new(RoomId::new(ROOM)).with_username(name);
    Session::new(config, hub.client())
}

async fn next(session: &mut Session<LocalRelay>) -> InboundEvent {
    tokio::time::timeout(Duration::from_secs(1), session.next_event())
        .await
        .expect("timed out waiting for event")
        .expect("event channels closed")
}

/// A created the room, B joined it, and both have seen B's join.
async fn seated(hub: &LocalRelayHub) -> (Session<LocalRelay>, Session<LocalRelay>) {
    let mut a = session(hub, "alice");
    a.start().await.unwrap();
    let mut b = session(hub, "bob");
    b.start().await.unwrap();

    next(&mut a).await;
    next(&mut b).await;
    (a, b)
}

#[tokio::test]
async fn creator_plays_x_and_joiner_plays_o() {
    let hub = LocalRelayHub::new();
    let mut a = session(&hub, "alice");
    a.start().await.unwrap();

    assert_eq!(a.acquisition_path(), Some(AcquisitionPath::Created));
    assert_eq!(a.role(), Role::X);
    assert_eq!(a.status(), Status::MatchCreated);

    let mut b = session(&hub, "bob");
    b.start().await.unwrap();
    assert_eq!(b.acquisition_path(), Some(AcquisitionPath::Joined));
    assert_eq!(b.role(), Role::Unassigned);
    assert_eq!(b.status(), Status::JoinedAwaitingRole);

    assert!(matches!(next(&mut b).await, InboundEvent::Presence(_)));
    assert_eq!(b.role(), Role::O);
    assert_eq!(b.status(), Status::WaitingForX);

    assert!(matches!(next(&mut a).await, InboundEvent::Presence(_)));
    assert_eq!(a.status(), Status::OpponentJoinedYourTurn);
    assert_eq!(a.match_id(), b.match_id());
}

#[tokio::test]
async fn first_move_reaches_opponent() {
    let hub = LocalRelayHub::new();
    let (mut a, mut b) = seated(&hub).await;

    assert!(a.play(4).await);
    assert!(matches!(next(&mut b).await, InboundEvent::MatchData(_)));

    let expected = codec::decode_str(r#"[null,null,null,null,"X",null,null,null,null]"#).unwrap();
    assert_eq!(b.board(), &expected);
    assert_eq!(b.turn_state().active_role, Mark::O);
    assert_eq!(b.phase(), TurnPhase::LocalTurn(Mark::O));
    assert_eq!(b.status(), Status::YourTurn);
    assert_eq!(a.status(), Status::OpponentsTurn);
}

#[tokio::test]
async fn o_cannot_move_first_or_on_occupied_cell() {
    let hub = LocalRelayHub::new();
    let (mut a, mut b) = seated(&hub).await;

    assert!(!b.play(0).await);
    assert!(a.play(4).await);
    next(&mut b).await;

    assert!(!b.play(4).await);
    assert_eq!(b.board().filled(), 1);
    assert!(b.play(0).await);
}

#[tokio::test]
async fn full_game_ends_with_x_winning() {
    let hub = LocalRelayHub::new();
    let (mut a, mut b) = seated(&hub).await;

    // X takes the middle column.
    for (cell, x_turn) in [(4, true), (0, false), (1, true), (2, false), (7, true)] {
        if x_turn {
            assert!(a.play(cell).await, "X failed to play {}", cell);
            next(&mut b).await;
        } else {
            assert!(b.play(cell).await, "O failed to play {}", cell);
            next(&mut a).await;
        }
    }

    let won = Status::Finished(GameOutcome::Winner(Mark::X));
    assert_eq!(a.status(), won);
    assert_eq!(b.status(), won);
    assert_eq!(a.board(), b.board());
    assert!(!b.play(3).await);
}

#[tokio::test]
async fn third_client_gets_fresh_match() {
    let hub = LocalRelayHub::new();
    let (_a, _b) = seated(&hub).await;

    let mut c = session(&hub, "carol");
    c.start().await.unwrap();

    assert_eq!(c.acquisition_path(), Some(AcquisitionPath::CreatedFresh));
    assert_eq!(c.role(), Role::X);
    let short = c.match_id().unwrap().short().to_string();
    assert_eq!(short.len(), 8);
    assert_eq!(c.status(), Status::ShareMatchId(short));
    assert_ne!(c.match_id().unwrap().as_str(), ROOM);
}

#[tokio::test]
async fn leaving_pauses_the_remaining_player() {
    let hub = LocalRelayHub::new();
    let (mut a, mut b) = seated(&hub).await;

    b.leave().await.unwrap();
    assert_eq!(b.status(), Status::LeftMatch);

    assert!(matches!(next(&mut a).await, InboundEvent::Presence(_)));
    assert!(a.is_paused());
    assert_eq!(a.status(), Status::OpponentLeft);
    assert!(!a.play(4).await);
}

#[tokio::test]
async fn dropping_a_session_frees_its_seat() {
    let hub = LocalRelayHub::new();
    let (mut a, b) = seated(&hub).await;
    let match_id = a.match_id().cloned().unwrap();

    drop(b);

    next(&mut a).await;
    assert_eq!(a.status(), Status::OpponentLeft);
    assert_eq!(hub.room_size(&match_id), Some(1));
}

//! Play a scripted game between two sessions on an in-process relay.

use anyhow::{bail, Context, Result};
use tictac_match_client::{LocalRelay, LocalRelayHub, Session};
use tictac_match_core::{GameOutcome, TurnPhase};
use tictac_match_types::Board;

use crate::config::CliConfig;

/// Default script: a drawn game.
pub const DEFAULT_MOVES: [usize; 9] = [4, 0, 8, 2, 1, 7, 6, 3, 5];

/// What the demo ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoSummary {
    /// Final board (identical on both sides).
    pub board: Board,
    /// Outcome, if the game finished.
    pub outcome: Option<GameOutcome>,
    /// Moves that were refused.
    pub rejected: Vec<usize>,
}

/// Run the demo command.
pub async fn run(config: &CliConfig, room: Option<&str>, moves: &[usize]) -> Result<DemoSummary> {
    let hub = LocalRelayHub::new();

    let mut first = Session::new(
        config.session_config(room, config.username.as_deref()),
        hub.client(),
    );
    first
        .start()
        .await
        .context("First player failed to start")?;

    let mut second = Session::new(config.session_config(room, None), hub.client());
    second
        .start()
        .await
        .context("Second player failed to start")?;

    first.process_pending();
    second.process_pending();

    println!("=== tictac demo ===");
    print_statuses(&first, &second);

    let mut rejected = Vec::new();
    for &cell in moves {
        if first.outcome().is_some() {
            break;
        }

        let (mover, other) = match (first.phase(), second.phase()) {
            (TurnPhase::LocalTurn(_), _) => (&mut first, &mut second),
            (_, TurnPhase::LocalTurn(_)) => (&mut second, &mut first),
            _ => bail!("Neither player may move"),
        };

        println!();
        if mover.play(cell).await {
            other.process_pending();
            println!("{} plays {}", mover.role(), cell);
            println!("{}", mover.board());
        } else {
            println!("{} may not play {}", mover.role(), cell);
            rejected.push(cell);
        }
        print_statuses(&first, &second);
    }

    let summary = DemoSummary {
        board: *first.board(),
        outcome: first.outcome(),
        rejected,
    };
    if summary.board != *second.board() {
        bail!("Boards diverged");
    }

    first.shutdown().await;
    second.shutdown().await;
    Ok(summary)
}

fn print_statuses(first: &Session<LocalRelay>, second: &Session<LocalRelay>) {
    for session in [first, second] {
        let name = session
            .self_id()
            .map(|id| id.to_string())
            .unwrap_or_default();
        println!("  {} ({}): {}", name, session.role(), session.status());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictac_match_types::Mark;

    #[tokio::test]
    async fn default_script_is_a_draw() {
        let summary = run(&CliConfig::default(), None, &DEFAULT_MOVES)
            .await
            .unwrap();

        assert_eq!(summary.outcome, Some(GameOutcome::Draw));
        assert!(summary.board.is_full());
        assert!(summary.rejected.is_empty());
    }

    #[tokio::test]
    async fn stops_at_first_win() {
        let summary = run(&CliConfig::default(), Some("room1"), &[0, 3, 1, 4, 2, 5, 6])
            .await
            .unwrap();

        assert_eq!(summary.outcome, Some(GameOutcome::Winner(Mark::X)));
        assert_eq!(summary.board.filled(), 5);
    }

    #[tokio::test]
    async fn occupied_cell_is_reported_and_skipped() {
        let summary = run(&CliConfig::default(), None, &[4, 4, 0])
            .await
            .unwrap();

        assert_eq!(summary.rejected, vec![4]);
        assert_eq!(summary.board.get(4), Some(Mark::X));
        assert_eq!(summary.board.get(0), Some(Mark::O));
    }
}

//! Decode a board payload.

use anyhow::{Context, Result};
use tictac_match_core::outcome;
use tictac_match_types::{codec, Board};

/// Run the decode command.
pub fn run(payload: &str) -> Result<()> {
    let board = codec::decode_str(payload).context("Malformed payload")?;
    println!("{}", describe(&board));
    Ok(())
}

/// The board grid followed by a one-line summary.
fn describe(board: &Board) -> String {
    let summary = match outcome::evaluate(board) {
        Some(result) => format!("game over: {}", result),
        None => format!("{} of 9 cells filled", board.filled()),
    };
    format!("{}\n\n{}", board, summary)
}

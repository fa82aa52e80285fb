//! Game outcome detection.

use std::fmt;
use tictac_match_types::{Board, Mark};

/*
 * Bitboard:
 * cell i -> bit i, row-major, so (row 0) = bits 0..=2, (row 2) = bits 6..=8.
 */
const WINNING_MASKS: [u16; 8] = [
    0b000_000_111, // row 0
    0b000_111_000, // row 1
    0b111_000_000, // row 2
    0b001_001_001, // col 0
    0b010_010_010, // col 1
    0b100_100_100, // col 2
    0b100_010_001, // main diagonal
    0b001_010_100, // anti-diagonal
];

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// A full board with no line.
    Draw,
    /// Three in a row.
    Winner(Mark),
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Draw => f.write_str("draw"),
            GameOutcome::Winner(mark) => write!(f, "{} wins", mark),
        }
    }
}

/// Evaluate a board. `None` while the game is still open.
///
/// X is checked first; a snapshot where both marks complete a line can only
/// come from a misbehaving peer.
pub fn evaluate(board: &Board) -> Option<GameOutcome> {
    for mark in [Mark::X, Mark::O] {
        let mask = board.mask(mark);
        if WINNING_MASKS.iter().any(|w| mask & w == *w) {
            return Some(GameOutcome::Winner(mark));
        }
    }
    if board.is_full() {
        Some(GameOutcome::Draw)
    } else {
        None
    }
}

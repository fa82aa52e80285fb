//! Board, marks and roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of cells on the board.
pub const BOARD_CELLS: usize = 9;

/// A symbol placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// Plays first.
    X,
    /// Plays second.
    O,
}

impl Mark {
    /// The other symbol.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Wire representation (`"X"` or `"O"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }

    /// Parse the wire representation.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "X" => Some(Mark::X),
            "O" => Some(Mark::O),
            _ => None,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The symbol a participant plays in a session.
///
/// Starts `Unassigned` and is set at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Not yet known (joiner waiting for presence).
    #[default]
    Unassigned,
    /// Plays X.
    X,
    /// Plays O.
    O,
}

impl Role {
    /// The mark this role plays, if assigned.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Role::Unassigned => None,
            Role::X => Some(Mark::X),
            Role::O => Some(Mark::O),
        }
    }

    /// Whether a mark has been assigned.
    pub fn is_assigned(self) -> bool {
        self != Role::Unassigned
    }
}

impl From<Mark> for Role {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Role::X,
            Mark::O => Role::O,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Unassigned => f.write_str("unassigned"),
            Role::X => f.write_str("X"),
            Role::O => f.write_str("O"),
        }
    }
}

/// Full game state: nine cells in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board([Option<Mark>; BOARD_CELLS]);

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from its cells.
    pub fn from_cells(cells: [Option<Mark>; BOARD_CELLS]) -> Self {
        Self(cells)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Option<Mark>; BOARD_CELLS] {
        &self.0
    }

    /// The content of one cell, `None` when out of range or empty.
    pub fn get(&self, index: usize) -> Option<Mark> {
        self.0.get(index).copied().flatten()
    }

    /// Whether `index` is on the board and holds no mark.
    pub fn is_empty_cell(&self, index: usize) -> bool {
        matches!(self.0.get(index), Some(None))
    }

    /// Return a copy of the board with `mark` placed at `index`.
    ///
    /// Returns `None` if the index is out of range or the cell is filled;
    /// filled cells never change.
    pub fn with_mark(&self, index: usize, mark: Mark) -> Option<Self> {
        if !self.is_empty_cell(index) {
            return None;
        }
        let mut cells = self.0;
        cells[index] = Some(mark);
        Some(Self(cells))
    }

    /// Number of filled cells.
    pub fn filled(&self) -> usize {
        self.0.iter().filter(|c| c.is_some()).count()
    }

    /// Whether every cell is filled.
    pub fn is_full(&self) -> bool {
        self.filled() == BOARD_CELLS
    }

    /// Bitmask of the cells holding `mark` (bit `i` is cell `i`).
    pub fn mask(&self, mark: Mark) -> u16 {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Some(mark))
            .fold(0u16, |acc, (i, _)| acc | (1 << i))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.0.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f)?;
                writeln!(f, "---+---+---")?;
            }
            let line: Vec<String> = cells
                .iter()
                .map(|c| format!(" {} ", c.map(Mark::as_str).unwrap_or(" ")))
                .collect();
            write!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}

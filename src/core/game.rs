//! Client-side view of a single tic-tac-toe game.
//!
//! The server is the authority on rules and outcomes. Everything here either
//! mirrors what it pushed or guards a request before it leaves the client.

use std::fmt;

use thiserror::Error;

use crate::core::identity::PlayerId;

/// Number of cells on the board.
pub const CELLS: usize = 9;

/// Every line that wins the game, row-major indices.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Symbol a seat plays with. X always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mark {
    #[default]
    X,
    O,
}

impl Mark {
    /// Parses the wire symbol (`"X"` / `"O"`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "X" => Some(Mark::X),
            "O" => Some(Mark::O),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Mark),
    Draw,
}

impl Outcome {
    /// Parses the wire value (`"X"`, `"O"` or `"Draw"`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Draw" => Some(Outcome::Draw),
            other => Mark::parse(other).map(Outcome::Winner),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Winner(mark) => write!(f, "{mark}"),
            Outcome::Draw => f.write_str("Draw"),
        }
    }
}

/// 3x3 board, indexed 0-8 row-major.
/// ```text
/// 0 | 1 | 2
/// ---------
/// 3 | 4 | 5
/// ---------
/// 6 | 7 | 8
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    cells: [Option<Mark>; CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from its wire form: nine strings, each `""`, `"X"` or `"O"`.
    /// Returns `None` for the wrong length or an unknown symbol.
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> Option<Self> {
        if cells.len() != CELLS {
            return None;
        }
        let mut board = Board::new();
        for (slot, raw) in board.cells.iter_mut().zip(cells) {
            *slot = match raw.as_ref() {
                "" => None,
                other => Some(Mark::parse(other)?),
            };
        }
        Some(board)
    }

    pub fn get(&self, index: usize) -> Option<Mark> {
        self.cells.get(index).copied().flatten()
    }

    pub fn is_empty_cell(&self, index: usize) -> bool {
        index < CELLS && self.cells[index].is_none()
    }

    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// The first completed line on the board, if any. Display only: the
    /// server decides who won.
    pub fn winning_line(&self) -> Option<[usize; 3]> {
        LINES.into_iter().find(|line| {
            let [a, b, c] = *line;
            self.cells[a].is_some() && self.cells[a] == self.cells[b] && self.cells[b] == self.cells[c]
        })
    }

    #[cfg(test)]
    pub(crate) fn with(mut self, index: usize, mark: Mark) -> Self {
        self.cells[index] = Some(mark);
        self
    }
}

/// Why a move request was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejected {
    #[error("cell {0} is not on the board")]
    OutOfRange(usize),
    #[error("cell {0} is already taken")]
    Occupied(usize),
    #[error("the game is over")]
    Finished,
    #[error("waiting for both players to be seated")]
    SeatsOpen,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("not connected to the room")]
    NotConnected,
}

/// Server-pushed state of the current game.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameState {
    pub board: Board,
    pub x_player: Option<PlayerId>,
    pub o_player: Option<PlayerId>,
    pub turn: Mark,
    pub finished: bool,
    pub outcome: Option<Outcome>,
}

impl GameState {
    /// The mark `player` is seated with, if seated.
    pub fn seat_of(&self, player: &PlayerId) -> Option<Mark> {
        if self.x_player.as_ref() == Some(player) {
            Some(Mark::X)
        } else if self.o_player.as_ref() == Some(player) {
            Some(Mark::O)
        } else {
            None
        }
    }

    pub fn player_for(&self, mark: Mark) -> Option<&PlayerId> {
        match mark {
            Mark::X => self.x_player.as_ref(),
            Mark::O => self.o_player.as_ref(),
        }
    }

    pub fn seats_filled(&self) -> bool {
        self.x_player.is_some() && self.o_player.is_some()
    }

    /// True once a game has been handed out by the server.
    pub fn is_active(&self) -> bool {
        self.x_player.is_some() || self.o_player.is_some()
    }

    pub fn is_my_turn(&self, player: &PlayerId) -> bool {
        self.player_for(self.turn) == Some(player)
    }

    pub fn can_play(&self, player: &PlayerId) -> bool {
        !self.finished && self.seats_filled() && self.is_my_turn(player)
    }

    /// Guards a move before it is sent. An occupied cell is always rejected.
    pub fn check_move(&self, player: &PlayerId, index: usize) -> Result<(), MoveRejected> {
        if index >= CELLS {
            return Err(MoveRejected::OutOfRange(index));
        }
        if !self.board.is_empty_cell(index) {
            return Err(MoveRejected::Occupied(index));
        }
        if self.finished {
            return Err(MoveRejected::Finished);
        }
        if !self.seats_filled() {
            return Err(MoveRejected::SeatsOpen);
        }
        if !self.is_my_turn(player) {
            return Err(MoveRejected::NotYourTurn);
        }
        Ok(())
    }

    /// Highlighted cells once the server has declared a winner.
    pub fn highlighted_line(&self) -> Option<[usize; 3]> {
        match self.outcome {
            Some(Outcome::Winner(mark)) if self.finished => self
                .board
                .winning_line()
                .filter(|line| self.board.get(line[0]) == Some(mark)),
            _ => None,
        }
    }
}

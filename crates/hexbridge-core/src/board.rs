//! Hexagonal board geometry
//!
//! Cells use axial coordinates `(l, n)`, both counted from 1. A board of
//! side `S` spans a `(2S-1)×(2S-1)` window from which the two corners with
//! `|l-n| ≥ S` are cut away.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest side whose `2S-1` columns still fit in `a..z`
pub const MAX_BOARD_SIZE: u8 = 13;

/// Side length of a hexagonal board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BoardSize(u8);

impl BoardSize {
    /// Create a board size, rejecting sides outside `1..=MAX_BOARD_SIZE`
    pub fn new(side: u32) -> Result<Self> {
        match u8::try_from(side) {
            Ok(side) if (1..=MAX_BOARD_SIZE).contains(&side) => Ok(Self(side)),
            _ => Err(BridgeError::InvalidBoardSize(side)),
        }
    }

    /// Side length `S`
    pub fn side(self) -> u8 {
        self.0
    }

    /// Number of rows (and columns) of the bounding window, `2S-1`
    pub fn span(self) -> u8 {
        2 * self.0 - 1
    }

    /// Whether `(l, n)` lies on the board
    pub fn contains(self, l: i32, n: i32) -> bool {
        let span = i32::from(self.span());
        (1..=span).contains(&l) && (1..=span).contains(&n) && (l - n).abs() < i32::from(self.0)
    }

    /// The cell at `(l, n)`, if it lies on the board
    pub fn cell(self, l: i32, n: i32) -> Option<Cell> {
        if !self.contains(l, n) {
            return None;
        }
        Some(Cell {
            l: u8::try_from(l).ok()?,
            n: u8::try_from(n).ok()?,
        })
    }

    /// Every cell of the board, column by column
    pub fn cells(self) -> impl Iterator<Item = Cell> {
        let span = i32::from(self.span());
        (1..=span).flat_map(move |l| (1..=span).filter_map(move |n| self.cell(l, n)))
    }

    /// Number of cells, `3S² - 3S + 1`
    pub fn cell_count(self) -> usize {
        let s = usize::from(self.0);
        3 * s * s - 3 * s + 1
    }
}

impl TryFrom<u32> for BoardSize {
    type Error = BridgeError;

    fn try_from(side: u32) -> Result<Self> {
        Self::new(side)
    }
}

impl From<BoardSize> for u32 {
    fn from(size: BoardSize) -> Self {
        u32::from(size.0)
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cell on the board in axial coordinates
///
/// Only obtainable through [`BoardSize::cell`], so every `Cell` was on the
/// board it was decoded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    l: u8,
    n: u8,
}

impl Cell {
    pub fn l(self) -> u8 {
        self.l
    }

    pub fn n(self) -> u8 {
        self.n
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.l, self.n)
    }
}

/// Side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    /// First player
    White,
    /// Second player
    Black,
}

impl Player {
    /// Who moves after `history_len` moves have been played
    pub fn to_move(history_len: usize) -> Self {
        if history_len % 2 == 0 {
            Player::White
        } else {
            Player::Black
        }
    }

    /// Color name understood by the engine
    pub fn as_str(self) -> &'static str {
        match self {
            Player::White => "white",
            Player::Black => "black",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

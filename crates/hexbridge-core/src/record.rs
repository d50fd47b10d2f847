//! Game transcripts
//!
//! Records arrive as SGF-like text: the side length in an `SZ[..]` property
//! and one `;B[..]` or `;W[..]` node per move, in play order.

use crate::board::{BoardSize, Cell, Player};
use crate::error::{BridgeError, Result};
use crate::notation::CoordinateTranscoder;
use tracing::debug;

/// Identifier of a game on the server
pub type GameId = String;

/// A decoded game transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    /// Game identifier
    pub id: GameId,
    /// Board side length
    pub size: BoardSize,
    /// Moves in play order; index parity gives the color
    pub moves: Vec<Cell>,
    /// Tokens that were off the board or unreadable and got skipped
    pub dropped: usize,
}

impl GameRecord {
    /// Parse a transcript, decoding every move token with `coords`.
    ///
    /// Tokens that fail to decode are dropped; the rest of the game is kept.
    pub fn parse<T>(id: impl Into<GameId>, text: &str, coords: &T) -> Result<Self>
    where
        T: CoordinateTranscoder + ?Sized,
    {
        let id = id.into();
        let raw_size = property(text, "SZ")
            .ok_or_else(|| BridgeError::Record(format!("game {}: missing SZ property", id)))?;
        let side: u32 = raw_size.trim().parse().map_err(|_| {
            BridgeError::Record(format!("game {}: bad SZ value {:?}", id, raw_size))
        })?;
        let size = BoardSize::new(side)?;

        let mut moves = Vec::new();
        let mut dropped = 0;
        for token in move_tokens(text) {
            match coords.decode_record_token(token, size) {
                Ok(cell) => moves.push(cell),
                Err(e) => {
                    debug!("Game {}: dropping move: {}", id, e);
                    dropped += 1;
                }
            }
        }

        Ok(Self {
            id,
            size,
            moves,
            dropped,
        })
    }

    /// Side to move next
    pub fn to_move(&self) -> Player {
        Player::to_move(self.moves.len())
    }
}

/// Value of the first `NAME[...]` property
fn property<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("{}[", name);
    let start = text.find(&open)? + open.len();
    let len = text[start..].find(']')?;
    Some(&text[start..start + len])
}

/// Bodies of every `;B[...]` and `;W[...]` node, in order
fn move_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find(';') {
        rest = &rest[pos + 1..];
        let Some(body) = rest.strip_prefix("B[").or_else(|| rest.strip_prefix("W[")) else {
            continue;
        };
        let Some(end) = body.find(']') else {
            break;
        };
        tokens.push(&body[..end]);
        rest = &body[end + 1..];
    }
    tokens
}

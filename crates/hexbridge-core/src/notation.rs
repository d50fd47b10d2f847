//! Coordinate notations
//!
//! Three surface syntaxes address the same hexagon. All of them are a
//! lowercase letter (`a` = 1) followed by a decimal number:
//!
//! | Notation | letter | number                                  |
//! |----------|--------|-----------------------------------------|
//! | Engine   | `l`    | `n`                                     |
//! | Server   | `l`    | `n` when `l ≤ S`, otherwise `n - (l-S)` |
//! | Record   | `n`    | `l`                                     |
//!
//! The server numbering restarts along the lower-right edge, so on the right
//! half of the board every column counts from 1 again.
//!
//! The record convention (axes swapped relative to the engine) is provisional:
//! it has not been checked against real server transcripts. If it turns out
//! wrong, only `decode_record_token` and `encode_record` need to change.

use crate::board::{BoardSize, Cell};
use crate::error::{BridgeError, DecodeError, Result};

/// Converts cells to and from the three notations
///
/// Implementations are stateless; the driver receives one at construction.
pub trait CoordinateTranscoder: Send + Sync {
    /// Decode a move token from a game transcript
    fn decode_record_token(&self, token: &str, size: BoardSize)
    -> std::result::Result<Cell, DecodeError>;

    /// Encode a cell as a game-transcript token
    fn encode_record(&self, cell: Cell, size: BoardSize) -> String;

    /// Decode a token as exchanged with the game server
    fn decode_server_token(&self, token: &str, size: BoardSize)
    -> std::result::Result<Cell, DecodeError>;

    /// Encode a cell for posting to the game server
    fn encode_server(&self, cell: Cell, size: BoardSize) -> String;

    /// Decode a token produced by the engine
    fn decode_engine_token(&self, token: &str, size: BoardSize)
    -> std::result::Result<Cell, DecodeError>;

    /// Encode a cell for the engine
    fn encode_engine(&self, cell: Cell, size: BoardSize) -> String;
}

/// The Havannah conventions described in the module docs
#[derive(Debug, Clone, Copy, Default)]
pub struct HavannahCoords;

impl CoordinateTranscoder for HavannahCoords {
    fn decode_record_token(
        &self,
        token: &str,
        size: BoardSize,
    ) -> std::result::Result<Cell, DecodeError> {
        let (n, l) = split_token(token)?;
        on_board(token, size, l, n)
    }

    fn encode_record(&self, cell: Cell, _size: BoardSize) -> String {
        join_token(cell.n(), cell.l())
    }

    fn decode_server_token(
        &self,
        token: &str,
        size: BoardSize,
    ) -> std::result::Result<Cell, DecodeError> {
        let (l, number) = split_token(token)?;
        let n = number + (l - i32::from(size.side())).max(0);
        on_board(token, size, l, n)
    }

    fn encode_server(&self, cell: Cell, size: BoardSize) -> String {
        let shift = cell.l().saturating_sub(size.side());
        join_token(cell.l(), cell.n() - shift)
    }

    fn decode_engine_token(
        &self,
        token: &str,
        size: BoardSize,
    ) -> std::result::Result<Cell, DecodeError> {
        let (l, n) = split_token(token)?;
        on_board(token, size, l, n)
    }

    fn encode_engine(&self, cell: Cell, _size: BoardSize) -> String {
        join_token(cell.l(), cell.n())
    }
}

/// Split `<letter><number>` into its two 1-based components
fn split_token(token: &str) -> std::result::Result<(i32, i32), DecodeError> {
    let malformed = || DecodeError::Malformed(token.to_string());

    let mut chars = token.chars();
    let letter = chars
        .next()
        .filter(char::is_ascii_lowercase)
        .ok_or_else(malformed)?;
    let digits = chars.as_str();
    if digits.is_empty()
        || digits.len() > 2
        || (digits.len() > 1 && digits.starts_with('0'))
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(malformed());
    }
    let number: i32 = digits.parse().map_err(|_| malformed())?;

    Ok((i32::from(letter as u8 - b'a') + 1, number))
}

fn join_token(letter: u8, number: u8) -> String {
    format!("{}{}", char::from(b'a' + letter - 1), number)
}

fn on_board(
    token: &str,
    size: BoardSize,
    l: i32,
    n: i32,
) -> std::result::Result<Cell, DecodeError> {
    size.cell(l, n).ok_or_else(|| DecodeError::OffBoard {
        token: token.to_string(),
        size: size.side(),
    })
}

/// Check that every cell of `size` survives a round trip through all three
/// notations. Returns the number of cells checked.
pub fn verify_round_trip<T>(coords: &T, size: BoardSize) -> Result<usize>
where
    T: CoordinateTranscoder + ?Sized,
{
    let mut checked = 0;
    for cell in size.cells() {
        let trips = [
            (
                "record",
                coords.encode_record(cell, size),
                coords.decode_record_token(&coords.encode_record(cell, size), size),
            ),
            (
                "server",
                coords.encode_server(cell, size),
                coords.decode_server_token(&coords.encode_server(cell, size), size),
            ),
            (
                "engine",
                coords.encode_engine(cell, size),
                coords.decode_engine_token(&coords.encode_engine(cell, size), size),
            ),
        ];
        for (notation, token, decoded) in trips {
            match decoded {
                Ok(back) if back == cell => {}
                Ok(back) => {
                    return Err(BridgeError::SelfCheck(format!(
                        "{} token {} for {} decodes to {} on side {}",
                        notation, token, cell, back, size
                    )));
                }
                Err(e) => {
                    return Err(BridgeError::SelfCheck(format!(
                        "{} token {} for {} rejected on side {}: {}",
                        notation, token, cell, size, e
                    )));
                }
            }
        }
        checked += 1;
    }
    Ok(checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::MAX_BOARD_SIZE;

    fn size(side: u32) -> BoardSize {
        BoardSize::new(side).unwrap()
    }

    fn cell(size: BoardSize, l: i32, n: i32) -> Cell {
        size.cell(l, n).unwrap()
    }

    #[test]
    fn test_round_trip_all_sizes() {
        for side in 1..=u32::from(MAX_BOARD_SIZE) {
            let size = size(side);
            let checked = verify_round_trip(&HavannahCoords, size).unwrap();
            assert_eq!(checked, size.cell_count());
        }
    }

    #[test]
    fn test_engine_notation() {
        let s = size(5);
        assert_eq!(HavannahCoords.encode_engine(cell(s, 1, 1), s), "a1");
        assert_eq!(HavannahCoords.encode_engine(cell(s, 3, 7), s), "c7");
        assert_eq!(HavannahCoords.encode_engine(cell(s, 9, 9), s), "i9");
        assert_eq!(
            HavannahCoords.decode_engine_token("e5", s).unwrap(),
            cell(s, 5, 5)
        );
    }

    #[test]
    fn test_record_notation_is_transposed() {
        let s = size(5);
        assert_eq!(
            HavannahCoords.decode_record_token("c7", s).unwrap(),
            cell(s, 7, 3)
        );
        assert_eq!(HavannahCoords.encode_record(cell(s, 7, 3), s), "c7");
    }

    #[test]
    fn test_server_notation_restarts_right_of_centre() {
        let s = size(5);
        // left half and centre column keep the engine numbering
        assert_eq!(HavannahCoords.encode_server(cell(s, 2, 4), s), "b4");
        assert_eq!(HavannahCoords.encode_server(cell(s, 5, 9), s), "e9");
        // right half counts from the lower-right edge
        assert_eq!(HavannahCoords.encode_server(cell(s, 6, 2), s), "f1");
        assert_eq!(HavannahCoords.encode_server(cell(s, 9, 9), s), "i5");
        assert_eq!(
            HavannahCoords.decode_server_token("i1", s).unwrap(),
            cell(s, 9, 5)
        );
    }

    #[test]
    fn test_boundary_rejection() {
        let s = size(5);
        for token in ["a0", "j5", "e10", "a6", "f1"] {
            assert!(
                matches!(
                    HavannahCoords.decode_engine_token(token, s),
                    Err(DecodeError::OffBoard { .. })
                ),
                "engine token {} should be off board",
                token
            );
        }
        // record tokens put the row first: "a6" is (l=6, n=1), outside
        for token in ["a0", "j1", "a6", "f1", "e10"] {
            assert!(
                HavannahCoords.decode_record_token(token, s).is_err(),
                "record token {} should be rejected",
                token
            );
        }
        // server numbers only shrink on the right half
        assert!(HavannahCoords.decode_server_token("f9", s).is_err());
        assert!(HavannahCoords.decode_server_token("i6", s).is_err());
        assert!(HavannahCoords.decode_server_token("a0", s).is_err());
    }

    #[test]
    fn test_malformed_tokens() {
        let s = size(5);
        for token in ["", "e", "5e", "E5", "e05", "e123", "e5x", "é5", "swap"] {
            assert!(
                matches!(
                    HavannahCoords.decode_engine_token(token, s),
                    Err(DecodeError::Malformed(_))
                ),
                "token {:?} should be malformed",
                token
            );
        }
    }
}

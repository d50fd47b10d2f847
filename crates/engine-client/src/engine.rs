//! Move engine seam

use async_trait::async_trait;
use hexbridge_core::{BoardSize, EngineError, Player};

/// Everything an engine needs to pick one move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    /// Board side length
    pub size: BoardSize,
    /// Full history in engine notation, in play order
    pub history: Vec<String>,
    /// Side to move, derived from the history length
    pub to_move: Player,
}

impl MoveRequest {
    pub fn new(size: BoardSize, history: Vec<String>) -> Self {
        let to_move = Player::to_move(history.len());
        Self {
            size,
            history,
            to_move,
        }
    }
}

/// Something that turns a position into the next move
///
/// Returns the move as an engine-notation token.
#[async_trait]
pub trait MoveEngine: Send {
    async fn generate_move(&mut self, request: &MoveRequest) -> Result<String, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_color_follows_history_parity() {
        let size = BoardSize::new(5).unwrap();
        assert_eq!(MoveRequest::new(size, vec![]).to_move, Player::White);
        assert_eq!(
            MoveRequest::new(size, vec!["e5".into()]).to_move,
            Player::Black
        );
        assert_eq!(
            MoveRequest::new(size, vec!["e5".into(), "d4".into()]).to_move,
            Player::White
        );
    }
}

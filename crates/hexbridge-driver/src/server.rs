//! Game server trait

use async_trait::async_trait;
use hexbridge_core::{GameId, Result};

/// The remote service games are played on
///
/// Implement this trait to connect the driver to a game server. Transport
/// failures should surface as `BridgeError::ServerIo` or
/// `BridgeError::Timeout` so the driver retries them quickly.
#[async_trait]
pub trait GameServer: Send {
    /// Games where it is our turn
    async fn list_games_needing_move(&mut self) -> Result<Vec<GameId>>;

    /// Raw transcript of a game, or `None` if it is not available
    async fn fetch_record(&mut self, id: &GameId) -> Result<Option<String>>;

    /// Submit a move in server notation
    async fn post_move(&mut self, id: &GameId, token: &str) -> Result<()>;
}

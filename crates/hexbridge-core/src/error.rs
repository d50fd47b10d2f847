//! Error types for hexbridge

use thiserror::Error;

/// Result type for hexbridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// hexbridge error types
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Board side length outside the supported range
    #[error("Invalid board size: {0}")]
    InvalidBoardSize(u32),

    /// Game transcript could not be interpreted
    #[error("Record error: {0}")]
    Record(String),

    /// Coordinate token rejected
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Engine process failure
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Game server call did not complete in time
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Transport failure while talking to the game server
    #[error("Server I/O error: {0}")]
    ServerIo(String),

    /// Game server refused a request
    #[error("Server error: {0}")]
    Server(String),

    /// Notation self-check found a mismatch
    #[error("Self-check failed: {0}")]
    SelfCheck(String),
}

impl BridgeError {
    /// Timeouts and server transport failures are worth a quick retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, BridgeError::Timeout(_) | BridgeError::ServerIo(_))
    }
}

/// Why a coordinate token did not decode to a cell
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Not a `<letter><number>` token
    #[error("Malformed coordinate token: {0:?}")]
    Malformed(String),

    /// Well-formed token outside the hexagon
    #[error("Coordinate {token:?} lies off a side-{size} board")]
    OffBoard { token: String, size: u8 },
}

/// Engine process failures
#[derive(Debug, Error)]
pub enum EngineError {
    /// Process could not be started
    #[error("Failed to spawn engine: {0}")]
    Spawn(String),

    /// Reading from or writing to the engine failed
    #[error("Engine I/O error: {0}")]
    Io(String),

    /// Engine closed its output mid-response
    #[error("Engine closed its output")]
    Closed,

    /// Engine answered with a failure marker
    #[error("Engine rejected `{command}`: {message}")]
    Rejected { command: String, message: String },

    /// Engine reply carried no usable move
    #[error("Malformed engine response: {0:?}")]
    MalformedResponse(String),
}

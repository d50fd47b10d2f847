//! Engine text protocol
//!
//! Requests are single lines ending in `\n`. A response is everything the
//! engine prints up to the first blank line, and starts with a status
//! marker: `=` for success or `?` for failure, optionally followed by a
//! numeric command id.
//!
//! One move decision is always the same four commands:
//!
//! ```text
//! boardsize 5
//! play_game e5 g7 d4
//! genmove black
//! quit
//! ```

use crate::engine::MoveRequest;
use hexbridge_core::{BoardSize, EngineError, Player};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Commands the bridge sends to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    /// Configure the board side length
    BoardSize(BoardSize),
    /// Replay a whole game from the empty board
    PlayGame(Vec<String>),
    /// Ask for a move for the given side
    GenMove(Player),
    /// End the session
    Quit,
}

impl EngineCommand {
    /// Protocol name of the command
    pub fn name(&self) -> &'static str {
        match self {
            EngineCommand::BoardSize(_) => "boardsize",
            EngineCommand::PlayGame(_) => "play_game",
            EngineCommand::GenMove(_) => "genmove",
            EngineCommand::Quit => "quit",
        }
    }

    /// Request line, without the trailing newline
    pub fn to_line(&self) -> String {
        match self {
            EngineCommand::BoardSize(size) => format!("boardsize {}", size),
            EngineCommand::PlayGame(moves) if moves.is_empty() => "play_game".to_string(),
            EngineCommand::PlayGame(moves) => format!("play_game {}", moves.join(" ")),
            EngineCommand::GenMove(player) => format!("genmove {}", player),
            EngineCommand::Quit => "quit".to_string(),
        }
    }
}

/// A framed engine response with its status marker removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineResponse {
    /// `=` response and its payload
    Success(String),
    /// `?` response and its message
    Failure(String),
}

impl EngineResponse {
    /// Strip the status marker (and optional id) from a raw response.
    ///
    /// Returns `None` when the text does not start with a marker.
    pub fn parse(raw: &str) -> Option<Self> {
        let (success, rest) = match raw.chars().next()? {
            '=' => (true, &raw[1..]),
            '?' => (false, &raw[1..]),
            _ => return None,
        };
        let body = rest
            .trim_start_matches(|c: char| c.is_ascii_digit())
            .trim()
            .to_string();
        Some(if success {
            EngineResponse::Success(body)
        } else {
            EngineResponse::Failure(body)
        })
    }
}

/// Protocol conversation over any reader/writer pair
pub struct EngineSession<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> EngineSession<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Run the full four-command exchange and return the engine's move token
    ///
    /// `quit` is sent even when `genmove` fails, so the engine can exit on
    /// its own before the process is reaped.
    pub async fn exchange(&mut self, request: &MoveRequest) -> Result<String, EngineError> {
        self.send_tolerant(&EngineCommand::BoardSize(request.size))
            .await?;
        self.send_tolerant(&EngineCommand::PlayGame(request.history.clone()))
            .await?;

        let genmove = EngineCommand::GenMove(request.to_move);
        let reply = self.send(&genmove).await;

        if let Err(e) = self.send(&EngineCommand::Quit).await {
            debug!("Engine did not acknowledge quit: {}", e);
        }

        match reply? {
            EngineResponse::Success(token) => {
                if token.is_empty() || token.contains(char::is_whitespace) {
                    Err(EngineError::MalformedResponse(token))
                } else {
                    Ok(token)
                }
            }
            EngineResponse::Failure(message) => Err(EngineError::Rejected {
                command: genmove.to_line(),
                message,
            }),
        }
    }

    /// Send a command whose failure is only worth a warning
    async fn send_tolerant(&mut self, command: &EngineCommand) -> Result<(), EngineError> {
        if let EngineResponse::Failure(message) = self.send(command).await? {
            warn!("Engine rejected `{}`: {}", command.name(), message);
        }
        Ok(())
    }

    /// Send one command and read its framed response
    pub async fn send(&mut self, command: &EngineCommand) -> Result<EngineResponse, EngineError> {
        let line = command.to_line();
        debug!("[Bridge→Engine] {}", line);

        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| EngineError::Io(format!("Write failed: {}", e)))?;
        self.writer
            .write_all(b"\n")
            .await
            .map_err(|e| EngineError::Io(format!("Write newline failed: {}", e)))?;
        self.writer
            .flush()
            .await
            .map_err(|e| EngineError::Io(format!("Flush failed: {}", e)))?;

        let raw = self.read_response().await?;
        debug!("[Engine→Bridge] {}", raw.trim_end());

        EngineResponse::parse(&raw).ok_or(EngineError::MalformedResponse(raw))
    }

    /// Read up to the first blank line. Blank lines before a response
    /// starts are skipped.
    async fn read_response(&mut self) -> Result<String, EngineError> {
        let mut response = String::new();
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = self
                .reader
                .read_line(&mut line)
                .await
                .map_err(|e| EngineError::Io(format!("Read failed: {}", e)))?;
            if bytes_read == 0 {
                return Err(EngineError::Closed);
            }
            if line.trim().is_empty() {
                if response.is_empty() {
                    continue;
                }
                return Ok(response);
            }
            response.push_str(&line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};
    use tokio_test::{assert_err, assert_ok};

    type DuplexSession = EngineSession<BufReader<ReadHalf<DuplexStream>>, WriteHalf<DuplexStream>>;

    fn session() -> (DuplexSession, DuplexStream) {
        let (client, engine) = tokio::io::duplex(4096);
        let (read, write) = tokio::io::split(client);
        (EngineSession::new(BufReader::new(read), write), engine)
    }

    /// Answers every command with `= \n\n`, and `genmove` with `reply`.
    /// Returns the command lines it received.
    async fn scripted_engine(stream: DuplexStream, reply: &'static str) -> Vec<String> {
        let (read, mut write) = tokio::io::split(stream);
        let mut lines = BufReader::new(read).lines();
        let mut seen = Vec::new();
        while let Ok(Some(line)) = lines.next_line().await {
            let answer = if line.starts_with("genmove") {
                reply
            } else {
                "= \n\n"
            };
            let done = line == "quit";
            seen.push(line);
            if write.write_all(answer.as_bytes()).await.is_err() || done {
                break;
            }
        }
        seen
    }

    fn request(history: &[&str]) -> MoveRequest {
        MoveRequest::new(
            BoardSize::new(5).unwrap(),
            history.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_command_lines() {
        let size = BoardSize::new(8).unwrap();
        assert_eq!(EngineCommand::BoardSize(size).to_line(), "boardsize 8");
        assert_eq!(EngineCommand::PlayGame(vec![]).to_line(), "play_game");
        assert_eq!(
            EngineCommand::PlayGame(vec!["e5".into(), "d4".into()]).to_line(),
            "play_game e5 d4"
        );
        assert_eq!(
            EngineCommand::GenMove(Player::Black).to_line(),
            "genmove black"
        );
        assert_eq!(EngineCommand::Quit.to_line(), "quit");
    }

    #[test]
    fn test_response_parsing() {
        assert_eq!(
            EngineResponse::parse("= e5\n"),
            Some(EngineResponse::Success("e5".into()))
        );
        assert_eq!(
            EngineResponse::parse("=12 c3\n"),
            Some(EngineResponse::Success("c3".into()))
        );
        assert_eq!(
            EngineResponse::parse("= \n"),
            Some(EngineResponse::Success(String::new()))
        );
        assert_eq!(
            EngineResponse::parse("? unacceptable size 6\n"),
            Some(EngineResponse::Failure("unacceptable size 6".into()))
        );
        assert_eq!(EngineResponse::parse("e5\n"), None);
        assert_eq!(EngineResponse::parse(""), None);
    }

    #[tokio::test]
    async fn test_exchange_command_order() {
        let (mut session, engine) = session();
        let engine = tokio::spawn(scripted_engine(engine, "= f6\n\n"));

        let token = assert_ok!(session.exchange(&request(&["e5", "g7", "d4"])).await);
        assert_eq!(token, "f6");

        let seen = engine.await.unwrap();
        assert_eq!(
            seen,
            vec!["boardsize 5", "play_game e5 g7 d4", "genmove black", "quit"]
        );
    }

    #[tokio::test]
    async fn test_exchange_empty_history_still_replays() {
        let (mut session, engine) = session();
        let engine = tokio::spawn(scripted_engine(engine, "= e5\n\n"));

        let token = assert_ok!(session.exchange(&request(&[])).await);
        assert_eq!(token, "e5");

        let seen = engine.await.unwrap();
        assert_eq!(seen, vec!["boardsize 5", "play_game", "genmove white", "quit"]);
    }

    #[tokio::test]
    async fn test_genmove_failure_still_quits() {
        let (mut session, engine) = session();
        let engine = tokio::spawn(scripted_engine(engine, "? game is over\n\n"));

        let err = assert_err!(session.exchange(&request(&["e5"])).await);
        match err {
            EngineError::Rejected { command, message } => {
                assert_eq!(command, "genmove black");
                assert_eq!(message, "game is over");
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }

        let seen = engine.await.unwrap();
        assert_eq!(seen.last().map(String::as_str), Some("quit"));
    }

    #[tokio::test]
    async fn test_unmarked_genmove_reply_is_malformed() {
        let (mut session, engine) = session();
        let engine = tokio::spawn(scripted_engine(engine, "e5\n\n"));

        let err = assert_err!(session.exchange(&request(&[])).await);
        assert!(matches!(err, EngineError::MalformedResponse(_)));
        engine.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_genmove_reply_is_malformed() {
        let (mut session, engine) = session();
        let engine = tokio::spawn(scripted_engine(engine, "= \n\n"));

        let err = assert_err!(session.exchange(&request(&[])).await);
        assert!(matches!(err, EngineError::MalformedResponse(_)));
        engine.await.unwrap();
    }

    #[tokio::test]
    async fn test_engine_closing_early() {
        let (mut session, engine) = session();
        drop(engine);

        let err = assert_err!(session.exchange(&request(&[])).await);
        assert!(matches!(err, EngineError::Io(_) | EngineError::Closed));
    }

    #[tokio::test]
    async fn test_response_framing_skips_leading_blank_lines() {
        let (mut session, mut engine) = session();
        engine
            .write_all(b"\n= first\nsecond line\n\n")
            .await
            .unwrap();

        let response = assert_ok!(session.send(&EngineCommand::Quit).await);
        assert_eq!(
            response,
            EngineResponse::Success("first\nsecond line".into())
        );
    }
}

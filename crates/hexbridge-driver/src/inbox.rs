//! File-based game server
//!
//! Exchanges games through a spool directory that an external uploader
//! fills and drains:
//!
//! ```text
//! <root>/pending/<id>.hgf   games waiting for our move
//! <root>/done/<id>.hgf      games we have answered
//! <root>/moves.jsonl        one {"game_id": .., "move": ..} line per answer
//! ```

use crate::server::GameServer;
use async_trait::async_trait;
use hexbridge_core::{BridgeError, GameId, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Where the spool directory lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InboxConfig {
    /// Spool root
    pub root: PathBuf,
    /// File extension of game records
    pub extension: String,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./inbox"),
            extension: "hgf".into(),
        }
    }
}

/// A move appended to `moves.jsonl`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedMove {
    pub game_id: GameId,
    #[serde(rename = "move")]
    pub token: String,
}

/// [`GameServer`] over a spool directory
#[derive(Debug, Clone)]
pub struct InboxServer {
    config: InboxConfig,
}

impl InboxServer {
    pub fn new(config: InboxConfig) -> Self {
        Self { config }
    }

    /// Create the spool directories if they are missing
    pub async fn prepare(&self) -> Result<()> {
        for dir in [self.pending_dir(), self.done_dir()] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| io_error(&dir, e))?;
        }
        info!("Inbox ready at {}", self.config.root.display());
        Ok(())
    }

    pub fn pending_dir(&self) -> PathBuf {
        self.config.root.join("pending")
    }

    pub fn done_dir(&self) -> PathBuf {
        self.config.root.join("done")
    }

    pub fn moves_log(&self) -> PathBuf {
        self.config.root.join("moves.jsonl")
    }

    fn record_path(&self, dir: &Path, id: &GameId) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(BridgeError::Server(format!("Invalid game id {:?}", id)));
        }
        Ok(dir.join(format!("{}.{}", id, self.config.extension)))
    }
}

#[async_trait]
impl GameServer for InboxServer {
    async fn list_games_needing_move(&mut self) -> Result<Vec<GameId>> {
        let dir = self.pending_dir();
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| io_error(&dir, e))?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&dir, e))? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.config.extension.as_str()) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        debug!("{} games pending in {}", ids.len(), dir.display());
        Ok(ids)
    }

    async fn fetch_record(&mut self, id: &GameId) -> Result<Option<String>> {
        let path = self.record_path(&self.pending_dir(), id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn post_move(&mut self, id: &GameId, token: &str) -> Result<()> {
        let pending = self.record_path(&self.pending_dir(), id)?;
        let done = self.record_path(&self.done_dir(), id)?;
        if !tokio::fs::try_exists(&pending)
            .await
            .map_err(|e| io_error(&pending, e))?
        {
            return Err(BridgeError::Server(format!("Game {} is not pending", id)));
        }

        let line = serde_json::to_string(&PostedMove {
            game_id: id.clone(),
            token: token.to_string(),
        })
        .map_err(|e| BridgeError::Server(format!("Failed to encode move: {}", e)))?;

        let log = self.moves_log();
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log)
            .await
            .map_err(|e| io_error(&log, e))?;
        file.write_all(format!("{}\n", line).as_bytes())
            .await
            .map_err(|e| io_error(&log, e))?;
        file.flush().await.map_err(|e| io_error(&log, e))?;

        tokio::fs::rename(&pending, &done)
            .await
            .map_err(|e| io_error(&pending, e))?;

        info!("Posted {} to game {}", token, id);
        Ok(())
    }
}

fn io_error(path: &Path, e: std::io::Error) -> BridgeError {
    let message = format!("{}: {}", path.display(), e);
    if e.kind() == ErrorKind::TimedOut {
        BridgeError::Timeout(message)
    } else {
        BridgeError::ServerIo(message)
    }
}

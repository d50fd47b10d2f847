//! Engine process lifecycle
//!
//! Every decision gets a fresh process: the engine keeps no memory between
//! moves and is handed the whole game each time.

use crate::engine::{MoveEngine, MoveRequest};
use crate::protocol::EngineSession;
use async_trait::async_trait;
use hexbridge_core::EngineError;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSecondsWithFrac, serde_as};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

/// How to launch the engine
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine executable
    pub program: PathBuf,
    /// Extra command-line arguments
    pub args: Vec<String>,
    /// Working directory for the engine (default: inherited)
    pub working_dir: Option<PathBuf>,
    /// Pause after `quit` before the pipes are closed and the process reaped
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub grace_period: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("./lajkonik"),
            args: Vec::new(),
            working_dir: None,
            grace_period: Duration::from_secs(1),
        }
    }
}

type ProcessSession = EngineSession<BufReader<ChildStdout>, ChildStdin>;

/// A running engine process
pub struct EngineProcess {
    child: Child,
    session: Option<ProcessSession>,
}

impl EngineProcess {
    /// Start the engine with piped stdin/stdout
    pub fn spawn(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut command = Command::new(&config.program);
        command
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &config.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            EngineError::Spawn(format!("{}: {}", config.program.display(), e))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Spawn("No stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Spawn("No stdout".into()))?;

        debug!("Engine process started, pid {:?}", child.id());

        Ok(Self {
            child,
            session: Some(EngineSession::new(BufReader::new(stdout), stdin)),
        })
    }

    /// Run the four-command exchange
    pub async fn exchange(&mut self, request: &MoveRequest) -> Result<String, EngineError> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| EngineError::Io("Engine session already closed".into()))?;
        session.exchange(request).await
    }

    /// Wait out the grace period, close the pipes and reap the process,
    /// killing it if it has not exited by then
    pub async fn shutdown(mut self, grace_period: Duration) {
        tokio::time::sleep(grace_period).await;
        drop(self.session.take());

        match self.child.try_wait() {
            Ok(Some(status)) => debug!("Engine exited with {}", status),
            Ok(None) => {
                warn!("Engine still running after {:?}, killing it", grace_period);
                if let Err(e) = self.child.kill().await {
                    warn!("Failed to kill engine: {}", e);
                }
            }
            Err(e) => warn!("Failed to poll engine status: {}", e),
        }
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        // Try to kill the child process if still running
        let _ = self.child.start_kill();
    }
}

/// [`MoveEngine`] backed by one engine process per decision
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    config: EngineConfig,
}

impl ProcessEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MoveEngine for ProcessEngine {
    async fn generate_move(&mut self, request: &MoveRequest) -> Result<String, EngineError> {
        info!(
            "Starting engine {} for side {}, {} moves",
            self.config.program.display(),
            request.size,
            request.history.len()
        );
        let mut process = EngineProcess::spawn(&self.config)?;
        let result = process.exchange(request).await;
        process.shutdown(self.config.grace_period).await;
        result
    }
}

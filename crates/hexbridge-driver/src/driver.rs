//! Game session driver
//!
//! Polls the server for games awaiting a move, replays each one through a
//! fresh engine, and posts the answer. Failures are classified into backoff
//! tiers and never end the loop.

use crate::server::GameServer;
use anyhow::Context;
use engine_client::{MoveEngine, MoveRequest};
use hexbridge_core::{
    BridgeError, CoordinateTranscoder, EngineError, GameId, GameRecord, HavannahCoords, Result,
};
use serde::{Deserialize, Serialize};
use serde_with::{DurationSecondsWithFrac, serde_as};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Pauses and limits for the polling loop
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Pause after a cycle that finished normally
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub poll_interval: Duration,
    /// Pause after a game's record could not be fetched
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub fetch_retry_delay: Duration,
    /// Pause after a timeout or server transport failure
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub transient_backoff: Duration,
    /// Pause after any other failure
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub failure_backoff: Duration,
    /// Limit on each individual game server call
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub server_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            fetch_retry_delay: Duration::from_secs(600),
            transient_backoff: Duration::from_secs(30),
            failure_backoff: Duration::from_secs(300),
            server_timeout: Duration::from_secs(60),
        }
    }
}

/// What happened to one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOutcome {
    /// A move was posted
    Posted {
        engine_move: String,
        server_move: String,
    },
    /// The record could not be fetched; skipped after the retry delay
    Unavailable,
}

/// Totals for one draining cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Listing passes made
    pub passes: usize,
    /// Moves posted
    pub posted: usize,
    /// Games whose record was unavailable
    pub unavailable: usize,
}

/// Drives games from a [`GameServer`] through a [`MoveEngine`]
pub struct GameSessionDriver<S, E, T = HavannahCoords> {
    server: S,
    engine: E,
    coords: T,
    config: DriverConfig,
}

impl<S, E, T> GameSessionDriver<S, E, T>
where
    S: GameServer,
    E: MoveEngine,
    T: CoordinateTranscoder,
{
    pub fn new(server: S, engine: E, coords: T, config: DriverConfig) -> Self {
        Self {
            server,
            engine,
            coords,
            config,
        }
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Poll forever. Never returns.
    pub async fn run_forever(&mut self) {
        info!("Driver started");
        loop {
            let pause = self.supervise_once().await;
            debug!("Sleeping {:?}", pause);
            sleep(pause).await;
        }
    }

    /// Run one cycle and pick the pause before the next one
    pub async fn supervise_once(&mut self) -> Duration {
        match self.run_cycle().await {
            Ok(report) => {
                if report.posted > 0 || report.unavailable > 0 {
                    info!(
                        "Cycle done: {} moves posted, {} games unavailable",
                        report.posted, report.unavailable
                    );
                }
                self.config.poll_interval
            }
            Err(e) if is_transient(&e) => {
                warn!(
                    "Transient failure, retrying in {:?}: {:#}",
                    self.config.transient_backoff, e
                );
                self.config.transient_backoff
            }
            Err(e) => {
                error!("{:#}", e);
                error!("{:?}", e);
                error!("Unexpected failure, waiting {:?}", self.config.failure_backoff);
                self.config.failure_backoff
            }
        }
    }

    /// Answer every game that needs a move, listing again until none are
    /// left or a whole pass posts nothing
    pub async fn run_cycle(&mut self) -> anyhow::Result<CycleReport> {
        let mut report = CycleReport::default();
        loop {
            let ids = timed(
                self.config.server_timeout,
                "listing games",
                self.server.list_games_needing_move(),
            )
            .await
            .context("listing games")?;
            if ids.is_empty() {
                break;
            }

            report.passes += 1;
            let mut posted = 0;
            for id in ids {
                let outcome = self
                    .process_game(&id)
                    .await
                    .with_context(|| format!("game {}", id))?;
                match outcome {
                    GameOutcome::Posted { .. } => posted += 1,
                    GameOutcome::Unavailable => report.unavailable += 1,
                }
            }
            report.posted += posted;

            if posted == 0 {
                break;
            }
        }
        Ok(report)
    }

    /// Fetch, decode, ask the engine, and post for a single game
    pub async fn process_game(&mut self, id: &GameId) -> anyhow::Result<GameOutcome> {
        let fetched = timed(
            self.config.server_timeout,
            "fetching record",
            self.server.fetch_record(id),
        )
        .await;
        let text = match fetched {
            Ok(Some(text)) => text,
            Err(e @ BridgeError::Timeout(_)) => {
                return Err(anyhow::Error::new(e).context("fetching record"));
            }
            // Unreachable or absent records only cost this game a pause
            other => {
                let reason = match other {
                    Err(e) => e.to_string(),
                    _ => "no record".to_string(),
                };
                warn!(
                    "Game {}: error getting game ({}), next game in {:?}",
                    id, reason, self.config.fetch_retry_delay
                );
                sleep(self.config.fetch_retry_delay).await;
                return Ok(GameOutcome::Unavailable);
            }
        };

        let record = GameRecord::parse(id.clone(), &text, &self.coords).context("parsing record")?;
        if record.dropped > 0 {
            warn!("Game {}: dropped {} unreadable moves", id, record.dropped);
        }

        let history: Vec<String> = record
            .moves
            .iter()
            .map(|&cell| self.coords.encode_engine(cell, record.size))
            .collect();
        info!("Game {}, size {}: {}", id, record.size, history.join(" "));

        let request = MoveRequest::new(record.size, history);
        let engine_move = self
            .engine
            .generate_move(&request)
            .await
            .map_err(BridgeError::from)
            .context("engine exchange")?;

        let cell = self
            .coords
            .decode_engine_token(&engine_move, record.size)
            .map_err(|e| BridgeError::Engine(EngineError::MalformedResponse(e.to_string())))
            .context("converting engine move")?;
        let server_move = self.coords.encode_server(cell, record.size);
        info!(
            "Game {}, size {}: response {} ({} to move, server {})",
            id, record.size, engine_move, request.to_move, server_move
        );

        timed(
            self.config.server_timeout,
            "posting move",
            self.server.post_move(id, &server_move),
        )
        .await
        .context("posting move")?;

        Ok(GameOutcome::Posted {
            engine_move,
            server_move,
        })
    }
}

/// Bound a server call, turning an elapsed limit into `BridgeError::Timeout`
async fn timed<T>(limit: Duration, what: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| BridgeError::Timeout(format!("{} took longer than {:?}", what, limit)))?
}

fn is_transient(e: &anyhow::Error) -> bool {
    e.chain()
        .filter_map(|cause| cause.downcast_ref::<BridgeError>())
        .any(BridgeError::is_transient)
}

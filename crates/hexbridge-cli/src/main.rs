//! hexbridge: plays Havannah games from a game server with a local engine
//!
//! Polls the inbox for games awaiting our move, replays each game through a
//! freshly started engine process, and posts the engine's answer. Runs until
//! killed; failures only pause the loop.

mod config;

use anyhow::Result;
use clap::Parser;
use config::BridgeConfig;
use engine_client::ProcessEngine;
use hexbridge_core::{BoardSize, HavannahCoords, MAX_BOARD_SIZE, verify_round_trip};
use hexbridge_driver::{GameSessionDriver, InboxServer};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Bridge between a Havannah game server and a local engine
#[derive(Parser, Debug)]
#[command(name = "hexbridge")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Engine executable (overrides the config file)
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Spool directory (overrides the config file)
    #[arg(long)]
    inbox: Option<PathBuf>,

    /// Log engine protocol traffic
    #[arg(short, long)]
    verbose: bool,

    /// Check the coordinate notations and exit
    #[arg(long)]
    self_check: bool,
}

impl Cli {
    fn apply(&self, config: &mut BridgeConfig) {
        if let Some(engine) = &self.engine {
            config.engine.program = engine.clone();
        }
        if let Some(inbox) = &self.inbox {
            config.inbox.root = inbox.clone();
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Round-trip every cell of every supported board through all notations
fn self_check() -> Result<()> {
    let mut cells = 0;
    for side in 1..=u32::from(MAX_BOARD_SIZE) {
        cells += verify_round_trip(&HavannahCoords, BoardSize::new(side)?)?;
    }
    info!(
        "Coordinate self-check passed ({} cells, sides 1-{})",
        cells, MAX_BOARD_SIZE
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut config = match &cli.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };
    cli.apply(&mut config);

    self_check()?;
    if cli.self_check {
        return Ok(());
    }

    info!(
        "hexbridge starting, engine {}, inbox {}",
        config.engine.program.display(),
        config.inbox.root.display()
    );

    let server = InboxServer::new(config.inbox.clone());
    server.prepare().await?;
    let engine = ProcessEngine::new(config.engine.clone());

    let mut driver = GameSessionDriver::new(server, engine, HavannahCoords, config.driver);
    driver.run_forever().await;

    Ok(())
}

//! # hexbridge-driver
//!
//! The supervisory side of hexbridge.
//!
//! This crate provides:
//! - `GameServer` trait for connecting to a game service
//! - `InboxServer`, a spool-directory implementation of it
//! - `GameSessionDriver`, which polls for games, asks the engine for moves,
//!   posts them back, and backs off on failures without ever exiting

pub mod driver;
pub mod inbox;
pub mod server;

pub use driver::{CycleReport, DriverConfig, GameOutcome, GameSessionDriver};
pub use inbox::{InboxConfig, InboxServer, PostedMove};
pub use server::GameServer;

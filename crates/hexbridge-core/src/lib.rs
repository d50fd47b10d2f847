//! # hexbridge-core
//!
//! Core types for bridging a Havannah game server and a move engine.
//!
//! This crate provides the pure building blocks shared by the other crates:
//! - Board geometry and player colors
//! - The record, server and engine coordinate notations
//! - Game transcript parsing
//! - Error types

pub mod board;
pub mod error;
pub mod notation;
pub mod record;

pub use board::{BoardSize, Cell, MAX_BOARD_SIZE, Player};
pub use error::{BridgeError, DecodeError, EngineError, Result};
pub use notation::{CoordinateTranscoder, HavannahCoords, verify_round_trip};
pub use record::{GameId, GameRecord};

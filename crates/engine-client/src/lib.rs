//! Engine process client for hexbridge
//!
//! This crate provides:
//! - The engine text protocol (command lines, blank-line response framing)
//! - `EngineSession`, the four-command exchange over any async reader/writer
//! - `ProcessEngine`, which spawns a fresh engine process per decision and
//!   always reaps it, on success and on failure
//! - The `MoveEngine` trait the driver depends on

pub mod engine;
pub mod process;
pub mod protocol;

pub use engine::{MoveEngine, MoveRequest};
pub use process::{EngineConfig, EngineProcess, ProcessEngine};
pub use protocol::{EngineCommand, EngineResponse, EngineSession};

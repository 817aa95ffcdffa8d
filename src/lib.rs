//! # ML Gobang
//!
//! A five-in-a-row board engine with a self-play training loop. A Burn
//! policy network plays both colours, imitates every move it makes, and
//! logs each one to a replayable transcript.
//!
//! ## Modules
//!
//! - [`game`]: board, players, coordinates, and the game engine
//! - [`ai`]: the trainable policy seam, network, and state encoding
//! - [`training`]: episode state machine, move sampling, and the run loop
//! - [`checkpoint`]: per-size model artifacts and the tolerant parameter merge
//! - [`transcript`]: the move log format, writer, reader, and replay cursor
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: structured error types

#![recursion_limit = "256"]

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
pub mod transcript;

//! arplay - AR mini-game engine
//!
//! The engine crates provide math, collision, input, the ECS with its scene
//! graph and the AR session layer. This crate puts them together:
//!
//! - [`config`] - layered configuration (TOML files plus `ARPLAY_*` env vars)
//! - [`systems`] - target game systems run by the world
//! - [`game`] - the [`TargetDrop`](game::TargetDrop) and [`PlaceCube`](game::PlaceCube)
//!   controllers a host drives each frame
//! - [`input`] - key mapping to game actions

pub mod config;
pub mod game;
pub mod input;
pub mod systems;

pub use config::{AppConfig, ConfigError};
pub use game::{GameError, PlaceCube, TapOutcome, TargetDrop};

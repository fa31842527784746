//! Input handling module
//!
//! Provides key mapping from raw events to game actions.

mod input_mapper;

pub use input_mapper::{GameAction, InputMapper};

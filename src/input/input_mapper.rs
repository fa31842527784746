//! Input mapping from raw key events to game actions
//!
//! Pointer input is not mapped here; taps go through the gesture recognizer.

use arplay_input::{ElementState, KeyCode};

/// Actions triggered from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Pause a running round, or resume a paused one (P or Escape)
    TogglePause,
    /// Tear down and start a fresh round (R key)
    Restart,
}

/// Maps raw key events to [`GameAction`]s
pub struct InputMapper;

impl InputMapper {
    /// Map keyboard input to an action
    ///
    /// Only presses are mapped; releases and unbound keys return `None`.
    pub fn map_keyboard(key: KeyCode, state: ElementState) -> Option<GameAction> {
        if state != ElementState::Pressed {
            return None;
        }

        match key {
            KeyCode::KeyP | KeyCode::Escape => Some(GameAction::TogglePause),
            KeyCode::KeyR => Some(GameAction::Restart),
            _ => None,
        }
    }
}

//! Input handling for arplay
//!
//! This crate provides:
//! - [`GestureRecognizer`]: tap, double tap, long press, drag, pinch and rotate from pointer samples
//! - [`InputManager`]: gesture facade plus winit keyboard state and ray queries

mod gesture;
mod input_manager;

pub use gesture::{
    GestureConfig, GestureEvent, GestureKind, GestureListener, GestureRecognizer, ListenerId, PointerEvent,
    PointerId, PointerPhase,
};
pub use input_manager::InputManager;

// Re-export winit key types so hosts need not depend on winit directly
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;

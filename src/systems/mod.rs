//! Target game systems
//!
//! Registered on the [`World`](arplay_core::World) by the
//! [`TargetDrop`](crate::game::TargetDrop) controller, in priority order:
//! hit detection (early), spawning and the round clock (normal), lifetime
//! cleanup (late). Target motion runs in the fixed step.

mod game_state;
mod hit_detection;
mod lifetime;
mod target_movement;
mod target_spawn;

pub use game_state::GameStateSystem;
pub use hit_detection::{HitDetectionSystem, HIT_ANIMATION_MS};
pub use lifetime::LifetimeSystem;
pub use target_movement::TargetMovementSystem;
pub use target_spawn::{TargetSpawnSystem, TARGET_PALETTE};

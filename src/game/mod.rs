//! Game controllers: Target Drop, Place Cube and their shared frame clock

mod clock;
mod place_cube;
mod target_drop;

pub use clock::FrameClock;
pub use place_cube::{PlaceCube, CUBE_NODE, CUBE_SCENE_NAME, MAX_CUBES};
pub use target_drop::{GameError, TapOutcome, TargetDrop, SCENE_NAME, SPAWN_PAD_NODE};

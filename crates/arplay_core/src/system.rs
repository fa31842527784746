//! Systems: per-tick logic run by the [`World`](crate::World)

use std::any::Any;

use crate::World;

/// Ordering key for systems; lower runs first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub i32);

impl Priority {
    pub const EARLY: Priority = Priority(0);
    pub const NORMAL: Priority = Priority(100);
    pub const LATE: Priority = Priority(200);
}

impl Default for Priority {
    fn default() -> Self {
        Priority::NORMAL
    }
}

/// Logic that operates on the world once per tick
///
/// Systems receive the world mutably and are not themselves stored in it
/// while they run, so a system may freely create and destroy entities or
/// register other systems. Registration changes made during a tick apply
/// once the tick finishes.
pub trait System: Any {
    /// Unique name within a world
    fn name(&self) -> &str;

    fn priority(&self) -> Priority {
        Priority::NORMAL
    }

    /// Called once when the system is added
    fn on_init(&mut self, _world: &mut World) {}

    /// Variable-rate update; `dt` is in seconds
    fn update(&mut self, _world: &mut World, _dt: f32) {}

    /// Fixed-rate update, zero or more times per tick
    fn fixed_update(&mut self, _world: &mut World, _fixed_dt: f32) {}

    /// Called once when the system is removed or the world is cleared
    fn on_destroy(&mut self, _world: &mut World) {}

    /// Downcasting hook used by [`World::with_system`]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A registered system and its enabled flag
pub(crate) struct SystemEntry {
    pub(crate) system: Box<dyn System>,
    pub(crate) enabled: bool,
}

impl SystemEntry {
    pub(crate) fn new(system: Box<dyn System>) -> Self {
        Self { system, enabled: true }
    }

    pub(crate) fn name(&self) -> &str {
        self.system.name()
    }

    pub(crate) fn priority(&self) -> Priority {
        self.system.priority()
    }
}

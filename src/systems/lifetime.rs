//! Removal of entities whose lifetime has run out

use arplay_core::components::LifetimeComponent;
use arplay_core::{Entity, Priority, System, World};

/// Destroys every entity with an expired [`LifetimeComponent`]
///
/// Runs late so gameplay systems see expiring entities first.
#[derive(Default)]
pub struct LifetimeSystem;

impl LifetimeSystem {
    pub const NAME: &'static str = "lifetime";
}

impl System for LifetimeSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> Priority {
        Priority::LATE
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        let now = world.time_ms();
        let expired: Vec<Entity> = world
            .store::<LifetimeComponent>()
            .iter()
            .filter(|(_, l)| l.is_expired(now))
            .map(|(e, _)| e)
            .collect();

        for entity in expired {
            world.destroy_entity(entity);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

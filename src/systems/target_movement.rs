//! Fixed-step target motion

use arplay_core::components::{TargetComponent, TransformComponent, VelocityComponent};
use arplay_core::{ComponentMask, System, World};

/// Vertical speed kept after bouncing off the ground
const BOUNCE_RESTITUTION: f32 = 0.7;

/// Drifts target origins by their velocity and applies the move pattern
///
/// Runs in `fixed_update`. Hit targets freeze in place.
pub struct TargetMovementSystem {
    ground_y: f32,
}

impl Default for TargetMovementSystem {
    fn default() -> Self {
        Self { ground_y: 0.0 }
    }
}

impl TargetMovementSystem {
    pub const NAME: &'static str = "target_movement";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ground_y(&mut self, y: f32) {
        self.ground_y = y;
    }

    pub fn ground_y(&self) -> f32 {
        self.ground_y
    }
}

impl System for TargetMovementSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn fixed_update(&mut self, world: &mut World, dt: f32) {
        let now = world.time_ms();

        for entity in world.entities_with(ComponentMask::TARGET | ComponentMask::TRANSFORM) {
            let Some(target) = world.get_component::<TargetComponent>(entity).copied() else {
                continue;
            };
            if target.is_hit {
                continue;
            }

            let mut origin = target.origin;
            if let Some(motion) = world.get_component_mut::<VelocityComponent>(entity) {
                origin += motion.velocity * dt;
                motion.velocity *= motion.damping;
                motion.velocity += motion.acceleration * dt;

                if origin.y < self.ground_y {
                    origin.y = self.ground_y;
                    motion.velocity.y = motion.velocity.y.abs() * BOUNCE_RESTITUTION;
                }
            }

            let position = origin + target.pattern.offset(target.speed, target.age_secs(now));
            if let Some(t) = world.get_component_mut::<TargetComponent>(entity) {
                t.origin = origin;
            }
            if let Some(transform) = world.get_component_mut::<TransformComponent>(entity) {
                transform.local.position = position;
            }
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

//! Target spawning around active spawn pads

use arplay_core::components::{
    ColliderComponent, GameStateComponent, LifetimeComponent, MovePattern, PrimitiveShapeComponent,
    ShapeType, SpawnPadComponent, TargetComponent, TransformComponent, VelocityComponent,
};
use arplay_core::{Collider, ComponentMask, Entity, System, World};
use arplay_math::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::GameConfig;

/// Target colors, picked at random per spawn
pub const TARGET_PALETTE: [&str; 6] = ["#ff6b6b", "#4ecdc4", "#45b7d1", "#f9ca24", "#6c5ce7", "#ff8c42"];

const TARGET_SIZE: f32 = 0.1;

/// Spawns targets while a round is being played
///
/// Each active pad spawns at most one target per tick, once its interval
/// has elapsed and fewer than its maximum are alive.
pub struct TargetSpawnSystem {
    config: GameConfig,
    rng: ChaCha8Rng,
}

impl TargetSpawnSystem {
    pub const NAME: &'static str = "target_spawn";

    pub fn new(config: &GameConfig) -> Self {
        Self {
            config: config.clone(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Create one target near `center`
    pub fn spawn_target(&mut self, world: &mut World, center: Vec3, now_ms: f64) -> Entity {
        let r = self.config.spawn_radius;
        let offset = Vec3::new(
            (self.rng.random::<f32>() - 0.5) * 2.0 * r,
            self.rng.random_range(0.2..0.5),
            (self.rng.random::<f32>() - 0.5) * 2.0 * r,
        );
        let position = center + offset;
        let pattern = MovePattern::ALL[self.rng.random_range(0..MovePattern::ALL.len())];
        let color = TARGET_PALETTE[self.rng.random_range(0..TARGET_PALETTE.len())];
        let velocity = Vec3::new(
            self.rng.random_range(-0.25..0.25),
            self.rng.random_range(0.0..0.2),
            self.rng.random_range(-0.25..0.25),
        );

        let entity = world.create_entity();
        world.add_component(entity, TransformComponent::from_position(position));
        world.add_component(
            entity,
            TargetComponent::new(self.config.target_points, self.config.target_speed, pattern)
                .with_origin(position, now_ms),
        );
        world.add_component(
            entity,
            PrimitiveShapeComponent::new(
                ShapeType::Sphere,
                PrimitiveShapeComponent::color_from_hex(color),
                Vec3::ONE * TARGET_SIZE,
            ),
        );
        world.add_component(entity, ColliderComponent::new(Collider::sphere(self.config.target_radius)));
        world.add_component(entity, VelocityComponent::new(velocity));
        world.add_component(entity, LifetimeComponent::new(self.config.target_lifetime_ms, now_ms));

        log::debug!("Spawned {} at {} ({:?})", entity, position, pattern);
        entity
    }
}

fn round_is_playing(world: &World) -> bool {
    world
        .first_with::<GameStateComponent>()
        .and_then(|e| world.get_component::<GameStateComponent>(e))
        .is_some_and(|s| s.is_playing())
}

impl System for TargetSpawnSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        if !round_is_playing(world) {
            return;
        }

        let now = world.time_ms();
        let mut active = world
            .store::<TargetComponent>()
            .iter()
            .filter(|(_, t)| !t.is_hit)
            .count();

        for pad in world.entities_with(ComponentMask::SPAWN_PAD) {
            let ready = world
                .get_component::<SpawnPadComponent>(pad)
                .is_some_and(|p| p.can_spawn(now, active));
            if !ready {
                continue;
            }
            let Some(center) = world.world_position(pad) else {
                continue;
            };

            self.spawn_target(world, center, now);
            active += 1;
            if let Some(p) = world.get_component_mut::<SpawnPadComponent>(pad) {
                p.last_spawn_ms = now;
            }
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

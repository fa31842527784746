//! Tap-to-hit resolution for targets
//!
//! A tap becomes a ray from the current camera; the closest unhit target
//! whose bounding sphere the ray crosses is marked hit, scored and scheduled
//! for removal once its hit animation has played.

use arplay_core::components::{
    AnimationComponent, AnimationKind, ColliderComponent, ScoreComponent, TargetComponent,
};
use arplay_core::{ComponentMask, Entity, Priority, System, World};
use arplay_math::Vec2;
use arplay_physics::{cast, screen_point_to_ray, RayCamera, RaycastTarget};

use crate::config::GameConfig;

/// Length of the scale pulse played on a hit target
pub const HIT_ANIMATION_MS: f64 = 300.0;

/// Resolves taps against targets and removes hit targets after a delay
pub struct HitDetectionSystem {
    camera: RayCamera,
    width: f32,
    height: f32,
    /// Picking radius for targets without a collider
    target_radius: f32,
    destroy_delay_ms: f64,
}

impl HitDetectionSystem {
    pub const NAME: &'static str = "hit_detection";

    pub fn new(config: &GameConfig) -> Self {
        Self {
            camera: RayCamera::default(),
            width: 1280.0,
            height: 720.0,
            target_radius: config.target_radius,
            destroy_delay_ms: config.hit_destroy_delay_ms,
        }
    }

    pub fn set_camera(&mut self, camera: RayCamera) {
        self.camera = camera;
    }

    pub fn camera(&self) -> &RayCamera {
        &self.camera
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            log::warn!("Ignoring invalid viewport {}x{}", width, height);
            return;
        }
        self.width = width;
        self.height = height;
    }

    /// (width, height) in pixels
    pub fn viewport(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Resolve a tap at `screen_pos`
    ///
    /// Returns the target that was hit. Targets already hit are not
    /// candidates, so a second tap on the same target scores nothing.
    pub fn handle_tap(&mut self, world: &mut World, screen_pos: Vec2) -> Option<Entity> {
        let ray = screen_point_to_ray(screen_pos, self.width, self.height, &self.camera);

        let candidates: Vec<RaycastTarget<Entity>> = world
            .entities_with(ComponentMask::TARGET | ComponentMask::TRANSFORM)
            .into_iter()
            .filter(|&e| world.get_component::<TargetComponent>(e).is_some_and(|t| !t.is_hit))
            .filter_map(|e| {
                let center = world.world_position(e)?;
                let radius = world
                    .get_component::<ColliderComponent>(e)
                    .map(|c| c.bounding_radius())
                    .unwrap_or(self.target_radius);
                Some(RaycastTarget { center, radius, id: e })
            })
            .collect();

        let hit = cast(&ray, &candidates)?;
        let entity = hit.id;
        let now = world.time_ms();

        let points = {
            let target = world.get_component_mut::<TargetComponent>(entity)?;
            if !target.mark_hit(now, self.destroy_delay_ms) {
                return None;
            }
            target.points
        };

        if let Some(score_entity) = world.first_with::<ScoreComponent>() {
            if let Some(score) = world.get_component_mut::<ScoreComponent>(score_entity) {
                let awarded = score.add_points(points);
                log::debug!("Hit {} for {:.1} points (combo {})", entity, awarded, score.combo);
            }
        }

        world.add_component(entity, AnimationComponent::new(AnimationKind::Scale, HIT_ANIMATION_MS, now));
        Some(entity)
    }
}

impl System for HitDetectionSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> Priority {
        Priority::EARLY
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        let now = world.time_ms();
        let expired: Vec<Entity> = world
            .store::<TargetComponent>()
            .iter()
            .filter(|(_, t)| t.should_destroy(now))
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

#[cfg(test)]
mod tests {
    use super::*;
    use arplay_core::components::TransformComponent;
    use arplay_core::Collider;
    use arplay_math::Vec3;

    const CENTER: Vec2 = Vec2 { x: 640.0, y: 360.0 };

    fn setup() -> (World, HitDetectionSystem, Entity) {
        let mut world = World::new();
        let score = world.create_entity();
        world.add_component(score, ScoreComponent::default());

        let target = world.create_entity();
        let position = Vec3::new(0.0, 1.6, -2.0);
        world.add_component(target, TransformComponent::from_position(position));
        world.add_component(target, TargetComponent::new(10, 0.3, Default::default()).with_origin(position, 0.0));

        (world, HitDetectionSystem::new(&GameConfig::default()), target)
    }

    #[test]
    fn test_tap_center_hits_target() {
        let (mut world, mut system, target) = setup();
        assert_eq!(system.handle_tap(&mut world, CENTER), Some(target));

        let score_entity = world.first_with::<ScoreComponent>().unwrap();
        let score = world.get_component::<ScoreComponent>(score_entity).unwrap();
        assert_eq!(score.current, 10.0);
        assert_eq!(score.hits, 1);

        let t = world.get_component::<TargetComponent>(target).unwrap();
        assert!(t.is_hit);
        assert_eq!(t.destroy_at_ms, Some(300.0));
        assert!(world.has_component::<AnimationComponent>(target));
    }

    #[test]
    fn test_second_tap_scores_nothing() {
        let (mut world, mut system, target) = setup();
        assert_eq!(system.handle_tap(&mut world, CENTER), Some(target));
        assert_eq!(system.handle_tap(&mut world, CENTER), None);

        let score_entity = world.first_with::<ScoreComponent>().unwrap();
        assert_eq!(world.get_component::<ScoreComponent>(score_entity).unwrap().hits, 1);
    }

    #[test]
    fn test_tap_misses_off_axis() {
        let (mut world, mut system, _) = setup();
        assert_eq!(system.handle_tap(&mut world, Vec2::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_collider_radius_widens_pick() {
        let (mut world, mut system, target) = setup();
        // Just outside the default 0.1 radius at 2 m
        let tap = Vec2::new(640.0 + 60.0, 360.0);
        assert_eq!(system.handle_tap(&mut world, tap), None);

        world.add_component(target, ColliderComponent::new(Collider::sphere(0.5)));
        assert_eq!(system.handle_tap(&mut world, tap), Some(target));
    }

    #[test]
    fn test_update_destroys_after_delay() {
        let (mut world, mut system, target) = setup();
        system.handle_tap(&mut world, CENTER);
        world.add_system(system);
        world.start();

        world.update(0.1);
        world.update(0.1);
        assert!(world.is_alive(target));

        world.update(0.1);
        world.update(0.05);
        assert!(!world.is_alive(target));
    }

    #[test]
    fn test_invalid_viewport_ignored() {
        let (_, mut system, _) = setup();
        system.set_viewport(0.0, 100.0);
        assert_eq!(system.viewport(), (1280.0, 720.0));
        system.set_viewport(800.0, 600.0);
        assert_eq!(system.viewport(), (800.0, 600.0));
    }
}

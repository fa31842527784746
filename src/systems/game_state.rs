//! Round clock, missed targets and game over cleanup

use arplay_core::components::{
    GamePhase, GameStateComponent, LifetimeComponent, ScoreComponent, SpawnPadComponent, TargetComponent,
};
use arplay_core::{ComponentMask, Entity, System, World};

/// Drives the round timer and closes the round when it runs out
///
/// While playing, a target whose lifetime ends before it was hit counts as
/// a miss. When the round ends every target is removed and the spawn pads
/// are switched off.
#[derive(Default)]
pub struct GameStateSystem {
    round_closed: bool,
}

impl GameStateSystem {
    pub const NAME: &'static str = "game_state";

    pub fn new() -> Self {
        Self::default()
    }

    fn count_misses(world: &mut World, now: f64) {
        let missed: Vec<Entity> = world
            .entities_with(ComponentMask::TARGET | ComponentMask::LIFETIME)
            .into_iter()
            .filter(|&e| {
                let unhit = world.get_component::<TargetComponent>(e).is_some_and(|t| !t.is_hit);
                let expired = world
                    .get_component::<LifetimeComponent>(e)
                    .is_some_and(|l| l.is_expired(now));
                unhit && expired
            })
            .collect();
        if missed.is_empty() {
            return;
        }

        if let Some(score_entity) = world.first_with::<ScoreComponent>() {
            if let Some(score) = world.get_component_mut::<ScoreComponent>(score_entity) {
                for _ in &missed {
                    score.miss_target();
                }
            }
        }
        for entity in missed {
            log::debug!("Target {} expired unhit", entity);
            world.destroy_entity(entity);
        }
    }

    fn close_round(world: &mut World) {
        for entity in world.entities_with(ComponentMask::TARGET) {
            world.destroy_entity(entity);
        }
        for (_, pad) in world.store_mut::<SpawnPadComponent>().iter_mut() {
            pad.is_active = false;
        }

        let final_score = world
            .first_with::<ScoreComponent>()
            .and_then(|e| world.get_component::<ScoreComponent>(e))
            .map(|s| s.current)
            .unwrap_or(0.0);
        log::info!("Game over, final score {:.0}", final_score);
    }
}

impl System for GameStateSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        let now = world.time_ms();
        let Some(state_entity) = world.first_with::<GameStateComponent>() else {
            return;
        };
        let phase = match world.get_component_mut::<GameStateComponent>(state_entity) {
            Some(state) => {
                state.update(now);
                state.phase
            }
            None => return,
        };

        match phase {
            GamePhase::Playing => {
                self.round_closed = false;
                Self::count_misses(world, now);
            }
            GamePhase::GameOver if !self.round_closed => {
                self.round_closed = true;
                Self::close_round(world);
            }
            GamePhase::GameOver => {}
            _ => self.round_closed = false,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arplay_core::components::{MovePattern, TransformComponent};
    use arplay_math::Vec3;

    fn setup(duration_ms: f64) -> (World, Entity, Entity) {
        let mut world = World::new();
        let state = world.create_entity();
        let mut game = GameStateComponent::default().with_duration(duration_ms);
        game.start(0.0);
        world.add_component(state, game);

        let score = world.create_entity();
        world.add_component(score, ScoreComponent::default());

        let pad = world.create_entity();
        world.add_component(pad, SpawnPadComponent { is_active: true, ..Default::default() });

        world.add_system(GameStateSystem::new());
        world.start();
        (world, state, pad)
    }

    fn add_target(world: &mut World, lifetime_ms: f64) -> Entity {
        let e = world.create_entity();
        world.add_component(e, TransformComponent::from_position(Vec3::ZERO));
        world.add_component(e, TargetComponent::new(10, 0.3, MovePattern::Stationary));
        world.add_component(e, LifetimeComponent::new(lifetime_ms, world.time_ms()));
        e
    }

    fn score(world: &World) -> ScoreComponent {
        let e = world.first_with::<ScoreComponent>().unwrap();
        *world.get_component::<ScoreComponent>(e).unwrap()
    }

    #[test]
    fn test_expired_target_is_a_miss() {
        let (mut world, _, _) = setup(60_000.0);
        let target = add_target(&mut world, 150.0);

        world.update(0.1);
        assert!(world.is_alive(target));
        world.update(0.1);
        assert!(!world.is_alive(target));
        assert_eq!(score(&world).missed, 1);
    }

    #[test]
    fn test_hit_target_is_not_a_miss() {
        let (mut world, _, _) = setup(60_000.0);
        let target = add_target(&mut world, 50.0);
        world.get_component_mut::<TargetComponent>(target).unwrap().mark_hit(0.0, 10_000.0);

        world.update(0.1);
        assert!(world.is_alive(target));
        assert_eq!(score(&world).missed, 0);
    }

    #[test]
    fn test_round_ends_and_cleans_up() {
        let (mut world, state, pad) = setup(250.0);
        let target = add_target(&mut world, 60_000.0);

        world.update(0.1);
        world.update(0.1);
        assert!(world.is_alive(target));

        world.update(0.1);
        let game = world.get_component::<GameStateComponent>(state).unwrap();
        assert_eq!(game.phase, GamePhase::GameOver);
        assert_eq!(game.remaining_ms(), 0.0);
        assert!(!world.is_alive(target));
        assert!(!world.get_component::<SpawnPadComponent>(pad).unwrap().is_active);
    }

    #[test]
    fn test_paused_round_keeps_targets() {
        let (mut world, state, _) = setup(60_000.0);
        let target = add_target(&mut world, 50.0);
        world.get_component_mut::<GameStateComponent>(state).unwrap().pause();

        world.update(0.1);
        assert!(world.is_alive(target));
        assert_eq!(score(&world).missed, 0);
    }
}

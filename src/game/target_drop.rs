//! Target Drop: place a spawn pad on a surface, then tap falling targets
//!
//! [`TargetDrop`] owns the world, the active scene, the AR session and the
//! input state. The host drives it with [`TargetDrop::request_tick`] once per
//! frame and forwards pointer and key events as they arrive.
//!
//! Round flow: `initialize` -> `start` (placing) -> tap a surface (playing)
//! -> timer runs out (game over). `restart` goes back to placing with the
//! same session.

use arplay_core::components::{
    GamePhase, GameStateComponent, PrimitiveShapeComponent, ScoreComponent, ShapeType, SpawnPadComponent,
    TargetComponent,
};
use arplay_core::{Entity, Scene, SceneError, SceneManager, World};
use arplay_input::{
    ElementState, GestureEvent, GestureKind, InputManager, KeyCode, ListenerId, PointerEvent,
};
use arplay_math::{Transform, Vec2, Vec3};
use arplay_physics::RayCamera;
use arplay_session::{
    availability_message, AnchorId, ArSession, ArSessionError, CapabilityReport, SessionFactory, SessionState,
};

use crate::config::AppConfig;
use crate::game::FrameClock;
use crate::input::{GameAction, InputMapper};
use crate::systems::{
    GameStateSystem, HitDetectionSystem, LifetimeSystem, TargetMovementSystem, TargetSpawnSystem,
};

/// Name of the scene the game registers
pub const SCENE_NAME: &str = "target_drop";
/// Scene node holding the spawn pad
pub const SPAWN_PAD_NODE: &str = "SpawnPad";

const PAD_COLOR: &str = "#4ecdc4";
const PAD_SIZE: Vec3 = Vec3::new(0.3, 0.02, 0.3);

/// Controller error
#[derive(Debug)]
pub enum GameError {
    /// Called before `initialize`, or after the session was lost
    NotInitialized,
    /// A spawn pad can only be placed while the round is waiting for one
    NotPlacing,
    Session(ArSessionError),
    Scene(SceneError),
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::NotInitialized => write!(f, "Game is not initialized"),
            GameError::NotPlacing => write!(f, "Spawn pad can only be placed while placing"),
            GameError::Session(e) => write!(f, "Session error: {}", e),
            GameError::Scene(e) => write!(f, "Scene error: {}", e),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Session(e) => Some(e),
            GameError::Scene(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArSessionError> for GameError {
    fn from(e: ArSessionError) -> Self {
        GameError::Session(e)
    }
}

impl From<SceneError> for GameError {
    fn from(e: SceneError) -> Self {
        GameError::Scene(e)
    }
}

/// What a tap did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    /// The spawn pad was placed; the round has started
    Placed(Entity),
    /// A target was hit
    Hit(Entity),
    Nothing,
}

/// The target game controller
pub struct TargetDrop {
    config: AppConfig,
    /// Consumed by the first `initialize`
    factory: Option<SessionFactory>,
    session: Option<Box<dyn ArSession>>,
    report: Option<CapabilityReport>,

    world: World,
    scenes: SceneManager,
    input: InputManager,
    clock: FrameClock,
    camera: RayCamera,

    game_entity: Option<Entity>,
    score_entity: Option<Entity>,
    spawn_pad: Option<Entity>,
    pad_anchor: Option<AnchorId>,
    scene_transforms: Vec<(Entity, Transform)>,

    initialized: bool,
    restart_requested: bool,
}

impl TargetDrop {
    pub fn new(config: AppConfig, factory: SessionFactory) -> Self {
        let world = World::new()
            .with_fixed_timestep(config.world.fixed_timestep())
            .with_max_delta(config.world.max_delta_seconds);
        let input = InputManager::new(config.input.to_gesture_config());
        let camera = RayCamera {
            fov_y: config.viewport.fov_radians(),
            ..RayCamera::default()
        };

        Self {
            config,
            factory: Some(factory),
            session: None,
            report: None,
            world,
            scenes: SceneManager::new(),
            input,
            clock: FrameClock::new(),
            camera,
            game_entity: None,
            score_entity: None,
            spawn_pad: None,
            pad_anchor: None,
            scene_transforms: Vec::new(),
            initialized: false,
            restart_requested: false,
        }
    }

    // --- Lifecycle ---

    /// Create the session (first call only), the round entities, the systems and the scene
    pub async fn initialize(&mut self) -> Result<(), GameError> {
        if let Some(factory) = self.factory.take() {
            let (session, report) = factory.create_with_report().await;
            log::info!("{}", availability_message(&report));
            self.session = Some(session);
            self.report = Some(report);
        }

        let game = self.world.create_entity();
        let mut state = GameStateComponent::default().with_duration(self.config.game.duration_ms);
        state.phase = GamePhase::Placing;
        self.world.add_component(game, state);
        self.game_entity = Some(game);

        let score = self.world.create_entity();
        self.world.add_component(score, ScoreComponent::default());
        self.score_entity = Some(score);

        let game_config = &self.config.game;
        let mut hit_detection = HitDetectionSystem::new(game_config);
        hit_detection.set_viewport(self.config.viewport.width, self.config.viewport.height);
        hit_detection.set_camera(self.camera);
        self.world.add_system(hit_detection);
        self.world.add_system(TargetSpawnSystem::new(game_config));
        self.world.add_system(TargetMovementSystem::new());
        self.world.add_system(GameStateSystem::new());
        self.world.add_system(LifetimeSystem);

        let scene = Scene::new(&mut self.world, SCENE_NAME);
        self.scenes.register_scene(scene)?;
        self.scenes.load_scene(SCENE_NAME)?;

        self.initialized = true;
        log::debug!("Target drop initialized");
        Ok(())
    }

    /// Start the session and the world, and wait for pad placement
    pub async fn start(&mut self) -> Result<(), GameError> {
        if !self.initialized {
            return Err(GameError::NotInitialized);
        }
        let session = self.session.as_mut().ok_or(GameError::NotInitialized)?;
        session.start().await?;

        self.world.start();
        self.input.enable();
        if let Some(state) = self.game_state_mut() {
            state.phase = GamePhase::Placing;
        }
        log::info!("Target drop started, tap a surface to place the spawn pad");
        Ok(())
    }

    /// Stop the session and freeze the world
    pub async fn stop(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.stop().await;
        }
        self.world.stop();
        self.input.clear();
        self.pad_anchor = None;
    }

    /// Tear the round down and start over with the same session
    ///
    /// The high score carries over.
    pub async fn restart(&mut self) -> Result<(), GameError> {
        let high = self.score().map(|s| s.high).unwrap_or(0.0);
        log::info!("Restarting target drop");

        self.stop().await;
        self.world.clear();
        self.scenes.clear();
        self.game_entity = None;
        self.score_entity = None;
        self.spawn_pad = None;
        self.scene_transforms.clear();
        self.initialized = false;
        self.restart_requested = false;

        self.initialize().await?;
        if let Some(score) = self.score_entity.and_then(|e| self.world.get_component_mut::<ScoreComponent>(e)) {
            score.high = high;
        }
        self.start().await
    }

    /// Set by the restart key; the host should call [`restart`](Self::restart)
    pub fn restart_requested(&self) -> bool {
        self.restart_requested
    }

    // --- Input ---

    /// Feed a pointer sample; taps are routed to placement or hit detection
    ///
    /// The second tap of a double tap counts as a tap too, so quick
    /// successive shots are not lost.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<GestureEvent> {
        let gestures = self.input.handle_pointer(event);
        for gesture in &gestures {
            match *gesture {
                GestureEvent::Tap { position, .. } | GestureEvent::DoubleTap { position, .. } => {
                    self.tap(position);
                }
                _ => {}
            }
        }
        gestures
    }

    /// Resolve a tap at `screen_pos`
    pub fn tap(&mut self, screen_pos: Vec2) -> TapOutcome {
        if self.is_placing() {
            let Some(hit) = self
                .session
                .as_ref()
                .and_then(|s| s.hit_test(screen_pos.x, screen_pos.y).into_iter().next())
            else {
                log::debug!("No surface under {}", screen_pos);
                return TapOutcome::Nothing;
            };
            return match self.place_spawn_pad_at(hit.position) {
                Ok(pad) => TapOutcome::Placed(pad),
                Err(e) => {
                    log::warn!("Failed to place spawn pad: {}", e);
                    TapOutcome::Nothing
                }
            };
        }

        let playing = self.game_state().is_some_and(|s| s.is_playing());
        if !playing {
            return TapOutcome::Nothing;
        }
        self.world
            .with_system::<HitDetectionSystem, _>(HitDetectionSystem::NAME, |system, world| {
                system.handle_tap(world, screen_pos)
            })
            .flatten()
            .map_or(TapOutcome::Nothing, TapOutcome::Hit)
    }

    /// Feed a key event; returns the mapped action, if any
    pub fn handle_key(&mut self, key: KeyCode, state: ElementState) -> Option<GameAction> {
        self.input.process_key(key, state);
        let action = InputMapper::map_keyboard(key, state)?;
        match action {
            GameAction::TogglePause => self.toggle_pause(),
            GameAction::Restart => self.restart_requested = true,
        }
        Some(action)
    }

    pub fn on_gesture(&mut self, kind: GestureKind, listener: impl FnMut(&GestureEvent) + 'static) -> ListenerId {
        self.input.on_gesture(kind, listener)
    }

    pub fn off_gesture(&mut self, kind: GestureKind, id: ListenerId) -> bool {
        self.input.off_gesture(kind, id)
    }

    // --- Spawn pad ---

    /// Put the spawn pad at `position` and start the round
    pub fn place_spawn_pad_at(&mut self, position: Vec3) -> Result<Entity, GameError> {
        if !self.initialized {
            return Err(GameError::NotInitialized);
        }
        if !self.is_placing() {
            return Err(GameError::NotPlacing);
        }

        let scene = self.scenes.active_scene_mut().ok_or(GameError::NotInitialized)?;
        let key = scene.create_node(&mut self.world, SPAWN_PAD_NODE);
        scene.set_local_transform(&mut self.world, key, Transform::from_position(position))?;
        let pad = scene.entity(key).ok_or(SceneError::NodeNotFound)?;

        let now = self.world.time_ms();
        let interval = self.config.game.spawn_interval_ms;
        self.world.add_component(
            pad,
            PrimitiveShapeComponent::new(ShapeType::Cylinder, PrimitiveShapeComponent::color_from_hex(PAD_COLOR), PAD_SIZE),
        );
        // First target appears on the next tick
        self.world.add_component(
            pad,
            SpawnPadComponent {
                spawn_interval_ms: interval,
                last_spawn_ms: now - interval,
                max_active_targets: self.config.game.max_active_targets,
                is_active: true,
            },
        );
        self.world
            .with_system::<TargetMovementSystem, _>(TargetMovementSystem::NAME, |system, _| {
                system.set_ground_y(position.y)
            });
        self.spawn_pad = Some(pad);

        if let Some(state) = self.game_state_mut() {
            state.start(now);
        }
        log::info!("Spawn pad placed at {}, round started", position);
        Ok(pad)
    }

    /// Anchor the spawn pad in the session so tracking keeps it in place
    pub async fn anchor_spawn_pad(&mut self) -> Result<AnchorId, GameError> {
        let pad = self.spawn_pad.ok_or(GameError::NotPlacing)?;
        let pose = self.world.world_transform(pad).ok_or(GameError::NotInitialized)?;
        let session = self.session.as_mut().ok_or(GameError::NotInitialized)?;

        let anchor = session.create_anchor(pose.position, pose.rotation).await?;
        log::debug!("Spawn pad anchored as {}", anchor.id);
        self.pad_anchor = Some(anchor.id.clone());
        Ok(anchor.id)
    }

    // --- Ticking ---

    /// Advance one host frame of `dt` seconds
    pub fn request_tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }
        let now = self.clock.tick(dt);

        if let Some(session) = self.session.as_mut() {
            session.update(now);
            if let Some(frame) = session.current_frame() {
                self.camera = RayCamera::new(
                    frame.camera.position(),
                    frame.camera.forward(),
                    frame.camera.up(),
                    self.config.viewport.fov_radians(),
                );
            }
        }
        let camera = self.camera;
        self.world
            .with_system::<HitDetectionSystem, _>(HitDetectionSystem::NAME, |system, _| system.set_camera(camera));

        self.input.update();
        self.world.update(dt);
        self.scene_transforms = self.scenes.update(&self.world);
    }

    /// Freeze the round; lifetimes and the round timer stop with the world clock
    pub fn pause(&mut self) {
        let Some(state) = self.game_state_mut() else {
            return;
        };
        if state.phase != GamePhase::Playing {
            return;
        }
        state.pause();
        self.world.stop();
        log::info!("Paused");
    }

    pub fn resume(&mut self) {
        let Some(state) = self.game_state_mut() else {
            return;
        };
        if state.phase != GamePhase::Paused {
            return;
        }
        state.resume();
        self.world.start();
        log::info!("Resumed");
    }

    pub fn toggle_pause(&mut self) {
        match self.game_state().map(|s| s.phase) {
            Some(GamePhase::Playing) => self.pause(),
            Some(GamePhase::Paused) => self.resume(),
            _ => {}
        }
    }

    // --- Read-only views ---

    pub fn game_state(&self) -> Option<&GameStateComponent> {
        self.game_entity.and_then(|e| self.world.get_component::<GameStateComponent>(e))
    }

    fn game_state_mut(&mut self) -> Option<&mut GameStateComponent> {
        self.game_entity.and_then(|e| self.world.get_component_mut::<GameStateComponent>(e))
    }

    pub fn score(&self) -> Option<&ScoreComponent> {
        self.score_entity.and_then(|e| self.world.get_component::<ScoreComponent>(e))
    }

    /// World positions of targets that can still be hit
    pub fn target_positions(&self) -> Vec<(Entity, Vec3)> {
        self.world
            .store::<TargetComponent>()
            .iter()
            .filter(|(_, t)| !t.is_hit)
            .filter_map(|(e, _)| self.world.world_position(e).map(|p| (e, p)))
            .collect()
    }

    pub fn is_placing(&self) -> bool {
        self.game_state().is_some_and(|s| s.phase == GamePhase::Placing)
    }

    pub fn session_state(&self) -> Option<SessionState> {
        self.session.as_ref().map(|s| s.state())
    }

    pub fn capability(&self) -> Option<&CapabilityReport> {
        self.report.as_ref()
    }

    /// World transforms of the scene nodes, refreshed every tick
    pub fn scene_transforms(&self) -> &[(Entity, Transform)] {
        &self.scene_transforms
    }

    pub fn spawn_pad(&self) -> Option<Entity> {
        self.spawn_pad
    }

    pub fn pad_anchor(&self) -> Option<&AnchorId> {
        self.pad_anchor.as_ref()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn camera(&self) -> &RayCamera {
        &self.camera
    }

    /// (width, height) in pixels
    pub fn viewport(&self) -> (f32, f32) {
        (self.config.viewport.width, self.config.viewport.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arplay_session::SessionConfig;
    use pollster::block_on;

    fn game() -> TargetDrop {
        let config = AppConfig::default();
        let factory = SessionFactory::new(config.session.to_session_config());
        TargetDrop::new(config, factory)
    }

    fn started() -> TargetDrop {
        let mut game = game();
        block_on(game.initialize()).unwrap();
        block_on(game.start()).unwrap();
        game
    }

    #[test]
    fn test_start_requires_initialize() {
        let mut game = game();
        assert!(matches!(block_on(game.start()), Err(GameError::NotInitialized)));
        assert!(game.session_state().is_none());
    }

    #[test]
    fn test_initialize_enters_placing() {
        let game = started();
        assert!(game.is_placing());
        assert_eq!(game.session_state(), Some(SessionState::Started));
        assert_eq!(game.score().map(|s| s.current), Some(0.0));
        assert!(game.world().has_system(HitDetectionSystem::NAME));
        assert!(game.world().has_system(LifetimeSystem::NAME));
        assert_eq!(game.capability().map(|r| r.supported), Some(false));
    }

    #[test]
    fn test_tap_places_pad_on_surface() {
        let mut game = started();
        game.request_tick(1.0 / 60.0);

        let outcome = game.tap(Vec2::new(640.0, 500.0));
        let TapOutcome::Placed(pad) = outcome else {
            panic!("expected placement, got {:?}", outcome);
        };
        assert!(!game.is_placing());
        assert!(game.game_state().unwrap().is_playing());
        let position = game.world().world_position(pad).unwrap();
        assert!(position.approx_eq(Vec3::new(0.0, 0.0, -1.0), 0.0001));

        // Second placement is refused
        assert!(matches!(game.place_spawn_pad_at(Vec3::ZERO), Err(GameError::NotPlacing)));
    }

    #[test]
    fn test_pad_spawns_targets() {
        let mut game = started();
        game.place_spawn_pad_at(Vec3::new(0.0, 0.0, -1.0)).unwrap();
        game.request_tick(1.0 / 60.0);
        assert_eq!(game.target_positions().len(), 1);
        assert!(game.scene_transforms().iter().any(|(e, _)| Some(*e) == game.spawn_pad()));
    }

    #[test]
    fn test_anchor_spawn_pad() {
        let mut game = started();
        assert!(matches!(block_on(game.anchor_spawn_pad()), Err(GameError::NotPlacing)));

        game.request_tick(1.0 / 60.0);
        game.place_spawn_pad_at(Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let id = block_on(game.anchor_spawn_pad()).unwrap();
        assert_eq!(game.pad_anchor(), Some(&id));
    }

    #[test]
    fn test_pause_key_freezes_world() {
        let mut game = started();
        game.place_spawn_pad_at(Vec3::new(0.0, 0.0, -1.0)).unwrap();
        game.request_tick(0.05);

        assert_eq!(game.handle_key(KeyCode::KeyP, ElementState::Pressed), Some(GameAction::TogglePause));
        assert_eq!(game.game_state().unwrap().phase, GamePhase::Paused);
        let frozen = game.world().time_ms();
        game.request_tick(0.05);
        assert_eq!(game.world().time_ms(), frozen);

        game.handle_key(KeyCode::KeyP, ElementState::Released);
        game.handle_key(KeyCode::Escape, ElementState::Pressed);
        assert!(game.game_state().unwrap().is_playing());
    }

    #[test]
    fn test_restart_key_sets_request() {
        let mut game = started();
        assert!(!game.restart_requested());
        game.handle_key(KeyCode::KeyR, ElementState::Pressed);
        assert!(game.restart_requested());

        block_on(game.restart()).unwrap();
        assert!(!game.restart_requested());
        assert!(game.is_placing());
        assert_eq!(game.session_state(), Some(SessionState::Started));
    }

    #[test]
    fn test_forced_real_mode_fails_to_start() {
        let config = AppConfig::default();
        let factory = SessionFactory::new(SessionConfig::default())
            .with_forced_mode(Some(arplay_session::ArMode::Real));
        let mut game = TargetDrop::new(config, factory);
        block_on(game.initialize()).unwrap();
        let err = block_on(game.start()).unwrap_err();
        assert!(matches!(err, GameError::Session(ref e) if e.code() == "NOT_SUPPORTED"));
    }

    #[test]
    fn test_simulated_frame_drives_camera() {
        let mut game = started();
        game.request_tick(1.0 / 60.0);
        assert!(game.camera().position.approx_eq(Vec3::new(0.0, 1.6, 0.0), 0.0001));
    }
}

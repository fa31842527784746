//! Place Cube: tap a detected surface to drop a small cube on it
//!
//! The smallest complete use of the engine: a session, a scene and the
//! gesture pipeline, without any game systems. Only the newest
//! [`MAX_CUBES`] cubes are kept; placing one more removes the oldest.

use std::collections::VecDeque;

use arplay_core::components::{PrimitiveShapeComponent, ShapeType};
use arplay_core::{Entity, NodeKey, Scene, SceneError, SceneManager, World};
use arplay_input::{GestureEvent, GestureKind, InputManager, ListenerId, PointerEvent};
use arplay_math::{Transform, Vec2, Vec3};
use arplay_session::{availability_message, ArSession, CapabilityReport, SessionFactory, SessionState};

use crate::config::AppConfig;
use crate::game::{FrameClock, GameError};

/// Name of the scene the demo registers
pub const CUBE_SCENE_NAME: &str = "place_cube";
/// Scene node name used for every cube
pub const CUBE_NODE: &str = "Cube";
/// Cubes kept at once
pub const MAX_CUBES: usize = 20;

const CUBE_COLOR: &str = "#4ecdc4";
const CUBE_SIZE: Vec3 = Vec3::new(0.1, 0.1, 0.1);

/// Tap-to-place controller
pub struct PlaceCube {
    config: AppConfig,
    factory: Option<SessionFactory>,
    session: Option<Box<dyn ArSession>>,
    report: Option<CapabilityReport>,

    world: World,
    scenes: SceneManager,
    input: InputManager,
    clock: FrameClock,

    /// Oldest first
    cubes: VecDeque<NodeKey>,
    scene_transforms: Vec<(Entity, Transform)>,
    initialized: bool,
}

impl PlaceCube {
    pub fn new(config: AppConfig, factory: SessionFactory) -> Self {
        let world = World::new()
            .with_fixed_timestep(config.world.fixed_timestep())
            .with_max_delta(config.world.max_delta_seconds);
        let input = InputManager::new(config.input.to_gesture_config());

        Self {
            config,
            factory: Some(factory),
            session: None,
            report: None,
            world,
            scenes: SceneManager::new(),
            input,
            clock: FrameClock::new(),
            cubes: VecDeque::new(),
            scene_transforms: Vec::new(),
            initialized: false,
        }
    }

    /// Create the session and the scene
    pub async fn initialize(&mut self) -> Result<(), GameError> {
        if self.initialized {
            return Ok(());
        }
        let factory = self.factory.take().ok_or(GameError::NotInitialized)?;
        let (session, report) = factory.create_with_report().await;
        log::info!("{}", availability_message(&report));
        if !session.is_supported().await {
            log::warn!("{} reports AR as unsupported", session.platform());
        }
        self.session = Some(session);
        self.report = Some(report);

        let scene = Scene::new(&mut self.world, CUBE_SCENE_NAME);
        self.scenes.register_scene(scene)?;
        self.scenes.load_scene(CUBE_SCENE_NAME)?;

        self.initialized = true;
        log::debug!("Place cube initialized");
        Ok(())
    }

    pub async fn start(&mut self) -> Result<(), GameError> {
        if !self.initialized {
            return Err(GameError::NotInitialized);
        }
        let session = self.session.as_mut().ok_or(GameError::NotInitialized)?;
        session.start().await?;

        self.world.start();
        self.input.enable();
        log::info!("Place cube started, tap to place cubes");
        Ok(())
    }

    pub async fn stop(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.stop().await;
        }
        self.world.stop();
        self.input.clear();
    }

    // --- Input ---

    /// Feed a pointer sample; every tap tries to place a cube
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

    /// Place a cube on the nearest surface under `screen_pos`
    pub fn tap(&mut self, screen_pos: Vec2) -> Option<Entity> {
        if !self.world.is_running() {
            return None;
        }
        let hit = self
            .session
            .as_ref()
            .and_then(|s| s.hit_test(screen_pos.x, screen_pos.y).into_iter().next())?;

        match self.place_cube_at(hit.position) {
            Ok(cube) => Some(cube),
            Err(e) => {
                log::warn!("Failed to place cube: {}", e);
                None
            }
        }
    }

    pub fn on_gesture(&mut self, kind: GestureKind, listener: impl FnMut(&GestureEvent) + 'static) -> ListenerId {
        self.input.on_gesture(kind, listener)
    }

    pub fn off_gesture(&mut self, kind: GestureKind, id: ListenerId) -> bool {
        self.input.off_gesture(kind, id)
    }

    // --- Cubes ---

    /// Add a cube at `position`, dropping the oldest past [`MAX_CUBES`]
    pub fn place_cube_at(&mut self, position: Vec3) -> Result<Entity, GameError> {
        let scene = self.scenes.active_scene_mut().ok_or(GameError::NotInitialized)?;
        let key = scene.create_node(&mut self.world, CUBE_NODE);
        scene.set_local_transform(&mut self.world, key, Transform::from_position(position))?;
        let cube = scene.entity(key).ok_or(SceneError::NodeNotFound)?;

        self.world.add_component(
            cube,
            PrimitiveShapeComponent::new(ShapeType::Cube, PrimitiveShapeComponent::color_from_hex(CUBE_COLOR), CUBE_SIZE),
        );
        self.cubes.push_back(key);
        log::info!("Placed cube at {}", position);

        if self.cubes.len() > MAX_CUBES {
            if let Some(oldest) = self.cubes.pop_front() {
                scene.remove_node(&mut self.world, oldest)?;
                log::debug!("Removed oldest cube");
            }
        }
        Ok(cube)
    }

    /// Cube entities and their world positions, oldest first
    pub fn cube_positions(&self) -> Vec<(Entity, Vec3)> {
        let Some(scene) = self.scenes.active_scene() else {
            return Vec::new();
        };
        self.cubes
            .iter()
            .filter_map(|&key| scene.entity(key))
            .filter_map(|e| self.world.world_position(e).map(|p| (e, p)))
            .collect()
    }

    pub fn cube_count(&self) -> usize {
        self.cubes.len()
    }

    pub fn clear_cubes(&mut self) {
        let Some(scene) = self.scenes.active_scene_mut() else {
            self.cubes.clear();
            return;
        };
        for key in self.cubes.drain(..) {
            if let Err(e) = scene.remove_node(&mut self.world, key) {
                log::warn!("Failed to remove cube: {}", e);
            }
        }
        log::info!("Cleared all cubes");
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
        }
        self.input.update();
        self.world.update(dt);
        self.scene_transforms = self.scenes.update(&self.world);
    }

    // --- Read-only views ---

    pub fn session_state(&self) -> Option<SessionState> {
        self.session.as_ref().map(|s| s.state())
    }

    pub fn capability(&self) -> Option<&CapabilityReport> {
        self.report.as_ref()
    }

    pub fn scene_transforms(&self) -> &[(Entity, Transform)] {
        &self.scene_transforms
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// (width, height) in pixels
    pub fn viewport(&self) -> (f32, f32) {
        (self.config.viewport.width, self.config.viewport.height)
    }
}

//! Input facade: gestures, keyboard state and ray queries
//!
//! Keyboard handling follows winit: feed `KeyCode` / `ElementState` pairs
//! through [`InputManager::process_key`] and call [`InputManager::update`]
//! once per frame to clear the pressed/released edges.

use std::collections::HashSet;

use arplay_math::Vec2;
use arplay_physics::{cast, screen_point_to_ray, Ray, RayCamera, RaycastHit, RaycastTarget};
use winit::event::ElementState;
use winit::keyboard::KeyCode;

use crate::gesture::{
    GestureConfig, GestureEvent, GestureKind, GestureRecognizer, ListenerId, PointerEvent, PointerId,
};

/// Centralised input handling for a host frame loop
pub struct InputManager {
    gestures: GestureRecognizer,
    enabled: bool,

    // Keyboard state
    keys_pressed: HashSet<KeyCode>,
    keys_down: HashSet<KeyCode>,
    keys_up: HashSet<KeyCode>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl InputManager {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            gestures: GestureRecognizer::new(config),
            enabled: true,
            keys_pressed: HashSet::new(),
            keys_down: HashSet::new(),
            keys_up: HashSet::new(),
        }
    }

    /// Feed a pointer sample; ignored while disabled
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<GestureEvent> {
        if !self.enabled {
            return Vec::new();
        }
        self.gestures.handle(event)
    }

    pub fn on_gesture(&mut self, kind: GestureKind, listener: impl FnMut(&GestureEvent) + 'static) -> ListenerId {
        self.gestures.on(kind, listener)
    }

    pub fn off_gesture(&mut self, kind: GestureKind, id: ListenerId) -> bool {
        self.gestures.off(kind, id)
    }

    pub fn active_pointers(&self) -> Vec<(PointerId, Vec2)> {
        self.gestures.active_pointers()
    }

    pub fn gestures(&self) -> &GestureRecognizer {
        &self.gestures
    }

    // --- Keyboard ---

    /// Process a keyboard event
    pub fn process_key(&mut self, key: KeyCode, state: ElementState) {
        if !self.enabled {
            return;
        }
        match state {
            ElementState::Pressed => {
                // Key repeat does not produce a second edge
                if self.keys_pressed.insert(key) {
                    self.keys_down.insert(key);
                }
            }
            ElementState::Released => {
                if self.keys_pressed.remove(&key) {
                    self.keys_up.insert(key);
                }
            }
        }
    }

    /// Key is held
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Key went down this frame
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Key was released this frame
    pub fn is_key_up(&self, key: KeyCode) -> bool {
        self.keys_up.contains(&key)
    }

    /// Clear per-frame key edges (call once per frame)
    pub fn update(&mut self) {
        self.keys_down.clear();
        self.keys_up.clear();
    }

    // --- Ray queries ---

    pub fn screen_point_to_ray(&self, point: Vec2, width: f32, height: f32, camera: &RayCamera) -> Ray {
        screen_point_to_ray(point, width, height, camera)
    }

    pub fn raycast<T: Copy>(&self, ray: &Ray, targets: &[RaycastTarget<T>]) -> Option<RaycastHit<T>> {
        cast(ray, targets)
    }

    // --- State ---

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Stop accepting input; held keys and pointers are dropped
    pub fn disable(&mut self) {
        self.enabled = false;
        self.clear();
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Forget all pointers and key state; listeners are kept
    pub fn clear(&mut self) {
        self.gestures.clear();
        self.keys_pressed.clear();
        self.keys_down.clear();
        self.keys_up.clear();
    }
}

//! Scene registry with a single active scene
//!
//! The SceneManager stores scenes by name and tracks which one is loaded:
//! - Register and unregister scenes built against a [`World`]
//! - Load one scene at a time, unloading the previous
//! - Feed the active scene's world transforms to the host each frame
//!
//! # Example
//! ```ignore
//! let mut world = World::new();
//! let mut manager = SceneManager::new();
//!
//! manager.register_scene(Scene::new(&mut world, "game"))?;
//! manager.load_scene("game")?;
//!
//! // Each frame
//! let transforms = manager.update(&world);
//! ```

use std::collections::HashMap;

use arplay_math::Transform;

use crate::scene::{Scene, SceneError};
use crate::{Entity, World};

/// Owns named scenes and the name of the loaded one
#[derive(Default)]
pub struct SceneManager {
    scenes: HashMap<String, Scene>,
    active: Option<String>,
}

impl SceneManager {
    /// Create a new empty scene manager
    pub fn new() -> Self {
        Self::default()
    }

    // --- Registration ---

    /// Register a scene under its own name
    ///
    /// A second scene with the same name is rejected and the registered one
    /// is kept.
    pub fn register_scene(&mut self, scene: Scene) -> Result<(), SceneError> {
        if self.scenes.contains_key(&scene.name) {
            log::warn!("Scene '{}' is already registered", scene.name);
            return Err(SceneError::DuplicateScene(scene.name));
        }
        self.scenes.insert(scene.name.clone(), scene);
        Ok(())
    }

    /// Remove a scene, unloading it first if it is active
    ///
    /// The scene's entities stay in the world; call [`Scene::destroy`] on the
    /// returned scene to remove them.
    pub fn unregister_scene(&mut self, name: &str) -> Option<Scene> {
        if self.active.as_deref() == Some(name) {
            self.unload_scene();
        }
        self.scenes.remove(name)
    }

    // --- Activation ---

    /// Make `name` the active scene, unloading the previous one
    pub fn load_scene(&mut self, name: &str) -> Result<(), SceneError> {
        if !self.scenes.contains_key(name) {
            log::warn!("Cannot load unknown scene '{}'", name);
            return Err(SceneError::SceneNotFound(name.to_string()));
        }

        self.unload_scene();
        if let Some(scene) = self.scenes.get_mut(name) {
            scene.load();
        }
        self.active = Some(name.to_string());
        log::info!("Active scene: '{}'", name);
        Ok(())
    }

    /// Like [`load_scene`](Self::load_scene), but a no-op if `name` is already active
    pub fn switch_to(&mut self, name: &str) -> Result<(), SceneError> {
        if self.active.as_deref() == Some(name) {
            return Ok(());
        }
        self.load_scene(name)
    }

    /// Unload the active scene, if any
    pub fn unload_scene(&mut self) {
        if let Some(name) = self.active.take() {
            if let Some(scene) = self.scenes.get_mut(&name) {
                scene.unload();
            }
        }
    }

    // --- Access ---

    pub fn active_scene(&self) -> Option<&Scene> {
        self.active.as_ref().and_then(|name| self.scenes.get(name))
    }

    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        match self.active.as_ref() {
            Some(name) => self.scenes.get_mut(name),
            None => None,
        }
    }

    pub fn active_scene_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn get_scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    pub fn get_scene_mut(&mut self, name: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(name)
    }

    /// Registered scene names, sorted
    pub fn scene_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scenes.keys().cloned().collect();
        names.sort();
        names
    }

    // --- Per frame ---

    /// World transforms of the active scene, or nothing if none is loaded
    pub fn update(&self, world: &World) -> Vec<(Entity, Transform)> {
        self.active_scene().map(|scene| scene.update(world)).unwrap_or_default()
    }

    /// Unload and drop every scene
    pub fn clear(&mut self) {
        self.unload_scene();
        self.scenes.clear();
    }
}

//! World container for entities, components and systems
//!
//! The World owns every entity id, one store per component kind and the
//! ordered system list. It also keeps the simulation clock: [`World::time_ms`]
//! only advances while the world is running, so stopping the world freezes
//! every timer that reads it.

use arplay_math::{Quat, Transform, Vec3};

use crate::component::{Component, ComponentKind, ComponentMask, ComponentStore, Components};
use crate::components::TransformComponent;
use crate::system::{System, SystemEntry};
use crate::{Entity, EntityAllocator};

/// Default fixed update rate
pub const DEFAULT_FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Default clamp for a single tick's delta, in seconds
pub const DEFAULT_MAX_DELTA: f32 = 0.1;

/// Error returned by [`World::set_parent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyError {
    /// The new parent is the child itself or one of its descendants
    Cycle,
    /// Child or parent is not alive
    DeadEntity(Entity),
    /// Child or parent has no transform component
    MissingTransform(Entity),
}

impl std::fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HierarchyError::Cycle => write!(f, "Re-parenting would create a cycle"),
            HierarchyError::DeadEntity(e) => write!(f, "{} is not alive", e),
            HierarchyError::MissingTransform(e) => write!(f, "{} has no transform", e),
        }
    }
}

impl std::error::Error for HierarchyError {}

/// Counts reported by [`World::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldStats {
    pub entity_count: usize,
    pub system_count: usize,
    /// Number of component kinds with at least one instance
    pub component_kind_count: usize,
}

/// System registry changes requested while systems are detached
enum PendingOp {
    Add(SystemEntry),
    Remove(String),
    SetEnabled(String, bool),
}

/// The ECS world
pub struct World {
    entities: EntityAllocator,
    /// Component kinds present on each entity, indexed by id
    masks: Vec<ComponentMask>,
    components: Components,
    systems: Vec<SystemEntry>,
    /// Names of systems currently taken out of `systems` to run
    detached: Vec<String>,
    defer_depth: u32,
    pending: Vec<PendingOp>,
    running: bool,
    elapsed_ms: f64,
    accumulator: f32,
    fixed_timestep: f32,
    max_delta: f32,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new empty world, stopped, with a 60 Hz fixed step
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            masks: Vec::new(),
            components: Components::new(),
            systems: Vec::new(),
            detached: Vec::new(),
            defer_depth: 0,
            pending: Vec::new(),
            running: false,
            elapsed_ms: 0.0,
            accumulator: 0.0,
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }

    /// Builder-style fixed timestep, in seconds
    pub fn with_fixed_timestep(mut self, step: f32) -> Self {
        self.set_fixed_timestep(step);
        self
    }

    /// Builder-style delta clamp, in seconds
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        if max_delta > 0.0 {
            self.max_delta = max_delta;
        } else {
            log::warn!("Ignoring non-positive max delta {}", max_delta);
        }
        self
    }

    // --- Entities ---

    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.create();
        if self.masks.len() <= entity.index() {
            self.masks.resize(entity.index() + 1, ComponentMask::empty());
        }
        self.masks[entity.index()] = ComponentMask::empty();
        entity
    }

    /// Remove every component of `entity`, then free its id
    ///
    /// Children that pointed at `entity` become roots. Returns false if the
    /// entity was not alive.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.entities.is_alive(entity) {
            log::debug!("destroy_entity on dead {}", entity);
            return false;
        }

        self.components.remove_all(entity);
        self.masks[entity.index()] = ComponentMask::empty();

        for (_, transform) in self.components.store_mut::<TransformComponent>().iter_mut() {
            if transform.parent == Some(entity) {
                transform.parent = None;
            }
        }

        self.entities.destroy(entity)
    }

    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Live entities in ascending id order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    // --- Components ---

    /// Attach a component, replacing any previous one of the same kind
    ///
    /// Returns the replaced component. Adding to a dead entity is ignored.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Option<T> {
        if !self.entities.is_alive(entity) {
            log::warn!("Ignoring {} component for dead {}", T::KIND.name(), entity);
            return None;
        }
        self.masks[entity.index()] |= T::KIND.mask();
        T::store_mut(&mut self.components).insert(entity, component)
    }

    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let removed = T::store_mut(&mut self.components).remove(entity);
        if removed.is_some() {
            self.masks[entity.index()].remove(T::KIND.mask());
        }
        removed
    }

    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        T::store(&self.components).get(entity)
    }

    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        T::store_mut(&mut self.components).get_mut(entity)
    }

    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.has_kind(entity, T::KIND)
    }

    pub fn has_kind(&self, entity: Entity, kind: ComponentKind) -> bool {
        self.mask_of(entity).contains(kind.mask())
    }

    /// Component kinds attached to `entity` (empty for dead entities)
    pub fn mask_of(&self, entity: Entity) -> ComponentMask {
        if !self.entities.is_alive(entity) {
            return ComponentMask::empty();
        }
        self.masks.get(entity.index()).copied().unwrap_or_default()
    }

    /// Live entities carrying every kind in `mask`, in ascending id order
    pub fn entities_with(&self, mask: ComponentMask) -> Vec<Entity> {
        self.entities
            .iter()
            .filter(|e| self.masks[e.index()].contains(mask))
            .collect()
    }

    pub fn count_with(&self, mask: ComponentMask) -> usize {
        self.entities
            .iter()
            .filter(|e| self.masks[e.index()].contains(mask))
            .count()
    }

    /// Typed store for direct iteration
    pub fn store<T: Component>(&self) -> &ComponentStore<T> {
        T::store(&self.components)
    }

    pub fn store_mut<T: Component>(&mut self) -> &mut ComponentStore<T> {
        T::store_mut(&mut self.components)
    }

    /// First entity carrying a `T`, in ascending id order
    pub fn first_with<T: Component>(&self) -> Option<Entity> {
        self.entities_with(T::KIND.mask()).into_iter().next()
    }

    // --- Systems ---

    /// Register a system and call its `on_init`
    ///
    /// A second system with an existing name is rejected with a warning and
    /// the registered one is kept. While systems are running the system is
    /// queued and initialized when the tick ends.
    pub fn add_system<S: System>(&mut self, system: S) -> bool {
        if self.has_system(system.name()) {
            log::warn!("System '{}' is already registered, ignoring", system.name());
            return false;
        }

        let entry = SystemEntry::new(Box::new(system));
        if self.defer_depth > 0 {
            self.pending.push(PendingOp::Add(entry));
        } else {
            self.install(entry);
        }
        true
    }

    /// Unregister a system, calling its `on_destroy`
    pub fn remove_system(&mut self, name: &str) -> bool {
        if !self.has_system(name) {
            log::warn!("remove_system: no system named '{}'", name);
            return false;
        }
        if self.defer_depth > 0 {
            self.pending.push(PendingOp::Remove(name.to_string()));
            return true;
        }
        self.remove_now(name)
    }

    pub fn set_system_enabled(&mut self, name: &str, enabled: bool) -> bool {
        if self.defer_depth > 0 {
            if !self.has_system(name) {
                return false;
            }
            self.pending.push(PendingOp::SetEnabled(name.to_string(), enabled));
            return true;
        }
        match self.systems.iter_mut().find(|e| e.name() == name) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_system_enabled(&self, name: &str) -> bool {
        self.systems.iter().any(|e| e.name() == name && e.enabled)
    }

    /// True if the system is registered or its registration is pending
    pub fn has_system(&self, name: &str) -> bool {
        self.systems.iter().any(|e| e.name() == name)
            || self.detached.iter().any(|n| n == name)
            || self
                .pending
                .iter()
                .any(|op| matches!(op, PendingOp::Add(e) if e.name() == name))
    }

    /// Registered system names in run order
    pub fn system_names(&self) -> Vec<String> {
        self.systems.iter().map(|e| e.name().to_string()).collect()
    }

    /// Run `f` with mutable access to a registered system and the world
    ///
    /// Returns `None` if no system of type `S` is registered under `name`,
    /// or if systems are currently running.
    pub fn with_system<S: System, R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut S, &mut World) -> R,
    ) -> Option<R> {
        let index = self.systems.iter().position(|e| e.name() == name)?;
        let mut entry = self.systems.remove(index);

        self.begin_deferred(vec![name.to_string()]);
        let result = entry
            .system
            .as_any_mut()
            .downcast_mut::<S>()
            .map(|system| f(system, self));
        self.systems.insert(index, entry);
        self.end_deferred();

        result
    }

    /// Run `on_init` and insert; registry changes made by `on_init` apply afterwards
    fn install(&mut self, mut entry: SystemEntry) {
        self.begin_deferred(vec![entry.name().to_string()]);
        entry.system.on_init(self);
        log::debug!("Added system '{}'", entry.name());
        self.insert_sorted(entry);
        self.end_deferred();
    }

    fn insert_sorted(&mut self, entry: SystemEntry) {
        let priority = entry.priority();
        let at = self.systems.partition_point(|e| e.priority() <= priority);
        self.systems.insert(at, entry);
    }

    fn remove_now(&mut self, name: &str) -> bool {
        let Some(index) = self.systems.iter().position(|e| e.name() == name) else {
            return false;
        };
        let mut entry = self.systems.remove(index);
        entry.system.on_destroy(self);
        log::debug!("Removed system '{}'", name);
        true
    }

    fn begin_deferred(&mut self, names: Vec<String>) {
        self.defer_depth += 1;
        self.detached.extend(names);
    }

    fn end_deferred(&mut self) {
        self.defer_depth -= 1;
        if self.defer_depth > 0 {
            return;
        }
        self.detached.clear();

        for op in std::mem::take(&mut self.pending) {
            match op {
                PendingOp::Add(entry) => {
                    if self.systems.iter().any(|e| e.name() == entry.name()) {
                        log::warn!("System '{}' is already registered, ignoring", entry.name());
                    } else {
                        self.install(entry);
                    }
                }
                PendingOp::Remove(name) => {
                    self.remove_now(&name);
                }
                PendingOp::SetEnabled(name, enabled) => {
                    self.set_system_enabled(&name, enabled);
                }
            }
        }
    }

    // --- Ticking ---

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Simulation clock in milliseconds
    #[inline]
    pub fn time_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Set the fixed update period in seconds; non-positive values are ignored
    pub fn set_fixed_timestep(&mut self, step: f32) {
        if step > 0.0 && step.is_finite() {
            self.fixed_timestep = step;
        } else {
            log::warn!("Ignoring invalid fixed timestep {}", step);
        }
    }

    #[inline]
    pub fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep
    }

    /// Advance one tick
    ///
    /// Does nothing while stopped. `dt` (seconds) is clamped to
    /// `[0, max_delta]`. Enabled systems run `update` in priority order, then
    /// `fixed_update` once per whole fixed step in the accumulator.
    pub fn update(&mut self, dt: f32) {
        if !self.running {
            return;
        }

        let dt = if dt.is_finite() { dt.clamp(0.0, self.max_delta) } else { 0.0 };
        self.elapsed_ms += f64::from(dt) * 1000.0;

        let mut systems = std::mem::take(&mut self.systems);
        self.begin_deferred(systems.iter().map(|e| e.name().to_string()).collect());

        for entry in systems.iter_mut().filter(|e| e.enabled) {
            entry.system.update(self, dt);
        }

        self.accumulator += dt;
        let step = self.fixed_timestep;
        while self.accumulator >= step {
            for entry in systems.iter_mut().filter(|e| e.enabled) {
                entry.system.fixed_update(self, step);
            }
            self.accumulator -= step;
        }

        self.systems = systems;
        self.end_deferred();
    }

    // --- Hierarchy ---

    /// Link `child` under `parent` (or detach it with `None`)
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) -> Result<(), HierarchyError> {
        self.require_transform(child)?;

        if let Some(parent) = parent {
            self.require_transform(parent)?;

            // An acyclic chain visits each live entity at most once
            let mut cursor = Some(parent);
            let mut steps = 0;
            while let Some(current) = cursor {
                if current == child || steps > self.entity_count() {
                    return Err(HierarchyError::Cycle);
                }
                cursor = self.get_component::<TransformComponent>(current).and_then(|t| t.parent);
                steps += 1;
            }
        }

        if let Some(transform) = self.get_component_mut::<TransformComponent>(child) {
            transform.parent = parent;
        }
        Ok(())
    }

    pub fn parent_of(&self, entity: Entity) -> Option<Entity> {
        self.get_component::<TransformComponent>(entity).and_then(|t| t.parent)
    }

    fn require_transform(&self, entity: Entity) -> Result<(), HierarchyError> {
        if !self.is_alive(entity) {
            return Err(HierarchyError::DeadEntity(entity));
        }
        if !self.has_component::<TransformComponent>(entity) {
            return Err(HierarchyError::MissingTransform(entity));
        }
        Ok(())
    }

    /// World-space transform, composed up the parent chain
    ///
    /// Computed on every call, however deep the chain. A missing parent
    /// transform ends the chain.
    pub fn world_transform(&self, entity: Entity) -> Option<Transform> {
        let component = self.get_component::<TransformComponent>(entity)?;
        let mut result = component.local;
        let mut parent = component.parent;
        let mut depth = 0;

        while let Some(p) = parent {
            // Only reachable when a parent link was written around set_parent
            if depth >= self.entity_count() {
                log::warn!("Parent chain above {} loops, stopping", entity);
                break;
            }
            let Some(parent_transform) = self.get_component::<TransformComponent>(p) else {
                break;
            };
            result = parent_transform.local.compose(&result);
            parent = parent_transform.parent;
            depth += 1;
        }

        Some(result)
    }

    pub fn world_position(&self, entity: Entity) -> Option<Vec3> {
        self.world_transform(entity).map(|t| t.position)
    }

    pub fn world_rotation(&self, entity: Entity) -> Option<Quat> {
        self.world_transform(entity).map(|t| t.rotation)
    }

    // --- Housekeeping ---

    /// Remove every system, entity and component
    ///
    /// The simulation clock and running flag are kept.
    pub fn clear(&mut self) {
        if self.defer_depth > 0 {
            log::warn!("World::clear while systems are running; systems are kept");
        } else {
            for mut entry in std::mem::take(&mut self.systems) {
                entry.system.on_destroy(self);
            }
        }
        self.pending.clear();
        self.components.clear();
        self.entities.clear();
        self.masks.clear();
        self.accumulator = 0.0;
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            entity_count: self.entities.len(),
            system_count: self.systems.len() + self.detached.len(),
            component_kind_count: ComponentKind::ALL
                .iter()
                .filter(|k| self.components.len_of(**k) > 0)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ScoreComponent, TargetComponent, VelocityComponent};
    use crate::Priority;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    const EPSILON: f32 = 0.0001;

    /// Records update calls into a shared log
    struct Recorder {
        name: String,
        priority: Priority,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Recorder {
        fn new(name: &str, priority: Priority, log: &Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                name: name.to_string(),
                priority,
                log: Rc::clone(log),
            }
        }
    }

    impl System for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn priority(&self) -> Priority {
            self.priority
        }

        fn update(&mut self, _world: &mut World, _dt: f32) {
            self.log.borrow_mut().push(format!("update:{}", self.name));
        }

        fn fixed_update(&mut self, _world: &mut World, _dt: f32) {
            self.log.borrow_mut().push(format!("fixed:{}", self.name));
        }

        fn on_destroy(&mut self, _world: &mut World) {
            self.log.borrow_mut().push(format!("destroy:{}", self.name));
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    /// Spawns a scored entity every tick and registers a helper once
    struct Spawner {
        ticks: u32,
    }

    impl System for Spawner {
        fn name(&self) -> &str {
            "spawner"
        }

        fn update(&mut self, world: &mut World, _dt: f32) {
            self.ticks += 1;
            let e = world.create_entity();
            world.add_component(e, ScoreComponent::default());
            if self.ticks == 1 {
                let log = Rc::new(RefCell::new(Vec::new()));
                assert!(world.add_system(Recorder::new("late", Priority::LATE, &log)));
                assert!(!world.add_system(Recorder::new("late", Priority::LATE, &log)));
            }
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn started_world() -> World {
        let mut world = World::new();
        world.start();
        world
    }

    #[test]
    fn test_world_new() {
        let world = World::new();
        assert_eq!(world.entity_count(), 0);
        assert!(!world.is_running());
        assert_eq!(world.stats(), WorldStats::default());
    }

    #[test]
    fn test_add_get_remove_component() {
        let mut world = World::new();
        let e = world.create_entity();

        assert!(world.add_component(e, ScoreComponent::default()).is_none());
        assert!(world.has_component::<ScoreComponent>(e));
        assert!(world.has_kind(e, ComponentKind::Score));

        world.get_component_mut::<ScoreComponent>(e).map(|s| s.add_points(10));
        assert_eq!(world.get_component::<ScoreComponent>(e).map(|s| s.hits), Some(1));

        let previous = world.add_component(e, ScoreComponent::default());
        assert_eq!(previous.map(|s| s.hits), Some(1), "second add overwrites");

        assert!(world.remove_component::<ScoreComponent>(e).is_some());
        assert!(!world.has_component::<ScoreComponent>(e));
        assert!(world.remove_component::<ScoreComponent>(e).is_none());
    }

    #[test]
    fn test_add_component_to_dead_entity_is_ignored() {
        let mut world = World::new();
        let e = world.create_entity();
        world.destroy_entity(e);
        assert!(world.add_component(e, ScoreComponent::default()).is_none());
        assert!(!world.has_component::<ScoreComponent>(e));
        assert_eq!(world.store::<ScoreComponent>().len(), 0);
    }

    #[test]
    fn test_destroy_removes_components() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, TargetComponent::default());
        world.add_component(e, TransformComponent::default());

        assert!(world.destroy_entity(e));
        assert!(!world.destroy_entity(e));
        for kind in ComponentKind::ALL {
            assert!(!world.has_kind(e, kind));
        }
        assert!(world.entities_with(ComponentMask::TARGET).is_empty());

        // Recycled id starts clean
        let reused = world.create_entity();
        assert_eq!(reused, e);
        assert!(!world.has_component::<TargetComponent>(reused));
    }

    #[test]
    fn test_entities_with_mask() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        let c = world.create_entity();
        world.add_component(a, TargetComponent::default());
        world.add_component(a, TransformComponent::default());
        world.add_component(b, TargetComponent::default());
        world.add_component(c, TransformComponent::default());
        world.add_component(c, TargetComponent::default());

        let both = ComponentMask::TARGET | ComponentMask::TRANSFORM;
        assert_eq!(world.entities_with(both), vec![a, c]);
        assert_eq!(world.count_with(ComponentMask::TARGET), 3);
        assert_eq!(world.first_with::<TargetComponent>(), Some(a));
    }

    #[test]
    fn test_systems_run_in_priority_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = started_world().with_fixed_timestep(1.0);
        world.add_system(Recorder::new("late", Priority::LATE, &log));
        world.add_system(Recorder::new("normal_a", Priority::NORMAL, &log));
        world.add_system(Recorder::new("early", Priority::EARLY, &log));
        world.add_system(Recorder::new("normal_b", Priority::NORMAL, &log));

        assert_eq!(world.system_names(), vec!["early", "normal_a", "normal_b", "late"]);

        world.update(0.05);
        assert_eq!(
            *log.borrow(),
            vec!["update:early", "update:normal_a", "update:normal_b", "update:late"]
        );
    }

    #[test]
    fn test_duplicate_system_rejected() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        assert!(world.add_system(Recorder::new("a", Priority::EARLY, &log)));
        assert!(!world.add_system(Recorder::new("a", Priority::LATE, &log)));
        assert_eq!(world.stats().system_count, 1);
    }

    #[test]
    fn test_fixed_update_steps() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = started_world().with_fixed_timestep(0.02);
        world.add_system(Recorder::new("s", Priority::NORMAL, &log));

        world.update(0.05);
        let fixed = log.borrow().iter().filter(|l| l.starts_with("fixed")).count();
        assert_eq!(fixed, 2);

        // 0.01 left over + 0.015 = one more step
        world.update(0.015);
        let fixed = log.borrow().iter().filter(|l| l.starts_with("fixed")).count();
        assert_eq!(fixed, 3);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut world = started_world();
        world.update(5.0);
        assert!((world.time_ms() - 100.0).abs() < 0.01);
        world.update(-1.0);
        assert!((world.time_ms() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_stopped_world_does_not_tick() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        world.add_system(Recorder::new("s", Priority::NORMAL, &log));
        world.update(0.016);
        assert!(log.borrow().is_empty());
        assert_eq!(world.time_ms(), 0.0);
    }

    #[test]
    fn test_system_added_during_tick_runs_next_tick() {
        let mut world = started_world();
        world.add_system(Spawner { ticks: 0 });

        world.update(0.016);
        assert!(world.has_system("late"));
        assert_eq!(world.system_names(), vec!["spawner", "late"]);
        assert_eq!(world.count_with(ComponentMask::SCORE), 1);

        world.update(0.016);
        assert_eq!(world.count_with(ComponentMask::SCORE), 2);
    }

    /// Counts lifecycle calls and tries to register a twin of itself on init
    struct Greedy {
        calls: Rc<RefCell<(u32, u32)>>,
    }

    impl System for Greedy {
        fn name(&self) -> &str {
            "greedy"
        }

        fn on_init(&mut self, world: &mut World) {
            self.calls.borrow_mut().0 += 1;
            let twin = Greedy { calls: Rc::clone(&self.calls) };
            assert!(!world.add_system(twin));
        }

        fn on_destroy(&mut self, _world: &mut World) {
            self.calls.borrow_mut().1 += 1;
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    /// Registers `greedy` twice from inside a tick
    struct Installer {
        calls: Rc<RefCell<(u32, u32)>>,
    }

    impl System for Installer {
        fn name(&self) -> &str {
            "installer"
        }

        fn update(&mut self, world: &mut World, _dt: f32) {
            for _ in 0..2 {
                world.add_system(Greedy { calls: Rc::clone(&self.calls) });
            }
            assert_eq!(self.calls.borrow().0, 0);
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_on_init_runs_once_for_inserted_system() {
        let calls = Rc::new(RefCell::new((0, 0)));
        let mut world = World::new();
        assert!(world.add_system(Greedy { calls: Rc::clone(&calls) }));
        assert_eq!(*calls.borrow(), (1, 0));
        assert_eq!(world.system_names(), vec!["greedy"]);

        world.clear();
        assert_eq!(*calls.borrow(), (1, 1));
    }

    #[test]
    fn test_queued_system_initialized_after_tick() {
        let calls = Rc::new(RefCell::new((0, 0)));
        let mut world = started_world();
        world.add_system(Installer { calls: Rc::clone(&calls) });

        world.update(0.016);
        assert_eq!(*calls.borrow(), (1, 0));
        assert_eq!(world.system_names(), vec!["installer", "greedy"]);

        world.remove_system("installer");
        world.update(0.016);
        assert_eq!(*calls.borrow(), (1, 0));
    }

    #[test]
    fn test_remove_and_disable_system() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = started_world();
        world.add_system(Recorder::new("a", Priority::NORMAL, &log));
        world.add_system(Recorder::new("b", Priority::NORMAL, &log));

        assert!(world.set_system_enabled("a", false));
        assert!(!world.is_system_enabled("a"));
        world.update(0.001);
        assert_eq!(*log.borrow(), vec!["update:b"]);

        assert!(world.remove_system("b"));
        assert!(!world.remove_system("b"));
        assert_eq!(log.borrow().last().map(String::as_str), Some("destroy:b"));
    }

    #[test]
    fn test_with_system_downcasts() {
        let mut world = World::new();
        world.add_system(Spawner { ticks: 7 });

        let ticks = world.with_system::<Spawner, _>("spawner", |s, w| {
            w.create_entity();
            s.ticks
        });
        assert_eq!(ticks, Some(7));
        assert_eq!(world.entity_count(), 1);

        // Wrong type or name
        assert!(world.with_system::<Recorder, _>("spawner", |_, _| ()).is_none());
        assert!(world.with_system::<Spawner, _>("missing", |_, _| ()).is_none());
        assert_eq!(world.system_names(), vec!["spawner"]);
    }

    #[test]
    fn test_world_transform_chain() {
        let mut world = World::new();
        let root = world.create_entity();
        let mid = world.create_entity();
        let leaf = world.create_entity();
        world.add_component(root, TransformComponent::from_position(Vec3::new(0.0, 0.0, -2.0)));
        world.add_component(mid, TransformComponent::from_position(Vec3::new(1.0, 0.0, 0.0)));
        world.add_component(leaf, TransformComponent::from_position(Vec3::new(0.0, 1.0, 0.0)));

        world.set_parent(mid, Some(root)).expect("mid under root");
        world.set_parent(leaf, Some(mid)).expect("leaf under mid");

        let pos = world.world_position(leaf).unwrap_or(Vec3::ZERO);
        assert!(pos.approx_eq(Vec3::new(1.0, 1.0, -2.0), EPSILON));
        assert_eq!(world.parent_of(leaf), Some(mid));
    }

    #[test]
    fn test_set_parent_rejects_cycles() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.add_component(a, TransformComponent::default());
        world.add_component(b, TransformComponent::default());

        world.set_parent(b, Some(a)).expect("b under a");
        assert_eq!(world.set_parent(a, Some(b)), Err(HierarchyError::Cycle));
        assert_eq!(world.set_parent(a, Some(a)), Err(HierarchyError::Cycle));

        let bare = world.create_entity();
        assert_eq!(world.set_parent(bare, Some(a)), Err(HierarchyError::MissingTransform(bare)));
    }

    #[test]
    fn test_deep_chain_world_transform() {
        let mut world = World::new();
        let mut parent = world.create_entity();
        world.add_component(parent, TransformComponent::from_position(Vec3::X));
        let root = parent;
        for _ in 1..100 {
            let e = world.create_entity();
            world.add_component(e, TransformComponent::from_position(Vec3::X));
            world.set_parent(e, Some(parent)).expect("acyclic link");
            parent = e;
        }
        let leaf = parent;

        let pos = world.world_position(leaf).unwrap_or(Vec3::ZERO);
        assert!((pos.x - 100.0).abs() < EPSILON);

        // Deep but acyclic is fine, closing the loop is not
        let extra = world.create_entity();
        world.add_component(extra, TransformComponent::default());
        assert_eq!(world.set_parent(extra, Some(leaf)), Ok(()));
        assert_eq!(world.set_parent(root, Some(extra)), Err(HierarchyError::Cycle));
    }

    #[test]
    fn test_world_transform_survives_hand_written_loop() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.add_component(a, TransformComponent::from_position(Vec3::X));
        world.add_component(b, TransformComponent::from_position(Vec3::X));
        world.get_component_mut::<TransformComponent>(a).unwrap().parent = Some(b);
        world.get_component_mut::<TransformComponent>(b).unwrap().parent = Some(a);

        assert!(world.world_transform(a).is_some());
        let c = world.create_entity();
        world.add_component(c, TransformComponent::default());
        assert_eq!(world.set_parent(c, Some(a)), Err(HierarchyError::Cycle));
    }

    #[test]
    fn test_destroying_parent_detaches_children() {
        let mut world = World::new();
        let parent = world.create_entity();
        let child = world.create_entity();
        world.add_component(parent, TransformComponent::from_position(Vec3::X));
        world.add_component(child, TransformComponent::from_position(Vec3::Y));
        world.set_parent(child, Some(parent)).expect("link");

        world.destroy_entity(parent);
        assert_eq!(world.parent_of(child), None);
        assert_eq!(world.world_position(child), Some(Vec3::Y));
    }

    #[test]
    fn test_clear() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        world.add_system(Recorder::new("a", Priority::NORMAL, &log));
        let e = world.create_entity();
        world.add_component(e, VelocityComponent::default());

        world.clear();
        assert_eq!(world.stats(), WorldStats::default());
        assert_eq!(*log.borrow(), vec!["destroy:a"]);
    }

    #[test]
    fn test_stats() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, VelocityComponent::default());
        world.add_component(e, TransformComponent::default());
        world.create_entity();

        let stats = world.stats();
        assert_eq!(stats.entity_count, 2);
        assert_eq!(stats.component_kind_count, 2);
    }
}

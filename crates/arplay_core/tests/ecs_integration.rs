//! Integration tests for the ECS and scene graph
//!
//! These tests drive the public API with long operation sequences:
//! 1. Component stores agree with a plain map replaying the same operations
//! 2. Destroyed entities never keep components or show up in queries
//! 3. Scene hierarchies stay acyclic and traversals visit each node once

use std::collections::{HashMap, HashSet};

use arplay_core::components::{LifetimeComponent, TargetComponent, TransformComponent, VelocityComponent};
use arplay_core::{ComponentKind, ComponentMask, Entity, Scene, SceneError, Vec3, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const ENTITY_COUNT: usize = 24;
const OPERATIONS: usize = 4000;

/// What the reference model stores for one (entity, kind) pair
type Model = HashMap<(usize, ComponentKind), u32>;

fn kinds() -> [ComponentKind; 3] {
    [ComponentKind::Target, ComponentKind::Velocity, ComponentKind::Lifetime]
}

fn add(world: &mut World, e: Entity, kind: ComponentKind, tag: u32) {
    match kind {
        ComponentKind::Target => {
            world.add_component(e, TargetComponent { points: tag, ..Default::default() });
        }
        ComponentKind::Velocity => {
            world.add_component(e, VelocityComponent::new(Vec3::new(tag as f32, 0.0, 0.0)));
        }
        _ => {
            world.add_component(e, LifetimeComponent::new(f64::from(tag), 0.0));
        }
    }
}

fn remove(world: &mut World, e: Entity, kind: ComponentKind) {
    match kind {
        ComponentKind::Target => {
            world.remove_component::<TargetComponent>(e);
        }
        ComponentKind::Velocity => {
            world.remove_component::<VelocityComponent>(e);
        }
        _ => {
            world.remove_component::<LifetimeComponent>(e);
        }
    }
}

fn read(world: &World, e: Entity, kind: ComponentKind) -> Option<u32> {
    match kind {
        ComponentKind::Target => world.get_component::<TargetComponent>(e).map(|c| c.points),
        ComponentKind::Velocity => world.get_component::<VelocityComponent>(e).map(|c| c.velocity.x as u32),
        _ => world.get_component::<LifetimeComponent>(e).map(|c| c.duration_ms as u32),
    }
}

// ==================== Store Consistency ====================

/// Random add/remove sequences agree with a map-based reference model
#[test]
fn test_component_stores_match_reference_model() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut world = World::new();
    let entities: Vec<Entity> = (0..ENTITY_COUNT).map(|_| world.create_entity()).collect();
    let mut model = Model::new();

    for _ in 0..OPERATIONS {
        let slot = rng.random_range(0..ENTITY_COUNT);
        let kind = kinds()[rng.random_range(0..3)];
        if rng.random_bool(0.6) {
            let tag = rng.random_range(0..1000);
            add(&mut world, entities[slot], kind, tag);
            model.insert((slot, kind), tag);
        } else {
            remove(&mut world, entities[slot], kind);
            model.remove(&(slot, kind));
        }
    }

    for (slot, &e) in entities.iter().enumerate() {
        for kind in kinds() {
            assert_eq!(
                read(&world, e, kind),
                model.get(&(slot, kind)).copied(),
                "mismatch for {} {:?}",
                e,
                kind
            );
            assert_eq!(world.has_kind(e, kind), model.contains_key(&(slot, kind)));
        }
    }

    for kind in kinds() {
        let expected = model.keys().filter(|(_, k)| *k == kind).count();
        assert_eq!(world.count_with(kind.mask()), expected);
    }
}

// ==================== Destroy Invariant ====================

/// No destroyed entity keeps a component or appears in a query
#[test]
fn test_destroyed_entities_leave_no_trace() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut world = World::new();
    let mut alive: Vec<Entity> = Vec::new();
    let mut destroyed: HashSet<Entity> = HashSet::new();

    for _ in 0..OPERATIONS {
        if alive.is_empty() || rng.random_bool(0.55) {
            let e = world.create_entity();
            destroyed.remove(&e);
            for kind in kinds() {
                if rng.random_bool(0.5) {
                    add(&mut world, e, kind, 1);
                }
            }
            alive.push(e);
        } else {
            let e = alive.swap_remove(rng.random_range(0..alive.len()));
            assert!(world.destroy_entity(e));
            destroyed.insert(e);
        }
    }

    for &e in &destroyed {
        assert!(!world.is_alive(e));
        for kind in ComponentKind::ALL {
            assert!(!world.has_kind(e, kind), "{} kept {}", e, kind.name());
        }
        assert!(read(&world, e, ComponentKind::Target).is_none());
    }

    let everything = world.entities_with(ComponentMask::empty());
    assert_eq!(everything.len(), alive.len());
    for kind in kinds() {
        for e in world.entities_with(kind.mask()) {
            assert!(!destroyed.contains(&e));
        }
    }
    assert_eq!(world.entity_count(), alive.len());
}

// ==================== Scene Acyclicity ====================

/// Random legal re-parenting keeps the tree acyclic and traversals finite
#[test]
fn test_scene_reparenting_stays_acyclic() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut world = World::new();
    let mut scene = Scene::new(&mut world, "stress");
    let mut nodes = vec![scene.root()];

    for i in 0..64 {
        let parent = nodes[rng.random_range(0..nodes.len())];
        let node = scene
            .create_child(&mut world, &format!("n{}", i), parent)
            .expect("parent exists");
        nodes.push(node);
    }

    for _ in 0..500 {
        let node = nodes[rng.random_range(1..nodes.len())];
        let target = nodes[rng.random_range(0..nodes.len())];
        let would_cycle = target == node || scene.is_ancestor(node, target);
        let result = scene.set_parent(&mut world, node, Some(target));

        if would_cycle {
            assert_eq!(result, Err(SceneError::Cycle));
        } else {
            assert_eq!(result, Ok(()));
        }
    }

    let all = scene.all_nodes();
    let unique: HashSet<_> = all.iter().copied().collect();
    assert_eq!(all.len(), unique.len(), "a node was visited twice");
    assert_eq!(all.len(), nodes.len(), "every node is reachable from the root");

    // The transform hierarchy mirrors the scene tree
    for &node in &nodes[1..] {
        let entity = scene.entity(node).expect("node exists");
        let parent = scene.node(node).and_then(|n| n.parent()).and_then(|p| scene.entity(p));
        assert_eq!(world.parent_of(entity), parent);
        assert!(world.has_component::<TransformComponent>(entity));
    }
}

/// Removing a subtree destroys exactly that subtree's entities
#[test]
fn test_scene_remove_subtree_counts() {
    let mut world = World::new();
    let mut scene = Scene::new(&mut world, "game");
    let branch = scene.create_node(&mut world, "branch");
    for i in 0..5 {
        let child = scene.create_child(&mut world, &format!("c{}", i), branch).expect("branch exists");
        scene.create_child(&mut world, "leaf", child).expect("child exists");
    }
    let sibling = scene.create_node(&mut world, "sibling");

    assert_eq!(scene.descendants(branch).len(), 10);
    scene.remove_node(&mut world, branch).expect("branch removable");

    assert_eq!(scene.node_count(), 2);
    assert_eq!(world.entity_count(), 2);
    assert_eq!(scene.find_node_by_name("leaf"), None);
    assert_eq!(scene.find_node_by_name("sibling"), Some(sibling));
}

//! Scene graph over world entities
//!
//! A [`Scene`] is an arena of [`SceneNode`]s, each wrapping one entity with a
//! [`TransformComponent`]. Child lists are owned by the nodes; the parent link
//! is a plain key, mirrored into the transform component so that
//! [`World::world_transform`] sees the same hierarchy.
//!
//! The scene never owns the world. Every operation that creates or destroys
//! entities takes it by `&mut`.

use std::collections::HashMap;

use arplay_math::Transform;
use slotmap::SlotMap;

use crate::components::TransformComponent;
use crate::world::HierarchyError;
use crate::{Entity, World};

slotmap::new_key_type! {
    /// Key to a node in a scene's arena
    pub struct NodeKey;
}

/// Name given to the node created with every scene
pub const ROOT_NODE_NAME: &str = "Root";

/// Errors from scene and scene-manager operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The node key does not belong to this scene
    NodeNotFound,
    /// The root cannot be removed or re-parented
    RootNode,
    /// Re-parenting would make a node its own ancestor
    Cycle,
    /// No scene registered under this name
    SceneNotFound(String),
    /// A scene with this name is already registered
    DuplicateScene(String),
    /// The world rejected the hierarchy change
    Hierarchy(HierarchyError),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::NodeNotFound => write!(f, "Node not found in scene"),
            SceneError::RootNode => write!(f, "Operation not allowed on the root node"),
            SceneError::Cycle => write!(f, "Re-parenting would create a cycle"),
            SceneError::SceneNotFound(name) => write!(f, "Scene '{}' not found", name),
            SceneError::DuplicateScene(name) => write!(f, "Scene '{}' is already registered", name),
            SceneError::Hierarchy(e) => write!(f, "Hierarchy error: {}", e),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Hierarchy(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HierarchyError> for SceneError {
    fn from(e: HierarchyError) -> Self {
        match e {
            HierarchyError::Cycle => SceneError::Cycle,
            other => SceneError::Hierarchy(other),
        }
    }
}

/// A named entity in the scene tree
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub entity: Entity,
    pub name: String,
    /// Inactive nodes and their subtrees are skipped by [`Scene::update`]
    pub active: bool,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl SceneNode {
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }
}

/// A tree of entities rooted at a node named "Root"
pub struct Scene {
    pub name: String,
    nodes: SlotMap<NodeKey, SceneNode>,
    by_entity: HashMap<Entity, NodeKey>,
    root: NodeKey,
    loaded: bool,
}

impl Scene {
    /// Create a scene and its root node
    pub fn new(world: &mut World, name: impl Into<String>) -> Self {
        let mut nodes = SlotMap::with_key();
        let entity = world.create_entity();
        world.add_component(entity, TransformComponent::default());
        let root = nodes.insert(SceneNode {
            entity,
            name: ROOT_NODE_NAME.to_string(),
            active: true,
            parent: None,
            children: Vec::new(),
        });

        let mut by_entity = HashMap::new();
        by_entity.insert(entity, root);

        Self {
            name: name.into(),
            nodes,
            by_entity,
            root,
            loaded: false,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    pub fn node_by_entity(&self, entity: Entity) -> Option<NodeKey> {
        self.by_entity.get(&entity).copied()
    }

    pub fn entity(&self, key: NodeKey) -> Option<Entity> {
        self.nodes.get(key).map(|n| n.entity)
    }

    /// Total number of nodes, including the root and orphans
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // --- Building ---

    /// Create a node under the root
    pub fn create_node(&mut self, world: &mut World, name: &str) -> NodeKey {
        self.spawn(world, name, self.root)
    }

    /// Create a node under `parent`
    pub fn create_child(&mut self, world: &mut World, name: &str, parent: NodeKey) -> Result<NodeKey, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound);
        }
        Ok(self.spawn(world, name, parent))
    }

    fn spawn(&mut self, world: &mut World, name: &str, parent: NodeKey) -> NodeKey {
        let parent_entity = self.nodes[parent].entity;
        let entity = world.create_entity();
        world.add_component(
            entity,
            TransformComponent {
                local: Transform::identity(),
                parent: Some(parent_entity),
            },
        );

        let name = if name.is_empty() {
            format!("Entity_{}", entity.id())
        } else {
            name.to_string()
        };

        let key = self.nodes.insert(SceneNode {
            entity,
            name,
            active: true,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(key);
        self.by_entity.insert(entity, key);
        key
    }

    /// Replace a node's local transform, keeping its parent link
    pub fn set_local_transform(&self, world: &mut World, key: NodeKey, local: Transform) -> Result<(), SceneError> {
        let entity = self.entity(key).ok_or(SceneError::NodeNotFound)?;
        let transform = world
            .get_component_mut::<TransformComponent>(entity)
            .ok_or(SceneError::NodeNotFound)?;
        transform.local = local;
        Ok(())
    }

    pub fn local_transform(&self, world: &World, key: NodeKey) -> Option<Transform> {
        let entity = self.entity(key)?;
        world.get_component::<TransformComponent>(entity).map(|t| t.local)
    }

    // --- Rearranging ---

    /// Destroy a node and its whole subtree
    ///
    /// Descendants are destroyed children-first, then the node is detached
    /// from its parent and destroyed.
    pub fn remove_node(&mut self, world: &mut World, key: NodeKey) -> Result<(), SceneError> {
        if key == self.root {
            return Err(SceneError::RootNode);
        }
        if !self.nodes.contains_key(key) {
            return Err(SceneError::NodeNotFound);
        }

        let mut doomed = Vec::new();
        self.collect_post_order(key, &mut doomed);
        self.detach(key);

        for k in doomed {
            if let Some(node) = self.nodes.remove(k) {
                self.by_entity.remove(&node.entity);
                world.destroy_entity(node.entity);
            }
        }
        Ok(())
    }

    fn collect_post_order(&self, key: NodeKey, out: &mut Vec<NodeKey>) {
        if let Some(node) = self.nodes.get(key) {
            for &child in &node.children {
                self.collect_post_order(child, out);
            }
            out.push(key);
        }
    }

    /// Remove `key` from its parent's child list and clear its parent link
    fn detach(&mut self, key: NodeKey) {
        let Some(parent) = self.nodes.get_mut(key).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|&c| c != key);
        }
    }

    /// Move `key` under `parent`, or orphan it with `None`
    ///
    /// Orphans stay in the scene for lookups but are not part of the rooted
    /// tree, so [`Scene::update`] and [`Scene::all_nodes`] skip them.
    pub fn set_parent(&mut self, world: &mut World, key: NodeKey, parent: Option<NodeKey>) -> Result<(), SceneError> {
        if key == self.root {
            return Err(SceneError::RootNode);
        }
        let entity = self.entity(key).ok_or(SceneError::NodeNotFound)?;

        let parent_entity = match parent {
            Some(p) => {
                let parent_entity = self.entity(p).ok_or(SceneError::NodeNotFound)?;
                if p == key || self.is_ancestor(key, p) {
                    return Err(SceneError::Cycle);
                }
                Some(parent_entity)
            }
            None => None,
        };

        world.set_parent(entity, parent_entity)?;

        self.detach(key);
        if let Some(p) = parent {
            self.nodes[p].children.push(key);
            self.nodes[key].parent = Some(p);
        }
        Ok(())
    }

    /// True if `ancestor` is on the parent chain of `key`
    pub fn is_ancestor(&self, ancestor: NodeKey, key: NodeKey) -> bool {
        let mut cursor = self.nodes.get(key).and_then(|n| n.parent);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(current).and_then(|n| n.parent);
        }
        false
    }

    pub fn set_active(&mut self, key: NodeKey, active: bool) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound)?;
        node.active = active;
        Ok(())
    }

    // --- Queries ---

    /// Direct child of `parent` with the given name
    pub fn find_child(&self, parent: NodeKey, name: &str) -> Option<NodeKey> {
        self.nodes
            .get(parent)?
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].name == name)
    }

    /// First node named `name` below `key`, depth-first in child order
    ///
    /// Names need not be unique; the first match wins.
    pub fn find_descendant(&self, key: NodeKey, name: &str) -> Option<NodeKey> {
        self.nodes.get(key)?.children.iter().find_map(|&c| {
            if self.nodes[c].name == name {
                Some(c)
            } else {
                self.find_descendant(c, name)
            }
        })
    }

    /// Search the root, its tree, then any orphaned subtrees
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeKey> {
        if self.nodes[self.root].name == name {
            return Some(self.root);
        }
        if let Some(found) = self.find_descendant(self.root, name) {
            return Some(found);
        }
        self.orphans().find_map(|orphan| {
            if self.nodes[orphan].name == name {
                Some(orphan)
            } else {
                self.find_descendant(orphan, name)
            }
        })
    }

    /// Nodes without a parent, other than the root
    pub fn orphans(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.nodes
            .iter()
            .filter(move |(k, n)| *k != self.root && n.parent.is_none())
            .map(|(k, _)| k)
    }

    /// Every node below `key` in pre-order, excluding `key`
    pub fn descendants(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeKey> = match self.nodes.get(key) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current].children.iter().rev().copied());
        }
        out
    }

    /// The root followed by its descendants
    pub fn all_nodes(&self) -> Vec<NodeKey> {
        let mut nodes = vec![self.root];
        nodes.extend(self.descendants(self.root));
        nodes
    }

    pub fn world_transform(&self, world: &World, key: NodeKey) -> Option<Transform> {
        world.world_transform(self.entity(key)?)
    }

    // --- Lifecycle ---

    pub fn load(&mut self) {
        if !self.loaded {
            self.loaded = true;
            log::debug!("Scene '{}' loaded", self.name);
        }
    }

    pub fn unload(&mut self) {
        if self.loaded {
            self.loaded = false;
            log::debug!("Scene '{}' unloaded", self.name);
        }
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Destroy every node except the root
    pub fn clear(&mut self, world: &mut World) {
        let root = self.root;
        for (key, node) in self.nodes.iter() {
            if key != root {
                world.destroy_entity(node.entity);
            }
        }
        self.nodes.retain(|key, _| key == root);
        self.nodes[root].children.clear();

        let root_entity = self.nodes[root].entity;
        self.by_entity.clear();
        self.by_entity.insert(root_entity, root);
    }

    /// Destroy every node, the root included
    pub fn destroy(mut self, world: &mut World) {
        self.clear(world);
        world.destroy_entity(self.nodes[self.root].entity);
    }

    /// World transforms of every active node in the rooted tree
    ///
    /// Pre-order; an inactive node hides its whole subtree. Empty while the
    /// scene is unloaded.
    pub fn update(&self, world: &World) -> Vec<(Entity, Transform)> {
        let mut out = Vec::new();
        if !self.loaded {
            return out;
        }

        let mut stack = vec![(self.root, Transform::identity())];
        while let Some((key, parent_world)) = stack.pop() {
            let node = &self.nodes[key];
            if !node.active {
                continue;
            }
            let local = world
                .get_component::<TransformComponent>(node.entity)
                .map(|t| t.local)
                .unwrap_or_default();
            let world_transform = parent_world.compose(&local);
            out.push((node.entity, world_transform));

            for &child in node.children.iter().rev() {
                stack.push((child, world_transform));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arplay_math::Vec3;

    const EPSILON: f32 = 0.0001;

    fn setup() -> (World, Scene) {
        let mut world = World::new();
        let scene = Scene::new(&mut world, "test");
        (world, scene)
    }

    #[test]
    fn test_new_scene_has_root() {
        let (world, scene) = setup();
        let root = scene.node(scene.root()).map(|n| n.name.as_str());
        assert_eq!(root, Some("Root"));
        assert_eq!(scene.node_count(), 1);
        assert_eq!(world.entity_count(), 1);
        assert!(!scene.is_loaded());
    }

    #[test]
    fn test_create_node_links_parent() {
        let (mut world, mut scene) = setup();
        let a = scene.create_node(&mut world, "a");
        let b = scene.create_child(&mut world, "b", a).unwrap();

        assert_eq!(scene.node(a).and_then(|n| n.parent()), Some(scene.root()));
        assert_eq!(scene.node(a).map(|n| n.children().to_vec()), Some(vec![b]));

        let b_entity = scene.entity(b).unwrap();
        assert_eq!(world.parent_of(b_entity), scene.entity(a));
        assert_eq!(scene.node_by_entity(b_entity), Some(b));
    }

    #[test]
    fn test_empty_name_uses_entity_id() {
        let (mut world, mut scene) = setup();
        let key = scene.create_node(&mut world, "");
        let node = scene.node(key).unwrap();
        assert_eq!(node.name, format!("Entity_{}", node.entity.id()));
    }

    #[test]
    fn test_remove_node_destroys_subtree() {
        let (mut world, mut scene) = setup();
        let a = scene.create_node(&mut world, "a");
        let b = scene.create_child(&mut world, "b", a).unwrap();
        let c = scene.create_child(&mut world, "c", b).unwrap();
        let keep = scene.create_node(&mut world, "keep");
        let c_entity = scene.entity(c).unwrap();

        scene.remove_node(&mut world, a).unwrap();
        assert!(scene.node(b).is_none());
        assert!(!world.is_alive(c_entity));
        assert_eq!(scene.node(scene.root()).map(|n| n.children().to_vec()), Some(vec![keep]));
        assert_eq!(world.entity_count(), 2);

        assert_eq!(scene.remove_node(&mut world, a), Err(SceneError::NodeNotFound));
        assert_eq!(scene.remove_node(&mut world, scene.root()), Err(SceneError::RootNode));
    }

    #[test]
    fn test_set_parent_moves_child() {
        let (mut world, mut scene) = setup();
        let a = scene.create_node(&mut world, "a");
        let b = scene.create_node(&mut world, "b");
        let c = scene.create_child(&mut world, "c", a).unwrap();

        scene.set_parent(&mut world, c, Some(b)).unwrap();
        assert!(scene.node(a).unwrap().children().is_empty());
        assert_eq!(scene.node(b).unwrap().children(), &[c]);
        assert_eq!(world.parent_of(scene.entity(c).unwrap()), scene.entity(b));
    }

    #[test]
    fn test_set_parent_rejects_cycle() {
        let (mut world, mut scene) = setup();
        let a = scene.create_node(&mut world, "a");
        let b = scene.create_child(&mut world, "b", a).unwrap();

        assert_eq!(scene.set_parent(&mut world, a, Some(b)), Err(SceneError::Cycle));
        assert_eq!(scene.set_parent(&mut world, a, Some(a)), Err(SceneError::Cycle));
        assert_eq!(scene.set_parent(&mut world, scene.root(), Some(a)), Err(SceneError::RootNode));
        // Unchanged after the rejected moves
        assert_eq!(scene.node(b).unwrap().parent(), Some(a));
    }

    #[test]
    fn test_orphan_is_findable_but_not_rooted() {
        let (mut world, mut scene) = setup();
        let a = scene.create_node(&mut world, "a");
        let b = scene.create_child(&mut world, "b", a).unwrap();

        scene.set_parent(&mut world, a, None).unwrap();
        assert_eq!(scene.orphans().collect::<Vec<_>>(), vec![a]);
        assert_eq!(scene.all_nodes(), vec![scene.root()]);
        assert_eq!(scene.find_node_by_name("b"), Some(b));
        assert_eq!(world.parent_of(scene.entity(a).unwrap()), None);
    }

    #[test]
    fn test_find_descendant_depth_first() {
        let (mut world, mut scene) = setup();
        let a = scene.create_node(&mut world, "a");
        let deep = scene.create_child(&mut world, "target", a).unwrap();
        let shallow = scene.create_node(&mut world, "target");

        assert_eq!(scene.find_descendant(scene.root(), "target"), Some(deep));
        assert_eq!(scene.find_child(scene.root(), "target"), Some(shallow));
        scene.remove_node(&mut world, deep).unwrap();
        assert_eq!(scene.find_descendant(scene.root(), "target"), Some(shallow));
        assert_eq!(scene.find_child(scene.root(), "missing"), None);
    }

    #[test]
    fn test_descendants_pre_order() {
        let (mut world, mut scene) = setup();
        let a = scene.create_node(&mut world, "a");
        let a1 = scene.create_child(&mut world, "a1", a).unwrap();
        let b = scene.create_node(&mut world, "b");

        assert_eq!(scene.descendants(scene.root()), vec![a, a1, b]);
        assert_eq!(scene.all_nodes(), vec![scene.root(), a, a1, b]);
    }

    #[test]
    fn test_update_composes_and_skips_inactive() {
        let (mut world, mut scene) = setup();
        let a = scene.create_node(&mut world, "a");
        let b = scene.create_child(&mut world, "b", a).unwrap();
        let hidden = scene.create_node(&mut world, "hidden");
        scene.set_local_transform(&mut world, a, Transform::from_position(Vec3::new(0.0, 0.0, -2.0))).unwrap();
        scene.set_local_transform(&mut world, b, Transform::from_position(Vec3::new(0.0, 0.5, 0.0))).unwrap();
        scene.set_active(hidden, false).unwrap();

        assert!(scene.update(&world).is_empty(), "unloaded scene emits nothing");

        scene.load();
        let feed = scene.update(&world);
        assert_eq!(feed.len(), 3);
        let b_entity = scene.entity(b).unwrap();
        let (_, b_world) = feed.iter().find(|(e, _)| *e == b_entity).copied().unwrap();
        assert!(b_world.position.approx_eq(Vec3::new(0.0, 0.5, -2.0), EPSILON));

        let lazy = scene.world_transform(&world, b).unwrap();
        assert!(lazy.approx_eq(&b_world, EPSILON));
    }

    #[test]
    fn test_deep_chain_matches_update_feed() {
        let (mut world, mut scene) = setup();
        let mut parent = scene.root();
        for i in 0..70 {
            let node = scene.create_child(&mut world, &format!("n{}", i), parent).unwrap();
            scene.set_local_transform(&mut world, node, Transform::from_position(Vec3::X)).unwrap();
            parent = node;
        }
        let deepest = parent;

        scene.load();
        let entity = scene.entity(deepest).unwrap();
        let (_, fed) = scene.update(&world).into_iter().find(|(e, _)| *e == entity).unwrap();
        let lazy = world.world_position(entity).unwrap();
        assert!((fed.position.x - 70.0).abs() < EPSILON);
        assert!(lazy.approx_eq(fed.position, EPSILON));

        let extra = scene.create_node(&mut world, "extra");
        assert_eq!(scene.set_parent(&mut world, extra, Some(deepest)), Ok(()));
    }

    #[test]
    fn test_clear_keeps_root() {
        let (mut world, mut scene) = setup();
        let a = scene.create_node(&mut world, "a");
        scene.create_child(&mut world, "b", a).unwrap();
        let orphan = scene.create_node(&mut world, "orphan");
        scene.set_parent(&mut world, orphan, None).unwrap();

        scene.clear(&mut world);
        assert_eq!(scene.node_count(), 1);
        assert_eq!(world.entity_count(), 1);
        assert!(scene.node(scene.root()).unwrap().children().is_empty());
    }
}

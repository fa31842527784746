//! Typed component storage
//!
//! Each component kind lives in its own [`ComponentStore`], a sparse set with
//! a dense value array and an entity-to-slot index. The set of kinds is
//! closed: [`Components`] holds exactly one store per [`ComponentKind`].

use std::collections::HashMap;

use bitflags::bitflags;

use crate::components::{
    AnimationComponent, ColliderComponent, GameStateComponent, LifetimeComponent, MeshComponent,
    PrimitiveShapeComponent, ScoreComponent, SpawnPadComponent, TargetComponent, TransformComponent,
    VelocityComponent,
};
use crate::Entity;

bitflags! {
    /// A set of component kinds, used to select entities
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ComponentMask: u16 {
        const TRANSFORM = 1 << 0;
        const COLLIDER = 1 << 1;
        const MESH = 1 << 2;
        const PRIMITIVE_SHAPE = 1 << 3;
        const TARGET = 1 << 4;
        const SCORE = 1 << 5;
        const SPAWN_PAD = 1 << 6;
        const GAME_STATE = 1 << 7;
        const VELOCITY = 1 << 8;
        const LIFETIME = 1 << 9;
        const ANIMATION = 1 << 10;
    }
}

/// Identifies a component store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Transform,
    Collider,
    Mesh,
    PrimitiveShape,
    Target,
    Score,
    SpawnPad,
    GameState,
    Velocity,
    Lifetime,
    Animation,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 11] = [
        ComponentKind::Transform,
        ComponentKind::Collider,
        ComponentKind::Mesh,
        ComponentKind::PrimitiveShape,
        ComponentKind::Target,
        ComponentKind::Score,
        ComponentKind::SpawnPad,
        ComponentKind::GameState,
        ComponentKind::Velocity,
        ComponentKind::Lifetime,
        ComponentKind::Animation,
    ];

    pub fn mask(self) -> ComponentMask {
        match self {
            ComponentKind::Transform => ComponentMask::TRANSFORM,
            ComponentKind::Collider => ComponentMask::COLLIDER,
            ComponentKind::Mesh => ComponentMask::MESH,
            ComponentKind::PrimitiveShape => ComponentMask::PRIMITIVE_SHAPE,
            ComponentKind::Target => ComponentMask::TARGET,
            ComponentKind::Score => ComponentMask::SCORE,
            ComponentKind::SpawnPad => ComponentMask::SPAWN_PAD,
            ComponentKind::GameState => ComponentMask::GAME_STATE,
            ComponentKind::Velocity => ComponentMask::VELOCITY,
            ComponentKind::Lifetime => ComponentMask::LIFETIME,
            ComponentKind::Animation => ComponentMask::ANIMATION,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Transform => "transform",
            ComponentKind::Collider => "collider",
            ComponentKind::Mesh => "mesh",
            ComponentKind::PrimitiveShape => "primitive_shape",
            ComponentKind::Target => "target",
            ComponentKind::Score => "score",
            ComponentKind::SpawnPad => "spawn_pad",
            ComponentKind::GameState => "game_state",
            ComponentKind::Velocity => "velocity",
            ComponentKind::Lifetime => "lifetime",
            ComponentKind::Animation => "animation",
        }
    }
}

impl From<ComponentKind> for ComponentMask {
    fn from(kind: ComponentKind) -> Self {
        kind.mask()
    }
}

/// A record type that can be attached to an entity
pub trait Component: Sized + 'static {
    const KIND: ComponentKind;

    fn store(components: &Components) -> &ComponentStore<Self>;
    fn store_mut(components: &mut Components) -> &mut ComponentStore<Self>;
}

/// Sparse set of one component type
///
/// Lookups, inserts and removals are O(1); iteration walks a dense array.
/// Removal swaps the last element into the hole, so iteration order is not
/// insertion order.
#[derive(Debug)]
pub struct ComponentStore<T> {
    dense: Vec<T>,
    entities: Vec<Entity>,
    index: HashMap<Entity, usize>,
}

impl<T> Default for ComponentStore<T> {
    fn default() -> Self {
        Self {
            dense: Vec::new(),
            entities: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> ComponentStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; returns the replaced value
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        if let Some(&slot) = self.index.get(&entity) {
            return Some(std::mem::replace(&mut self.dense[slot], value));
        }
        self.index.insert(entity, self.dense.len());
        self.dense.push(value);
        self.entities.push(entity);
        None
    }

    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let slot = self.index.remove(&entity)?;
        let value = self.dense.swap_remove(slot);
        self.entities.swap_remove(slot);
        if let Some(&moved) = self.entities.get(slot) {
            self.index.insert(moved, slot);
        }
        Some(value)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.index.get(&entity).map(|&slot| &self.dense[slot])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self.index.get(&entity) {
            Some(&slot) => Some(&mut self.dense[slot]),
            None => None,
        }
    }

    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.index.contains_key(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.dense.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.entities.iter().copied().zip(self.dense.iter_mut())
    }

    /// Entities in dense order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn clear(&mut self) {
        self.dense.clear();
        self.entities.clear();
        self.index.clear();
    }
}

macro_rules! component_stores {
    ($($field:ident: $ty:ty => $kind:ident),* $(,)?) => {
        /// One store per component kind
        #[derive(Debug, Default)]
        pub struct Components {
            $($field: ComponentStore<$ty>,)*
        }

        impl Components {
            pub fn new() -> Self {
                Self::default()
            }

            /// Drop every component attached to `entity`
            pub fn remove_all(&mut self, entity: Entity) {
                $(self.$field.remove(entity);)*
            }

            pub fn clear(&mut self) {
                $(self.$field.clear();)*
            }

            /// Number of entries in the store for `kind`
            pub fn len_of(&self, kind: ComponentKind) -> usize {
                match kind {
                    $(ComponentKind::$kind => self.$field.len(),)*
                }
            }

            pub fn contains(&self, kind: ComponentKind, entity: Entity) -> bool {
                match kind {
                    $(ComponentKind::$kind => self.$field.contains(entity),)*
                }
            }
        }

        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$kind;

                #[inline]
                fn store(components: &Components) -> &ComponentStore<Self> {
                    &components.$field
                }

                #[inline]
                fn store_mut(components: &mut Components) -> &mut ComponentStore<Self> {
                    &mut components.$field
                }
            }
        )*
    };
}

component_stores! {
    transforms: TransformComponent => Transform,
    colliders: ColliderComponent => Collider,
    meshes: MeshComponent => Mesh,
    primitive_shapes: PrimitiveShapeComponent => PrimitiveShape,
    targets: TargetComponent => Target,
    scores: ScoreComponent => Score,
    spawn_pads: SpawnPadComponent => SpawnPad,
    game_states: GameStateComponent => GameState,
    velocities: VelocityComponent => Velocity,
    lifetimes: LifetimeComponent => Lifetime,
    animations: AnimationComponent => Animation,
}

impl Components {
    /// Typed store access
    pub fn store<T: Component>(&self) -> &ComponentStore<T> {
        T::store(self)
    }

    pub fn store_mut<T: Component>(&mut self) -> &mut ComponentStore<T> {
        T::store_mut(self)
    }
}

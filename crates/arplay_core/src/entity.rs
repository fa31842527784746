//! Entity ids and their allocator
//!
//! An [`Entity`] is just an id. Components live in the world's stores and
//! are keyed by it.

use serde::{Serialize, Deserialize};

/// Opaque identifier for a game object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(u32);

impl Entity {
    /// Raw id
    #[inline]
    pub fn id(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Hands out entity ids, recycling destroyed ones
///
/// Freed ids are reused last-in first-out, so the id space stays as small as
/// the peak number of live entities.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    alive: Vec<bool>,
    free: Vec<u32>,
    count: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id, reusing a freed one if available
    pub fn create(&mut self) -> Entity {
        self.count += 1;
        if let Some(id) = self.free.pop() {
            self.alive[id as usize] = true;
            return Entity(id);
        }
        let id = self.alive.len() as u32;
        self.alive.push(true);
        Entity(id)
    }

    /// Free an id; returns false if it was not alive
    pub fn destroy(&mut self, entity: Entity) -> bool {
        match self.alive.get_mut(entity.index()) {
            Some(alive) if *alive => {
                *alive = false;
                self.free.push(entity.0);
                self.count -= 1;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.index()).copied().unwrap_or(false)
    }

    /// Number of live entities
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Highest id ever allocated plus one
    #[inline]
    pub fn capacity(&self) -> usize {
        self.alive.len()
    }

    /// Live entities in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(id, _)| Entity(id as u32))
    }

    pub fn clear(&mut self) {
        self.alive.clear();
        self.free.clear();
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_sequential() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.create();
        let b = alloc.create();
        assert_eq!(a.id(), 0);
        assert_eq!(b.id(), 1);
        assert_eq!(alloc.len(), 2);
    }

    #[test]
    fn test_destroy_recycles_lifo() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.create();
        let b = alloc.create();
        let _c = alloc.create();

        assert!(alloc.destroy(a));
        assert!(alloc.destroy(b));
        assert!(!alloc.is_alive(a));

        // Most recently freed comes back first
        assert_eq!(alloc.create(), b);
        assert_eq!(alloc.create(), a);
        assert_eq!(alloc.capacity(), 3);
    }

    #[test]
    fn test_double_destroy() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.create();
        assert!(alloc.destroy(a));
        assert!(!alloc.destroy(a));
        assert_eq!(alloc.len(), 0);
        // Never allocated
        assert!(!alloc.destroy(Entity(42)));
    }

    #[test]
    fn test_iter_ascending() {
        let mut alloc = EntityAllocator::new();
        let ids: Vec<Entity> = (0..5).map(|_| alloc.create()).collect();
        alloc.destroy(ids[1]);
        alloc.destroy(ids[3]);
        alloc.create(); // reuses 3

        let live: Vec<u32> = alloc.iter().map(Entity::id).collect();
        assert_eq!(live, vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_clear() {
        let mut alloc = EntityAllocator::new();
        alloc.create();
        alloc.clear();
        assert!(alloc.is_empty());
        assert_eq!(alloc.create().id(), 0);
    }
}

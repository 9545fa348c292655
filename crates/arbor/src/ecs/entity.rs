//! # Entity Handles
//!
//! An [`Entity`] carries no data. The [`World`](super::world::World) maps it
//! to whatever components are attached. Handles are generational: a slot index
//! plus the generation the slot had when the handle was issued.
//!
//! ```text
//! spawn    → Entity { index: 4, generation: 0 }
//! despawn  → slot 4 generation becomes 1, index 4 goes on the free list
//! spawn    → Entity { index: 4, generation: 1 }
//! ```
//!
//! The old handle still says generation 0, so every lookup through it fails
//! instead of silently landing on the new occupant of slot 4. The deferred
//! unmount queue relies on this to detect double-destroy races.

use std::fmt;

/// A handle to an entity in the [`World`](super::world::World).
///
/// Only meaningful for the world that issued it, and only until the entity is
/// despawned. Ordering is by slot index, then generation; it exists so that
/// handle sets can be sorted for deterministic traversal and has no semantic
/// meaning.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    /// Raw slot index. Reused after despawn.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out entity handles and recycles despawned slots.
///
/// ```text
/// generations: [1, 0, 3]   ← current generation per slot
/// free:        [0]         ← slots waiting to be reused
/// ```
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    free: Vec<u32>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Issue a handle, reusing a freed slot when one is available.
    pub fn allocate(&mut self) -> Entity {
        match self.free.pop() {
            Some(index) => Entity {
                index,
                generation: self.generations[index as usize],
            },
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                Entity {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Invalidate `entity` and put its slot on the free list.
    ///
    /// Returns `false` (and changes nothing) for a handle that is already stale.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = &mut self.generations[entity.index as usize];
        *slot = slot.wrapping_add(1);
        self.free.push(entity.index);
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.generations
            .get(entity.index as usize)
            .is_some_and(|&generation| generation == entity.generation)
    }

    pub fn alive_count(&self) -> usize {
        self.generations.len() - self.free.len()
    }

    /// Number of slots ever handed out (alive or free).
    pub fn slot_count(&self) -> usize {
        self.generations.len()
    }
}

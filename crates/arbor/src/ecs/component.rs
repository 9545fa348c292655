//! # Component Storage — One Sparse Set per Type
//!
//! Every component type gets its own [`SparseSet`]: a dense array of values,
//! a parallel dense array of owning entities, and a sparse index from entity
//! slot to dense row.
//!
//! ```text
//! sparse: [None, Some(1), None, Some(0)]   ← indexed by Entity::index
//! dense:  [e3,   e1]                       ← owner of each row
//! data:   [c3,   c1]                       ← the components themselves
//! ```
//!
//! Attaching and detaching a component is O(1) and never touches other
//! component types. The scene tree toggles marker components (`Dirty`,
//! `Unmount`) constantly, so cheap add/remove matters more here than
//! archetype-style iteration speed.
//!
//! The world only sees storages through [`ComponentStorage`], which is enough
//! to drop every component of a despawned entity without knowing its types.

use std::any::Any;

use super::entity::Entity;

/// Type-erased view of a component storage.
///
/// Opaque to users; it only shows up in the [`QueryParam`](super::query::QueryParam)
/// plumbing.
pub trait ComponentStorage: Send + Sync {
    /// Drop the component owned by `entity`, if any.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    fn contains(&self, entity: Entity) -> bool;

    fn len(&self) -> usize;

    /// Owners of every stored component, in dense order.
    fn entities(&self) -> &[Entity];

    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Dense/sparse storage for a single component type.
pub(crate) struct SparseSet<T> {
    sparse: Vec<Option<u32>>,
    dense: Vec<Entity>,
    data: Vec<T>,
}

impl<T: 'static + Send + Sync> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            data: Vec::new(),
        }
    }

    fn row(&self, entity: Entity) -> Option<usize> {
        let row = (*self.sparse.get(entity.index as usize)?)? as usize;
        (self.dense[row] == entity).then_some(row)
    }

    /// Store `value` for `entity`, returning the value it replaced.
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        if let Some(row) = self.row(entity) {
            return Some(std::mem::replace(&mut self.data[row], value));
        }
        let slot = entity.index as usize;
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, None);
        }
        self.sparse[slot] = Some(self.dense.len() as u32);
        self.dense.push(entity);
        self.data.push(value);
        None
    }

    /// Remove and return the component of `entity`.
    ///
    /// The last row is swapped into the hole, so dense order is not stable
    /// across removals.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let row = self.row(entity)?;
        self.sparse[entity.index as usize] = None;
        self.dense.swap_remove(row);
        let value = self.data.swap_remove(row);
        if let Some(&moved) = self.dense.get(row) {
            self.sparse[moved.index as usize] = Some(row as u32);
        }
        Some(value)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.row(entity).map(|row| &self.data[row])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.row(entity).map(|row| &mut self.data[row])
    }
}

impl<T: 'static + Send + Sync> ComponentStorage for SparseSet<T> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.row(entity).is_some()
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn entities(&self) -> &[Entity] {
        &self.dense
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Downcast a type-erased storage to its concrete sparse set.
///
/// # Panics
///
/// Panics if the storage holds a different component type, which means the
/// world's `TypeId` bookkeeping is corrupt.
pub(crate) fn downcast<T: 'static + Send + Sync>(storage: &dyn ComponentStorage) -> &SparseSet<T> {
    storage
        .as_any()
        .downcast_ref::<SparseSet<T>>()
        .unwrap_or_else(|| {
            panic!(
                "storage type mismatch: expected `{}`, found `{}`",
                std::any::type_name::<T>(),
                storage.type_name()
            )
        })
}

/// Mutable counterpart of [`downcast`].
pub(crate) fn downcast_mut<T: 'static + Send + Sync>(
    storage: &mut dyn ComponentStorage,
) -> &mut SparseSet<T> {
    let found = storage.type_name();
    storage
        .as_any_mut()
        .downcast_mut::<SparseSet<T>>()
        .unwrap_or_else(|| {
            panic!(
                "storage type mismatch: expected `{}`, found `{}`",
                std::any::type_name::<T>(),
                found
            )
        })
}

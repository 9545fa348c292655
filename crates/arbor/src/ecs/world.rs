//! # World — Entities, Components, Resources
//!
//! ```text
//! World
//! ├── allocator   generational entity handles
//! ├── storages    TypeId → SparseSet<T> (one per component type)
//! └── resources   TypeId → singleton value (Time, SceneConfig, …)
//! ```
//!
//! The world is the explicit context object every system receives. There is
//! no global registry: tests build a fresh `World`, run a pass over it, and
//! inspect the result.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::component::{ComponentStorage, SparseSet, downcast, downcast_mut};
use super::entity::{Entity, EntityAllocator};
use super::query::QueryParam;

/// Owns every entity, component and resource of a running game.
pub struct World {
    allocator: EntityAllocator,
    storages: HashMap<TypeId, Box<dyn ComponentStorage>>,
    resources: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl World {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            storages: HashMap::new(),
            resources: HashMap::new(),
        }
    }

    // ── Resources ────────────────────────────────────────────────────

    /// Insert a singleton, replacing any previous value of the same type.
    pub fn insert_resource<T: 'static + Send + Sync>(&mut self, value: T) {
        self.resources.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// # Panics
    ///
    /// Panics if no resource of type `T` was inserted.
    pub fn resource<T: 'static + Send + Sync>(&self) -> &T {
        self.get_resource::<T>().unwrap_or_else(|| {
            panic!(
                "resource `{}` not found; insert it before running systems that need it",
                std::any::type_name::<T>()
            )
        })
    }

    /// # Panics
    ///
    /// Panics if no resource of type `T` was inserted.
    pub fn resource_mut<T: 'static + Send + Sync>(&mut self) -> &mut T {
        self.get_resource_mut::<T>().unwrap_or_else(|| {
            panic!(
                "resource `{}` not found; insert it before running systems that need it",
                std::any::type_name::<T>()
            )
        })
    }

    pub fn get_resource<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.resources
            .get(&TypeId::of::<T>())
            .and_then(|r| r.downcast_ref::<T>())
    }

    pub fn get_resource_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut T> {
        self.resources
            .get_mut(&TypeId::of::<T>())
            .and_then(|r| r.downcast_mut::<T>())
    }

    pub fn has_resource<T: 'static + Send + Sync>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<T>())
    }

    /// Take a resource out of the world.
    ///
    /// Pair with [`insert_resource`](Self::insert_resource) when a resource has
    /// to be used while the rest of the world is mutably borrowed.
    pub fn resource_remove<T: 'static + Send + Sync>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|r| r.downcast::<T>().ok())
            .map(|b| *b)
    }

    // ── Entity lifetime ──────────────────────────────────────────────

    pub fn spawn_empty(&mut self) -> Entity {
        self.allocator.allocate()
    }

    /// Spawn an entity with a tuple of components.
    ///
    /// ```ignore
    /// let e = world.spawn((LocalTransform::default(), Velocity::default()));
    /// ```
    pub fn spawn<B: Bundle>(&mut self, bundle: B) -> Entity {
        let entity = self.allocator.allocate();
        bundle.insert_into(self, entity);
        entity
    }

    /// Spawn an entity with a single component.
    pub fn spawn_one<T: 'static + Send + Sync>(&mut self, component: T) -> Entity {
        self.spawn((component,))
    }

    /// Drop every component of `entity` and invalidate the handle.
    ///
    /// Returns `false` if the handle was already stale. This is the raw store
    /// operation; scene-tree members should go through
    /// [`unmount`](crate::scene::unmount) so hierarchy links are detached
    /// first.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_alive(entity) {
            return false;
        }
        for storage in self.storages.values_mut() {
            storage.remove_entity(entity);
        }
        self.allocator.deallocate(entity)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Number of entity slots ever allocated (alive + recyclable).
    pub fn slot_count(&self) -> usize {
        self.allocator.slot_count()
    }

    // ── Components ───────────────────────────────────────────────────

    /// Attach a component, replacing an existing one of the same type.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    pub fn insert<T: 'static + Send + Sync>(&mut self, entity: Entity, component: T) {
        assert!(
            self.allocator.is_alive(entity),
            "cannot insert `{}` on dead entity {:?}",
            std::any::type_name::<T>(),
            entity
        );
        let storage = self
            .storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(SparseSet::<T>::new()));
        downcast_mut::<T>(storage.as_mut()).insert(entity, component);
    }

    /// Detach a component. Returns `false` if it was not attached.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    pub fn remove<T: 'static + Send + Sync>(&mut self, entity: Entity) -> bool {
        self.take::<T>(entity).is_some()
    }

    /// Detach a component and hand it back.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    pub fn take<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<T> {
        assert!(
            self.allocator.is_alive(entity),
            "cannot remove `{}` from dead entity {:?}",
            std::any::type_name::<T>(),
            entity
        );
        let storage = self.storages.get_mut(&TypeId::of::<T>())?;
        downcast_mut::<T>(storage.as_mut()).remove(entity)
    }

    /// `None` if the entity is dead or lacks the component.
    pub fn get<T: 'static + Send + Sync>(&self, entity: Entity) -> Option<&T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        let storage = self.storages.get(&TypeId::of::<T>())?;
        downcast::<T>(storage.as_ref()).get(entity)
    }

    /// `None` if the entity is dead or lacks the component.
    pub fn get_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        let storage = self.storages.get_mut(&TypeId::of::<T>())?;
        downcast_mut::<T>(storage.as_mut()).get_mut(entity)
    }

    /// Presence check; `false` for dead entities.
    pub fn has<T: 'static + Send + Sync>(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
            && self
                .storages
                .get(&TypeId::of::<T>())
                .is_some_and(|s| s.contains(entity))
    }

    /// Snapshot of every entity that has a `T`.
    pub fn entities_with<T: 'static + Send + Sync>(&self) -> Vec<Entity> {
        self.storages
            .get(&TypeId::of::<T>())
            .map(|s| s.entities().to_vec())
            .unwrap_or_default()
    }

    /// Number of entities that have a `T`.
    pub fn count<T: 'static + Send + Sync>(&self) -> usize {
        self.storages
            .get(&TypeId::of::<T>())
            .map_or(0, |s| s.len())
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Run `f` for every entity that has all components in `Q`.
    ///
    /// ```ignore
    /// world.query::<(&mut LocalTransform, &Velocity)>(|_, (local, vel)| {
    ///     local.position += vel.velocity;
    /// });
    /// ```
    pub fn query<Q: QueryParam>(&mut self, f: impl FnMut(Entity, Q::Item<'_>)) {
        let required = Q::type_ids();
        self.run_query::<Q>(&required, f);
    }

    /// Like [`query`](Self::query), restricted to entities that also carry the
    /// marker `F`. The marker itself is not yielded.
    pub fn query_filtered<Q: QueryParam, F: 'static + Send + Sync>(
        &mut self,
        f: impl FnMut(Entity, Q::Item<'_>),
    ) {
        let mut required = Q::type_ids();
        required.push(TypeId::of::<F>());
        self.run_query::<Q>(&required, f);
    }

    fn run_query<Q: QueryParam>(
        &mut self,
        required: &[TypeId],
        mut f: impl FnMut(Entity, Q::Item<'_>),
    ) {
        let candidates = self.candidates(required);
        if candidates.is_empty() {
            return;
        }
        let mut column = Q::extract(&mut self.storages);
        for entity in candidates {
            if let Some(item) = Q::fetch(&mut column, entity) {
                f(entity, item);
            }
        }
        Q::restore(column, &mut self.storages);
    }

    /// Entities carrying every type in `required`, driven by the smallest
    /// storage.
    fn candidates(&self, required: &[TypeId]) -> Vec<Entity> {
        let Some(storages) = required
            .iter()
            .map(|tid| self.storages.get(tid).map(|s| s.as_ref()))
            .collect::<Option<Vec<&dyn ComponentStorage>>>()
        else {
            return Vec::new();
        };
        let Some(driver) = storages.iter().min_by_key(|s| s.len()) else {
            return Vec::new();
        };
        driver
            .entities()
            .iter()
            .copied()
            .filter(|&e| storages.iter().all(|s| s.contains(e)))
            .collect()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

// ── Bundles ──────────────────────────────────────────────────────────────

/// A tuple of components that can be spawned together.
///
/// Implemented for tuples of up to 8 `'static + Send + Sync` values.
pub trait Bundle {
    fn insert_into(self, world: &mut World, entity: Entity);
}

macro_rules! impl_bundle {
    ($($T:ident),+) => {
        impl<$($T: 'static + Send + Sync),+> Bundle for ($($T,)+) {
            #[allow(non_snake_case)]
            fn insert_into(self, world: &mut World, entity: Entity) {
                let ($($T,)+) = self;
                $(world.insert(entity, $T);)+
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    #[derive(Debug, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }
    struct Health(u32);
    struct Marker;

    #[test]
    fn spawn_and_query() {
        let mut world = World::new();
        world.spawn((Position { x: 1.0, y: 2.0 }, Velocity { dx: 0.5, dy: -0.5 }));
        world.spawn((Position { x: 3.0, y: 4.0 }, Velocity { dx: 1.0, dy: 1.0 }));
        world.spawn((Position { x: 5.0, y: 6.0 },));

        let mut seen = 0;
        world.query::<(&Position, &Velocity)>(|_, _| seen += 1);
        assert_eq!(seen, 2);
    }

    #[test]
    fn query_mutates_in_place() {
        let mut world = World::new();
        let e = world.spawn((Position { x: 0.0, y: 0.0 }, Velocity { dx: 1.0, dy: 2.0 }));

        world.query::<(&mut Position, &Velocity)>(|_, (pos, vel)| {
            pos.x += vel.dx;
            pos.y += vel.dy;
        });

        assert_eq!(world.get::<Position>(e), Some(&Position { x: 1.0, y: 2.0 }));
    }

    #[test]
    fn query_filtered_requires_marker() {
        let mut world = World::new();
        let tagged = world.spawn((Position { x: 0.0, y: 0.0 }, Marker));
        world.spawn((Position { x: 1.0, y: 1.0 },));

        let mut hits = Vec::new();
        world.query_filtered::<(&Position,), Marker>(|e, _| hits.push(e));
        assert_eq!(hits, vec![tagged]);
    }

    #[test]
    fn query_on_unknown_type_is_empty() {
        let mut world = World::new();
        world.spawn_one(Health(1));
        let mut called = false;
        world.query::<(&Position,)>(|_, _| called = true);
        assert!(!called);
    }

    #[test]
    fn despawn_invalidates_handle_and_drops_components() {
        let mut world = World::new();
        let a = world.spawn((Position { x: 0.0, y: 0.0 }, Health(3)));
        let b = world.spawn((Position { x: 1.0, y: 1.0 },));

        assert!(world.despawn(a));
        assert!(!world.despawn(a));
        assert!(!world.is_alive(a));
        assert!(world.get::<Position>(a).is_none());
        assert_eq!(world.count::<Health>(), 0);
        assert_eq!(world.entities_with::<Position>(), vec![b]);
    }

    #[test]
    fn stale_handle_does_not_see_new_occupant() {
        let mut world = World::new();
        let old = world.spawn_one(Health(1));
        world.despawn(old);
        let new = world.spawn_one(Health(2));

        assert_eq!(old.index(), new.index());
        assert!(world.get::<Health>(old).is_none());
        assert!(!world.has::<Health>(old));
        assert_eq!(world.get::<Health>(new).map(|h| h.0), Some(2));
    }

    #[test]
    fn insert_remove_take() {
        let mut world = World::new();
        let e = world.spawn_one(Position { x: 1.0, y: 2.0 });

        world.insert(e, Health(50));
        world.insert(e, Health(100));
        assert_eq!(world.get::<Health>(e).map(|h| h.0), Some(100));

        assert!(world.remove::<Health>(e));
        assert!(!world.remove::<Health>(e));
        assert_eq!(world.take::<Position>(e), Some(Position { x: 1.0, y: 2.0 }));
        assert!(world.is_alive(e));
    }

    #[test]
    #[should_panic(expected = "dead entity")]
    fn insert_on_dead_entity_panics() {
        let mut world = World::new();
        let e = world.spawn_empty();
        world.despawn(e);
        world.insert(e, Marker);
    }

    #[test]
    #[should_panic(expected = "requested twice")]
    fn aliasing_query_panics() {
        let mut world = World::new();
        world.spawn_one(Health(1));
        world.query::<(&Health, &mut Health)>(|_, _| {});
    }

    #[test]
    fn resources_roundtrip() {
        let mut world = World::new();
        world.insert_resource(42u32);
        *world.resource_mut::<u32>() += 1;
        assert_eq!(*world.resource::<u32>(), 43);

        assert_eq!(world.resource_remove::<u32>(), Some(43));
        assert!(!world.has_resource::<u32>());
        assert_eq!(world.resource_remove::<u64>(), None);
    }
}

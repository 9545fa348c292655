//! # Query — Closure Iteration over Component Tuples
//!
//! ```text
//! world.query::<(&mut LocalTransform, &Velocity)>(|entity, (local, vel)| {
//!     local.position += vel.velocity * dt;
//! });
//! ```
//!
//! 1. The world picks the smallest storage among the requested types and
//!    filters its owners down to entities that have every requested type.
//! 2. The requested storages are taken out of the world's map, so the borrow
//!    checker can see that `&mut A` and `&B` never alias.
//! 3. The closure runs once per candidate entity.
//! 4. The storages go back into the map.
//!
//! Requesting the same type twice in one query (`(&A, &mut A)`) panics during
//! extraction, since the second extract finds the storage already gone.

use std::any::TypeId;
use std::collections::HashMap;

use super::component::{ComponentStorage, downcast, downcast_mut};
use super::entity::Entity;

/// Something that can be fetched per entity by a query: `&T`, `&mut T`, or a
/// tuple of those.
pub trait QueryParam {
    /// Item handed to the closure for one entity.
    type Item<'w>;

    /// Storage(s) taken out of the world for the duration of the query.
    type Column;

    fn type_ids() -> Vec<TypeId>;

    fn extract(storages: &mut HashMap<TypeId, Box<dyn ComponentStorage>>) -> Self::Column;

    fn restore(column: Self::Column, storages: &mut HashMap<TypeId, Box<dyn ComponentStorage>>);

    /// `None` when `entity` lacks one of the components.
    fn fetch(column: &mut Self::Column, entity: Entity) -> Option<Self::Item<'_>>;
}

fn take_storage<T: 'static>(
    storages: &mut HashMap<TypeId, Box<dyn ComponentStorage>>,
) -> (TypeId, Box<dyn ComponentStorage>) {
    let type_id = TypeId::of::<T>();
    let storage = storages.remove(&type_id).unwrap_or_else(|| {
        panic!(
            "query: storage for `{}` is missing or requested twice",
            std::any::type_name::<T>()
        )
    });
    (type_id, storage)
}

impl<T: 'static + Send + Sync> QueryParam for &T {
    type Item<'w> = &'w T;
    type Column = (TypeId, Box<dyn ComponentStorage>);

    fn type_ids() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    fn extract(storages: &mut HashMap<TypeId, Box<dyn ComponentStorage>>) -> Self::Column {
        take_storage::<T>(storages)
    }

    fn restore(column: Self::Column, storages: &mut HashMap<TypeId, Box<dyn ComponentStorage>>) {
        storages.insert(column.0, column.1);
    }

    fn fetch(column: &mut Self::Column, entity: Entity) -> Option<Self::Item<'_>> {
        downcast::<T>(column.1.as_ref()).get(entity)
    }
}

impl<T: 'static + Send + Sync> QueryParam for &mut T {
    type Item<'w> = &'w mut T;
    type Column = (TypeId, Box<dyn ComponentStorage>);

    fn type_ids() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    fn extract(storages: &mut HashMap<TypeId, Box<dyn ComponentStorage>>) -> Self::Column {
        take_storage::<T>(storages)
    }

    fn restore(column: Self::Column, storages: &mut HashMap<TypeId, Box<dyn ComponentStorage>>) {
        storages.insert(column.0, column.1);
    }

    fn fetch(column: &mut Self::Column, entity: Entity) -> Option<Self::Item<'_>> {
        downcast_mut::<T>(column.1.as_mut()).get_mut(entity)
    }
}

macro_rules! impl_query_param_tuple {
    ($($P:ident),+) => {
        impl<$($P: QueryParam),+> QueryParam for ($($P,)+) {
            type Item<'w> = ($($P::Item<'w>,)+);
            type Column = ($($P::Column,)+);

            fn type_ids() -> Vec<TypeId> {
                let mut ids = Vec::new();
                $(ids.extend($P::type_ids());)+
                ids
            }

            fn extract(storages: &mut HashMap<TypeId, Box<dyn ComponentStorage>>) -> Self::Column {
                ($($P::extract(storages),)+)
            }

            #[allow(non_snake_case)]
            fn restore(column: Self::Column, storages: &mut HashMap<TypeId, Box<dyn ComponentStorage>>) {
                let ($($P,)+) = column;
                $($P::restore($P, storages);)+
            }

            #[allow(non_snake_case)]
            fn fetch(column: &mut Self::Column, entity: Entity) -> Option<Self::Item<'_>> {
                let ($($P,)+) = column;
                Some(($($P::fetch($P, entity)?,)+))
            }
        }
    };
}

impl_query_param_tuple!(A);
impl_query_param_tuple!(A, B);
impl_query_param_tuple!(A, B, C);
impl_query_param_tuple!(A, B, C, D);
impl_query_param_tuple!(A, B, C, D, E);
impl_query_param_tuple!(A, B, C, D, E, F);

//! Draw ordering for renderers.
//!
//! Renderers walk [`sorted_for_draw`] once per frame, after the resolver has
//! run. Lower layers draw first; within a layer, lower `order` draws first.

use crate::ecs::{Entity, World};

use super::layout::GlobalTransform;
use super::tree::Dirty;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderLayer {
    pub layer: u32,
    pub order: u32,
}

impl RenderLayer {
    pub fn new(layer: u32, order: u32) -> Self {
        Self { layer, order }
    }
}

/// Entities with a `GlobalTransform` and a [`RenderLayer`], in draw order.
///
/// Ties are broken by entity handle so the order is stable frame to frame.
pub fn sorted_for_draw(world: &mut World) -> Vec<(Entity, GlobalTransform)> {
    if world.count::<Dirty>() > 0 {
        log::warn!(
            "draw order requested with {} dirty entities; transforms may be stale",
            world.count::<Dirty>()
        );
    }
    let mut items = Vec::new();
    world.query::<(&RenderLayer, &GlobalTransform)>(|entity, (layer, global)| {
        items.push((*layer, entity, *global));
    });
    items.sort_by_key(|(layer, entity, _)| (*layer, *entity));
    items
        .into_iter()
        .map(|(_, entity, global)| (entity, global))
        .collect()
}

//! Prefabs: functions from spawn parameters to a ready scene entity.
//!
//! A prefab is composition, not inheritance. [`spawn_node`] is the common
//! core (spawn, layout, join the tree); game-specific prefabs attach their
//! own components on top and mount the result wherever it belongs.
//!
//! ```ignore
//! fn bullet(world: &mut World, at: Vec2) -> SceneResult<Entity> {
//!     let e = prefab::spawn_node(world, LayoutBuilder::new().local_position(at))?;
//!     world.insert(e, Velocity::new(Vec2::new(0.0, -400.0)));
//!     Ok(e)
//! }
//! ```

use crate::ecs::{Entity, World};
use crate::error::SceneResult;
use crate::math::Vec2;
use crate::scene::layout::{Anchor, LayoutBuilder, LayoutType};
use crate::scene::tree::attach_scene_tree_components;
use crate::scene::tree_like::{SceneHandle, TreeLike};

/// Spawn an entity with layout components and add it to the tree as a dirty
/// root.
pub fn spawn_node(world: &mut World, layout: LayoutBuilder) -> SceneResult<Entity> {
    let entity = world.spawn_empty();
    layout.build(world, entity)?;
    attach_scene_tree_components(world, entity)?;
    Ok(entity)
}

/// Scene root covering the whole viewport. Everything in a level hangs off it.
#[derive(Debug, Clone, Copy)]
pub struct Root {
    handle: SceneHandle,
}

impl Root {
    pub fn create(world: &mut World, viewport: Vec2) -> SceneResult<Self> {
        let entity = spawn_node(
            world,
            LayoutBuilder::new()
                .size(viewport)
                .anchor(Anchor::TOP_LEFT)
                .layout_type(LayoutType::Absolute),
        )?;
        log::debug!("scene root {entity} created ({}x{})", viewport.x, viewport.y);
        Ok(Self {
            handle: SceneHandle::new(entity),
        })
    }
}

impl TreeLike for Root {
    fn entity(&self) -> Entity {
        self.handle.entity()
    }

    fn unmount_flag(&self) -> bool {
        self.handle.unmount_flag()
    }

    fn set_unmount_flag(&mut self) {
        self.handle.set_unmount_flag();
    }
}

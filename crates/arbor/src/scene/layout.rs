//! # Spatial Components and the Layout Routine
//!
//! ```text
//! LocalTransform  (author-set)          GlobalTransform  (resolver-owned)
//! ├── position                          ├── position
//! ├── size          calculate_layout    ├── size
//! └── scale       ───────────────────▶  ├── scale
//! Layout                                └── origin = anchor * size
//! ├── anchor
//! └── layout_type (Relative | Absolute)
//! ```
//!
//! A Relative entity with a parent sits at `parent.position + local.position`
//! and its scale is `local.scale * parent.scale`. The positional offset is
//! NOT multiplied by the parent's scale; sprite and camera code downstream
//! expects flat offsets. Absolute entities and roots copy their local values.

use serde::{Deserialize, Serialize};

use crate::config::AnchorMode;
use crate::ecs::{Entity, World};
use crate::error::{SceneError, SceneResult};
use crate::math::Vec2;

use super::tree::Parent;

/// Author-facing transform, relative to the parent for Relative layouts.
///
/// Mutate it through [`movement`](super::movement) so the entity gets marked
/// dirty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalTransform {
    pub position: Vec2,
    pub size: Vec2,
    pub scale: Vec2,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            scale: Vec2::ONE,
        }
    }
}

/// World-space placement computed by the resolver.
///
/// Read-only outside the crate: rendering and collision consume it, only
/// [`calculate_layout`] writes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalTransform {
    pub(crate) position: Vec2,
    pub(crate) size: Vec2,
    pub(crate) scale: Vec2,
    pub(crate) origin: Vec2,
}

impl GlobalTransform {
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Anchor offset in pixels, `anchor * size`.
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Top-left corner of the entity's box, whatever the anchor mode.
    pub fn top_left(&self, mode: AnchorMode) -> Vec2 {
        match mode {
            AnchorMode::Origin => self.position - self.origin,
            AnchorMode::Offset => self.position,
        }
    }
}

impl Default for GlobalTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            scale: Vec2::ONE,
            origin: Vec2::ZERO,
        }
    }
}

/// Normalized point inside the entity's box. `(0, 0)` is the top-left corner,
/// `(1, 1)` the bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor(pub Vec2);

impl Anchor {
    pub const TOP_LEFT: Self = Self(Vec2::new(0.0, 0.0));
    pub const TOP_CENTER: Self = Self(Vec2::new(0.5, 0.0));
    pub const TOP_RIGHT: Self = Self(Vec2::new(1.0, 0.0));
    pub const MIDDLE_LEFT: Self = Self(Vec2::new(0.0, 0.5));
    pub const MIDDLE_CENTER: Self = Self(Vec2::new(0.5, 0.5));
    pub const MIDDLE_RIGHT: Self = Self(Vec2::new(1.0, 0.5));
    pub const BOTTOM_LEFT: Self = Self(Vec2::new(0.0, 1.0));
    pub const BOTTOM_CENTER: Self = Self(Vec2::new(0.5, 1.0));
    pub const BOTTOM_RIGHT: Self = Self(Vec2::new(1.0, 1.0));

    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }

    /// Pixel offset of this anchor inside a box of `size`.
    pub fn offset_for(self, size: Vec2) -> Vec2 {
        self.0 * size
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutType {
    /// Composes with the parent's global transform.
    #[default]
    Relative,
    /// Global equals local, parent ignored.
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub anchor: Anchor,
    pub layout_type: LayoutType,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            anchor: Anchor::MIDDLE_CENTER,
            layout_type: LayoutType::Relative,
        }
    }
}

/// Marker: the entity carries `Layout`, `LocalTransform` and `GlobalTransform`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasLayout;

/// Attach `HasLayout`, a default `Layout`, `LocalTransform` and
/// `GlobalTransform`.
pub fn attach_layout_components(world: &mut World, entity: Entity) -> SceneResult<Entity> {
    if !world.is_alive(entity) {
        return Err(SceneError::StaleEntity(entity));
    }
    if world.has::<HasLayout>(entity) {
        return Err(SceneError::LayoutAlreadyAttached(entity));
    }
    world.insert(entity, HasLayout);
    world.insert(entity, Layout::default());
    world.insert(entity, LocalTransform::default());
    world.insert(entity, GlobalTransform::default());
    Ok(entity)
}

/// Fluent setup for an entity's layout components.
///
/// ```ignore
/// LayoutBuilder::new()
///     .size(Vec2::new(32.0, 32.0))
///     .local_position(Vec2::new(0.0, -40.0))
///     .anchor(Anchor::MIDDLE_CENTER)
///     .build(world, bullet)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBuilder {
    size: Vec2,
    local_position: Vec2,
    scale: Vec2,
    anchor: Anchor,
    layout_type: LayoutType,
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self {
            size: Vec2::ZERO,
            local_position: Vec2::ZERO,
            scale: Vec2::ONE,
            anchor: Anchor::TOP_LEFT,
            layout_type: LayoutType::Relative,
        }
    }
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn local_position(mut self, position: Vec2) -> Self {
        self.local_position = position;
        self
    }

    pub fn scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn layout_type(mut self, layout_type: LayoutType) -> Self {
        self.layout_type = layout_type;
        self
    }

    /// Write the configured values, attaching layout components first if the
    /// entity has none. Does not mark the entity dirty.
    pub fn build(&self, world: &mut World, entity: Entity) -> SceneResult<()> {
        if !world.has::<HasLayout>(entity) {
            log::trace!("{entity} has no layout components, attaching them");
            attach_layout_components(world, entity)?;
        }
        world.insert(
            entity,
            Layout {
                anchor: self.anchor,
                layout_type: self.layout_type,
            },
        );
        world.insert(
            entity,
            LocalTransform {
                position: self.local_position,
                size: self.size,
                scale: self.scale,
            },
        );
        Ok(())
    }
}

/// Recompute `GlobalTransform` for one entity from its local values and its
/// parent's global transform.
///
/// The parent must already be resolved. A parent without a `GlobalTransform`
/// (a pure grouping node) contributes nothing, as if the entity were a root.
pub fn calculate_layout(world: &mut World, entity: Entity, mode: AnchorMode) -> SceneResult<()> {
    if !world.is_alive(entity) {
        return Err(SceneError::StaleEntity(entity));
    }
    let layout = *world
        .get::<Layout>(entity)
        .ok_or_else(|| SceneError::missing::<Layout>(entity))?;
    let local = *world
        .get::<LocalTransform>(entity)
        .ok_or_else(|| SceneError::missing::<LocalTransform>(entity))?;

    let parent_global = match (layout.layout_type, world.get::<Parent>(entity).and_then(Parent::get)) {
        (LayoutType::Relative, Some(parent)) => world.get::<GlobalTransform>(parent).copied(),
        _ => None,
    };

    let origin = layout.anchor.offset_for(local.size);
    let (base, scale) = match parent_global {
        Some(parent) => (parent.position, local.scale * parent.scale),
        None => (Vec2::ZERO, local.scale),
    };
    let position = match mode {
        AnchorMode::Origin => base + local.position,
        AnchorMode::Offset => base + local.position - origin,
    };

    let global = world
        .get_mut::<GlobalTransform>(entity)
        .ok_or_else(|| SceneError::missing::<GlobalTransform>(entity))?;
    global.origin = origin;
    global.position = position;
    global.size = local.size;
    global.scale = scale;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;
    use crate::scene::tree::{attach_child, attach_scene_tree_components};

    fn layout_entity(world: &mut World, builder: LayoutBuilder) -> Entity {
        let e = world.spawn_empty();
        builder.build(world, e).unwrap();
        attach_scene_tree_components(world, e).unwrap();
        e
    }

    fn global(world: &World, e: Entity) -> GlobalTransform {
        *world.get::<GlobalTransform>(e).unwrap()
    }

    #[test]
    fn root_copies_local_and_stores_origin() {
        let mut world = World::new();
        let e = layout_entity(
            &mut world,
            LayoutBuilder::new()
                .local_position(Vec2::new(100.0, 100.0))
                .size(Vec2::new(100.0, 40.0))
                .scale(Vec2::new(2.0, 2.0))
                .anchor(Anchor::MIDDLE_CENTER),
        );

        calculate_layout(&mut world, e, AnchorMode::Origin).unwrap();

        let g = global(&world, e);
        assert!(approx_eq(g.position(), Vec2::new(100.0, 100.0)));
        assert!(approx_eq(g.origin(), Vec2::new(50.0, 20.0)));
        assert!(approx_eq(g.size(), Vec2::new(100.0, 40.0)));
        assert!(approx_eq(g.scale(), Vec2::new(2.0, 2.0)));
        assert!(approx_eq(g.top_left(AnchorMode::Origin), Vec2::new(50.0, 80.0)));
    }

    #[test]
    fn relative_child_adds_offset_without_scaling_it() {
        let mut world = World::new();
        let parent = layout_entity(
            &mut world,
            LayoutBuilder::new()
                .local_position(Vec2::new(10.0, 20.0))
                .scale(Vec2::new(2.0, 3.0)),
        );
        let child = layout_entity(
            &mut world,
            LayoutBuilder::new()
                .local_position(Vec2::new(5.0, 5.0))
                .scale(Vec2::new(0.5, 2.0)),
        );
        attach_child(&mut world, parent, child).unwrap();

        calculate_layout(&mut world, parent, AnchorMode::Origin).unwrap();
        calculate_layout(&mut world, child, AnchorMode::Origin).unwrap();

        let g = global(&world, child);
        assert!(approx_eq(g.position(), Vec2::new(15.0, 25.0)));
        assert!(approx_eq(g.scale(), Vec2::new(1.0, 6.0)));
    }

    #[test]
    fn absolute_child_ignores_parent() {
        let mut world = World::new();
        let parent = layout_entity(
            &mut world,
            LayoutBuilder::new()
                .local_position(Vec2::new(300.0, 300.0))
                .scale(Vec2::new(4.0, 4.0)),
        );
        let child = layout_entity(
            &mut world,
            LayoutBuilder::new()
                .local_position(Vec2::new(7.0, 8.0))
                .layout_type(LayoutType::Absolute),
        );
        attach_child(&mut world, parent, child).unwrap();

        calculate_layout(&mut world, parent, AnchorMode::Origin).unwrap();
        calculate_layout(&mut world, child, AnchorMode::Origin).unwrap();

        let g = global(&world, child);
        assert!(approx_eq(g.position(), Vec2::new(7.0, 8.0)));
        assert!(approx_eq(g.scale(), Vec2::ONE));
    }

    #[test]
    fn offset_mode_subtracts_anchor_offset() {
        let mut world = World::new();
        let e = layout_entity(
            &mut world,
            LayoutBuilder::new()
                .local_position(Vec2::new(100.0, 100.0))
                .size(Vec2::new(100.0, 100.0))
                .anchor(Anchor::MIDDLE_CENTER),
        );

        calculate_layout(&mut world, e, AnchorMode::Offset).unwrap();

        let g = global(&world, e);
        assert!(approx_eq(g.position(), Vec2::new(50.0, 50.0)));
        assert!(approx_eq(g.origin(), Vec2::new(50.0, 50.0)));
        assert!(approx_eq(g.top_left(AnchorMode::Offset), Vec2::new(50.0, 50.0)));
    }

    #[test]
    fn missing_layout_is_reported() {
        let mut world = World::new();
        let e = world.spawn_one(LocalTransform::default());
        let err = calculate_layout(&mut world, e, AnchorMode::Origin).unwrap_err();
        assert_eq!(err, SceneError::missing::<Layout>(e));
    }

    #[test]
    fn attaching_layout_twice_fails() {
        let mut world = World::new();
        let e = world.spawn_empty();
        attach_layout_components(&mut world, e).unwrap();
        assert_eq!(world.get::<Layout>(e), Some(&Layout::default()));
        assert_eq!(
            attach_layout_components(&mut world, e),
            Err(SceneError::LayoutAlreadyAttached(e))
        );
    }

    #[test]
    fn builder_defaults() {
        let mut world = World::new();
        let e = world.spawn_empty();
        LayoutBuilder::new().build(&mut world, e).unwrap();
        let layout = world.get::<Layout>(e).unwrap();
        assert_eq!(layout.anchor, Anchor::TOP_LEFT);
        assert_eq!(layout.layout_type, LayoutType::Relative);
        assert_eq!(world.get::<LocalTransform>(e).unwrap().scale, Vec2::ONE);
    }

    #[test]
    fn anchor_constants_span_the_box() {
        let size = Vec2::new(10.0, 20.0);
        assert_eq!(Anchor::TOP_LEFT.offset_for(size), Vec2::ZERO);
        assert_eq!(Anchor::BOTTOM_RIGHT.offset_for(size), size);
        assert_eq!(Anchor::TOP_CENTER.offset_for(size), Vec2::new(5.0, 0.0));
        assert_eq!(Anchor::MIDDLE_RIGHT.offset_for(size), Vec2::new(10.0, 10.0));
        assert_eq!(Anchor::BOTTOM_LEFT.offset_for(size), Vec2::new(0.0, 20.0));
    }
}

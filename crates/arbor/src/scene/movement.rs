//! # Movement — the Mutator Surface
//!
//! Gameplay code changes placement only through these functions. Each one
//! writes `LocalTransform` or `Layout` and then marks the entity dirty, so
//! the resolver picks it up before anything renders.
//!
//! Entities with layout components but outside the scene tree have nothing
//! to resolve; for them only the local value changes.

use crate::ecs::{Entity, World};
use crate::error::{SceneError, SceneResult};
use crate::math::Vec2;

use super::layout::{Anchor, Layout, LayoutType, LocalTransform};
use super::tree::{is_in_tree, mark_as_dirty};

/// Sign pattern applied to a scale by [`flip`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flip(pub Vec2);

impl Flip {
    pub const NONE: Self = Self(Vec2::new(1.0, 1.0));
    pub const HORIZONTAL: Self = Self(Vec2::new(-1.0, 1.0));
    pub const VERTICAL: Self = Self(Vec2::new(1.0, -1.0));
    pub const BOTH: Self = Self(Vec2::new(-1.0, -1.0));
}

pub fn is_horizontally_flipped(scale: Vec2) -> bool {
    scale.x < 0.0
}

pub fn is_vertically_flipped(scale: Vec2) -> bool {
    scale.y < 0.0
}

/// Per-entity linear motion, integrated by [`integrate_velocity`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    /// Units per second.
    pub velocity: Vec2,
    /// Units per second squared.
    pub acceleration: Vec2,
}

impl Velocity {
    pub fn new(velocity: Vec2) -> Self {
        Self {
            velocity,
            acceleration: Vec2::ZERO,
        }
    }

    pub fn with_acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        self
    }
}

fn component_mut<T: 'static + Send + Sync>(world: &mut World, entity: Entity) -> SceneResult<&mut T> {
    if !world.is_alive(entity) {
        return Err(SceneError::StaleEntity(entity));
    }
    world
        .get_mut::<T>(entity)
        .ok_or_else(|| SceneError::missing::<T>(entity))
}

fn touch(world: &mut World, entity: Entity) -> SceneResult<()> {
    if is_in_tree(world, entity) {
        mark_as_dirty(world, entity)?;
    }
    Ok(())
}

fn update_local(
    world: &mut World,
    entity: Entity,
    f: impl FnOnce(&mut LocalTransform),
) -> SceneResult<()> {
    f(component_mut::<LocalTransform>(world, entity)?);
    touch(world, entity)
}

fn update_layout(world: &mut World, entity: Entity, f: impl FnOnce(&mut Layout)) -> SceneResult<()> {
    f(component_mut::<Layout>(world, entity)?);
    touch(world, entity)
}

pub fn set_position(world: &mut World, entity: Entity, position: Vec2) -> SceneResult<()> {
    update_local(world, entity, |local| local.position = position)
}

pub fn set_size(world: &mut World, entity: Entity, size: Vec2) -> SceneResult<()> {
    update_local(world, entity, |local| local.size = size)
}

pub fn set_scale(world: &mut World, entity: Entity, scale: Vec2) -> SceneResult<()> {
    update_local(world, entity, |local| local.scale = scale)
}

pub fn set_anchor(world: &mut World, entity: Entity, anchor: Anchor) -> SceneResult<()> {
    update_layout(world, entity, |layout| layout.anchor = anchor)
}

pub fn set_layout_type(world: &mut World, entity: Entity, layout_type: LayoutType) -> SceneResult<()> {
    update_layout(world, entity, |layout| layout.layout_type = layout_type)
}

/// Shift the local position by `offset`.
pub fn move_by(world: &mut World, entity: Entity, offset: Vec2) -> SceneResult<()> {
    update_local(world, entity, |local| local.position += offset)
}

/// Set the sign of each scale axis from `flip`, keeping magnitudes.
pub fn flip(world: &mut World, entity: Entity, flip: Flip) -> SceneResult<()> {
    update_local(world, entity, |local| local.scale = local.scale.abs() * flip.0)
}

/// Mirror along x (`true`) or restore x (`false`). The y axis is untouched.
pub fn flip_horizontal(world: &mut World, entity: Entity, flipped: bool) -> SceneResult<()> {
    let sign = if flipped { -1.0 } else { 1.0 };
    update_local(world, entity, |local| local.scale.x = local.scale.x.abs() * sign)
}

/// Mirror along y (`true`) or restore y (`false`). The x axis is untouched.
pub fn flip_vertical(world: &mut World, entity: Entity, flipped: bool) -> SceneResult<()> {
    let sign = if flipped { -1.0 } else { 1.0 };
    update_local(world, entity, |local| local.scale.y = local.scale.y.abs() * sign)
}

/// Advance every [`Velocity`]: `velocity += acceleration * dt`, then move the
/// entity by `velocity * dt`.
pub fn integrate_velocity(world: &mut World, dt: f32) -> SceneResult<()> {
    let mut moves = Vec::new();
    world.query::<(&mut Velocity, &LocalTransform)>(|entity, (vel, _)| {
        vel.velocity += vel.acceleration * dt;
        let step = vel.velocity * dt;
        if step != Vec2::ZERO {
            moves.push((entity, step));
        }
    });
    for (entity, step) in moves {
        move_by(world, entity, step)?;
    }
    Ok(())
}

/// `true` if `point` lies outside the box `[min, max]`.
pub fn is_out_of_bounds(point: Vec2, min: Vec2, max: Vec2) -> SceneResult<bool> {
    if min.x > max.x || min.y > max.y {
        return Err(SceneError::InvalidBounds { min, max });
    }
    Ok(point.x < min.x || point.y < min.y || point.x > max.x || point.y > max.y)
}

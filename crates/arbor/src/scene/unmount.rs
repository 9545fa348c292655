//! # Deferred Unmount
//!
//! Gameplay code never destroys scene entities in the middle of a frame. It
//! calls [`queue_unmount`], which only tags the entity, and the frame pipeline
//! calls [`drain_unmount_queue`] once rendering is done:
//!
//! ```text
//! collision callback ──queue_unmount(bullet)──▶ Unmount marker
//! render             ──sees bullet as usual
//! drain              ──unmount(bullet): children first, then bullet
//! ```
//!
//! A handle that is already gone by the time it is unmounted is logged and
//! skipped. That happens legitimately when a parent and one of its children
//! were both queued in the same frame.

use crate::ecs::{Entity, World};
use crate::error::{SceneError, SceneResult};

use super::tree::{Node, Parent, Unmount, children_of, detach_scene_tree_components};

/// Queue `entity` for destruction at the end of the frame.
///
/// Returns `true` if this call added the marker, `false` if it was already
/// queued or the handle is already stale.
pub fn queue_unmount(world: &mut World, entity: Entity) -> SceneResult<bool> {
    if !world.is_alive(entity) {
        log::warn!("queue_unmount: {entity} is already destroyed");
        return Ok(false);
    }
    if !world.has::<Node>(entity) {
        return Err(SceneError::NotInTree(entity));
    }
    if world.has::<Unmount>(entity) {
        return Ok(false);
    }
    world.insert(entity, Unmount);
    Ok(true)
}

pub fn is_unmount_queued(world: &World, entity: Entity) -> bool {
    world.has::<Unmount>(entity)
}

/// Destroy `entity` and its whole subtree now, children before parents.
///
/// Returns the number of entities destroyed. Only call this outside of any
/// iteration over live components; during a frame use [`queue_unmount`].
pub fn unmount(world: &mut World, entity: Entity) -> SceneResult<usize> {
    if !world.is_alive(entity) {
        log::warn!("unmount: {entity} is already destroyed");
        return Ok(0);
    }
    if !world.has::<Node>(entity) {
        return Err(SceneError::NotInTree(entity));
    }

    let mut destroyed = 0;
    for child in children_of(world, entity) {
        destroyed += unmount(world, child)?;
    }

    detach_scene_tree_components(world, entity)?;
    world.despawn(entity);
    log::trace!("destroyed {entity}");
    Ok(destroyed + 1)
}

/// Destroy everything queued with [`queue_unmount`].
///
/// Each marker is taken off before its entity is unmounted, so an entity that
/// fails is logged and dropped from the queue without holding up the rest.
pub fn drain_unmount_queue(world: &mut World) -> SceneResult<usize> {
    let queued = world.entities_with::<Unmount>();
    if queued.is_empty() {
        return Ok(0);
    }
    let mut destroyed = 0;
    for entity in queued {
        if world.is_alive(entity) {
            world.remove::<Unmount>(entity);
        }
        match unmount(world, entity) {
            Ok(count) => destroyed += count,
            Err(err) => log::error!("unmount queue: skipping {entity}: {err}"),
        }
    }
    log::debug!("unmount queue drained, {destroyed} entities destroyed");
    Ok(destroyed)
}

/// Destroy every tree, root by root. Used at shutdown.
pub fn unmount_all(world: &mut World) -> SceneResult<usize> {
    let mut roots = Vec::new();
    world.query_filtered::<(&Parent,), Node>(|entity, (parent,)| {
        if parent.get().is_none() {
            roots.push(entity);
        }
    });
    let mut destroyed = 0;
    for root in roots {
        destroyed += unmount(world, root)?;
    }
    Ok(destroyed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tree::{attach_child, attach_scene_tree_components};

    fn node(world: &mut World) -> Entity {
        let e = world.spawn_empty();
        attach_scene_tree_components(world, e).unwrap();
        e
    }

    #[test]
    fn queueing_twice_destroys_once() {
        let mut world = World::new();
        let e = node(&mut world);
        assert_eq!(queue_unmount(&mut world, e), Ok(true));
        assert_eq!(queue_unmount(&mut world, e), Ok(false));
        assert!(is_unmount_queued(&world, e));
        assert!(world.is_alive(e));

        assert_eq!(drain_unmount_queue(&mut world), Ok(1));
        assert!(!world.is_alive(e));
        assert_eq!(drain_unmount_queue(&mut world), Ok(0));
    }

    #[test]
    fn unmount_destroys_subtree_and_unlinks_from_parent() {
        let mut world = World::new();
        let root = node(&mut world);
        let parent = node(&mut world);
        let child = node(&mut world);
        let grandchild = node(&mut world);
        attach_child(&mut world, root, parent).unwrap();
        attach_child(&mut world, parent, child).unwrap();
        attach_child(&mut world, child, grandchild).unwrap();

        assert_eq!(unmount(&mut world, parent), Ok(3));

        assert!(!world.is_alive(parent));
        assert!(!world.is_alive(child));
        assert!(!world.is_alive(grandchild));
        assert!(children_of(&world, root).is_empty());
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn parent_and_child_queued_together() {
        let mut world = World::new();
        let parent = node(&mut world);
        let child = node(&mut world);
        attach_child(&mut world, parent, child).unwrap();
        queue_unmount(&mut world, child).unwrap();
        queue_unmount(&mut world, parent).unwrap();

        assert_eq!(drain_unmount_queue(&mut world), Ok(2));
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.count::<Unmount>(), 0);
    }

    #[test]
    fn leaving_the_tree_cancels_a_queued_unmount() {
        let mut world = World::new();
        let a = node(&mut world);
        let b = node(&mut world);
        queue_unmount(&mut world, a).unwrap();
        queue_unmount(&mut world, b).unwrap();
        detach_scene_tree_components(&mut world, a).unwrap();
        assert!(!is_unmount_queued(&world, a));

        assert_eq!(drain_unmount_queue(&mut world), Ok(1));
        assert!(world.is_alive(a));
        assert!(!world.is_alive(b));
        assert_eq!(drain_unmount_queue(&mut world), Ok(0));
    }

    #[test]
    fn drain_skips_a_failing_entity_and_keeps_going() {
        let mut world = World::new();
        let a = node(&mut world);
        let b = node(&mut world);
        queue_unmount(&mut world, b).unwrap();
        // Bypasses queue_unmount, which refuses entities outside the tree.
        let loose = world.spawn_one(Unmount);

        assert_eq!(drain_unmount_queue(&mut world), Ok(1));
        assert!(!world.is_alive(b));
        assert!(world.is_alive(a));
        assert!(world.is_alive(loose));
        assert!(!is_unmount_queued(&world, loose));
        assert_eq!(drain_unmount_queue(&mut world), Ok(0));
    }

    #[test]
    fn stale_handles_are_tolerated() {
        let mut world = World::new();
        let e = node(&mut world);
        assert_eq!(unmount(&mut world, e), Ok(1));
        assert_eq!(unmount(&mut world, e), Ok(0));
        assert_eq!(queue_unmount(&mut world, e), Ok(false));
    }

    #[test]
    fn entities_outside_the_tree_are_rejected() {
        let mut world = World::new();
        let loose = world.spawn_empty();
        assert_eq!(unmount(&mut world, loose), Err(SceneError::NotInTree(loose)));
        assert_eq!(queue_unmount(&mut world, loose), Err(SceneError::NotInTree(loose)));
    }

    #[test]
    fn unmount_all_clears_every_tree() {
        let mut world = World::new();
        let a = node(&mut world);
        let b = node(&mut world);
        let c = node(&mut world);
        attach_child(&mut world, a, c).unwrap();
        let bystander = world.spawn_empty();

        assert_eq!(unmount_all(&mut world), Ok(3));
        assert!(!world.is_alive(b));
        assert!(world.is_alive(bystander));
    }
}

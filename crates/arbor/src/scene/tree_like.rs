//! Tree membership for game-object wrappers.
//!
//! Prefabs hold a handle to their scene entity and want the same handful of
//! operations: mount a child under themselves, drop a child, tear themselves
//! down. [`TreeLike`] provides those on top of two required accessors, and
//! [`SceneHandle`] is the plain implementation most prefabs embed.

use crate::ecs::{Entity, World};
use crate::error::SceneResult;

use super::tree::{attach_child, detach_child};
use super::unmount::{queue_unmount, unmount};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmountMode {
    /// Tag the entity; the frame pipeline destroys it after rendering.
    Deferred,
    /// Destroy the subtree now. Only safe outside component iteration.
    Immediate,
}

pub trait TreeLike {
    fn entity(&self) -> Entity;

    /// Local unmount flag, set by [`unmount`](TreeLike::unmount).
    fn unmount_flag(&self) -> bool;

    fn set_unmount_flag(&mut self);

    /// `true` after [`unmount`](TreeLike::unmount), or once the entity was
    /// destroyed some other way.
    fn is_unmounted(&self, world: &World) -> bool {
        self.unmount_flag() || !world.is_alive(self.entity())
    }

    /// Tear the object down. Calling it again is a no-op.
    fn unmount(&mut self, world: &mut World, mode: UnmountMode) -> SceneResult<()> {
        if !self.is_unmounted(world) {
            match mode {
                UnmountMode::Deferred => {
                    queue_unmount(world, self.entity())?;
                }
                UnmountMode::Immediate => {
                    unmount(world, self.entity())?;
                }
            }
        }
        self.set_unmount_flag();
        Ok(())
    }

    fn mount_child(&self, world: &mut World, child: Entity) -> SceneResult<Entity> {
        attach_child(world, self.entity(), child)
    }

    /// Detach `child`; it stays alive as a root.
    fn unmount_child(&self, world: &mut World, child: Entity) -> SceneResult<Entity> {
        detach_child(world, self.entity(), child)
    }
}

/// An entity handle plus its unmount flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneHandle {
    entity: Entity,
    unmounted: bool,
}

impl SceneHandle {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            unmounted: false,
        }
    }
}

impl TreeLike for SceneHandle {
    fn entity(&self) -> Entity {
        self.entity
    }

    fn unmount_flag(&self) -> bool {
        self.unmounted
    }

    fn set_unmount_flag(&mut self) {
        self.unmounted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tree::{attach_scene_tree_components, children_of, parent_of};
    use crate::scene::unmount::drain_unmount_queue;

    fn handle(world: &mut World) -> SceneHandle {
        let e = world.spawn_empty();
        attach_scene_tree_components(world, e).unwrap();
        SceneHandle::new(e)
    }

    #[test]
    fn deferred_unmount_flags_immediately_and_destroys_on_drain() {
        let mut world = World::new();
        let mut h = handle(&mut world);

        h.unmount(&mut world, UnmountMode::Deferred).unwrap();
        assert!(h.is_unmounted(&world));
        assert!(world.is_alive(h.entity()));

        h.unmount(&mut world, UnmountMode::Deferred).unwrap();
        assert_eq!(drain_unmount_queue(&mut world), Ok(1));
        assert!(!world.is_alive(h.entity()));
    }

    #[test]
    fn externally_destroyed_handle_reads_as_unmounted() {
        let mut world = World::new();
        let mut h = handle(&mut world);
        crate::scene::unmount::unmount(&mut world, h.entity()).unwrap();

        assert!(h.is_unmounted(&world));
        h.unmount(&mut world, UnmountMode::Immediate).unwrap();
        assert!(h.unmount_flag());
    }

    #[test]
    fn mount_and_unmount_children() {
        let mut world = World::new();
        let parent = handle(&mut world);
        let child = handle(&mut world);

        parent.mount_child(&mut world, child.entity()).unwrap();
        assert_eq!(children_of(&world, parent.entity()), vec![child.entity()]);

        parent.unmount_child(&mut world, child.entity()).unwrap();
        assert_eq!(parent_of(&world, child.entity()), None);
        assert!(world.is_alive(child.entity()));
    }

    #[test]
    fn immediate_unmount_takes_the_subtree() {
        let mut world = World::new();
        let mut parent = handle(&mut world);
        let child = handle(&mut world);
        parent.mount_child(&mut world, child.entity()).unwrap();

        parent.unmount(&mut world, UnmountMode::Immediate).unwrap();
        assert!(child.is_unmounted(&world));
        assert_eq!(world.entity_count(), 0);
    }
}

//! # Scene Tree — Hierarchy Links and Dirty Propagation
//!
//! An entity is in the tree when it carries `Node`, `Parent` and `Children`
//! together. The two link components always agree:
//!
//! ```text
//!   root  Parent(None)   Children{a, b}
//!   ├── a Parent(root)   Children{c}
//!   │   └── c Parent(a)  Children{}
//!   └── b Parent(root)   Children{}
//! ```
//!
//! Dirtiness spreads downward only, and only when it is set: marking `a`
//! dirty marks `c` too. Clearing it never recurses (the resolver cleans each
//! entity individually) except when a subtree is torn down.
//!
//! Every operation validates its preconditions and returns a [`SceneError`]
//! instead of patching the tree into some guessed state.

use std::collections::BTreeSet;

use crate::ecs::{Entity, World};
use crate::error::{SceneError, SceneResult};

/// Marker: the entity participates in the scene tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct Node;

/// Upward link. `None` means the entity is a root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Parent(pub(crate) Option<Entity>);

impl Parent {
    pub fn get(&self) -> Option<Entity> {
        self.0
    }
}

/// Directly owned children. Each entity appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Children(pub(crate) BTreeSet<Entity>);

impl Children {
    pub fn contains(&self, entity: Entity) -> bool {
        self.0.contains(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Entity> {
        self.iter().collect()
    }
}

/// Marker: `GlobalTransform` is stale.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dirty;

/// Marker: the entity and its subtree are queued for destruction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmount;

fn ensure_alive(world: &World, entity: Entity) -> SceneResult<()> {
    if world.is_alive(entity) {
        Ok(())
    } else {
        Err(SceneError::StaleEntity(entity))
    }
}

fn ensure_in_tree(world: &World, entity: Entity) -> SceneResult<()> {
    ensure_alive(world, entity)?;
    if world.has::<Node>(entity) {
        Ok(())
    } else {
        Err(SceneError::NotInTree(entity))
    }
}

fn ensure_link_components(world: &World, parent: Entity, child: Entity) -> SceneResult<()> {
    ensure_alive(world, parent)?;
    ensure_alive(world, child)?;
    if !world.has::<Children>(parent) {
        return Err(SceneError::missing::<Children>(parent));
    }
    if !world.has::<Parent>(child) {
        return Err(SceneError::missing::<Parent>(child));
    }
    Ok(())
}

pub fn is_in_tree(world: &World, entity: Entity) -> bool {
    world.has::<Node>(entity)
}

/// `None` for roots, entities outside the tree and stale handles.
pub fn parent_of(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<Parent>(entity).and_then(Parent::get)
}

/// Snapshot of the direct children; empty outside the tree.
pub fn children_of(world: &World, entity: Entity) -> Vec<Entity> {
    world
        .get::<Children>(entity)
        .map(Children::to_vec)
        .unwrap_or_default()
}

/// `true` if `ancestor` appears on the parent chain of `entity`.
pub fn is_ancestor_of(world: &World, ancestor: Entity, entity: Entity) -> bool {
    let mut current = parent_of(world, entity);
    while let Some(e) = current {
        if e == ancestor {
            return true;
        }
        current = parent_of(world, e);
    }
    false
}

/// Every entity below `entity`, parents before children.
pub fn descendants(world: &World, entity: Entity) -> Vec<Entity> {
    let mut out = Vec::new();
    let mut stack: Vec<Entity> = children_of(world, entity).into_iter().rev().collect();
    while let Some(e) = stack.pop() {
        out.push(e);
        stack.extend(children_of(world, e).into_iter().rev());
    }
    out
}

/// Put `entity` into the tree as a dirty root.
pub fn attach_scene_tree_components(world: &mut World, entity: Entity) -> SceneResult<Entity> {
    ensure_alive(world, entity)?;
    if world.has::<Node>(entity) {
        return Err(SceneError::AlreadyInTree(entity));
    }
    world.insert(entity, Node);
    world.insert(entity, Parent(None));
    world.insert(entity, Children::default());
    mark_as_dirty(world, entity)?;
    log::debug!("{entity} joined the scene tree");
    Ok(entity)
}

/// Take `entity` out of the tree.
///
/// Its children are detached and become dirty roots; they are not destroyed.
/// Pending dirty state and a queued unmount of `entity` are dropped.
pub fn detach_scene_tree_components(world: &mut World, entity: Entity) -> SceneResult<Entity> {
    ensure_in_tree(world, entity)?;

    if let Some(parent) = parent_of(world, entity) {
        unlink(world, parent, entity);
    }
    for child in children_of(world, entity) {
        detach_child(world, entity, child)?;
    }
    mark_as_clean_recurse(world, entity)?;

    world.remove::<Unmount>(entity);
    world.remove::<Node>(entity);
    world.remove::<Parent>(entity);
    world.remove::<Children>(entity);
    log::debug!("{entity} left the scene tree");
    Ok(entity)
}

/// Drop both sides of the `parent`/`child` link without touching dirtiness.
fn unlink(world: &mut World, parent: Entity, child: Entity) {
    if let Some(children) = world.get_mut::<Children>(parent) {
        children.0.remove(&child);
    }
    if let Some(link) = world.get_mut::<Parent>(child) {
        if link.0 == Some(parent) {
            link.0 = None;
        }
    }
}

/// Make `child` a child of `parent`, detaching it from any previous parent
/// first. `child` and its subtree become dirty.
pub fn attach_child(world: &mut World, parent: Entity, child: Entity) -> SceneResult<Entity> {
    ensure_link_components(world, parent, child)?;
    if parent == child || is_ancestor_of(world, child, parent) {
        return Err(SceneError::WouldCycle { parent, child });
    }

    if let Some(old) = parent_of(world, child) {
        if old != parent {
            unlink(world, old, child);
        }
    }
    if let Some(children) = world.get_mut::<Children>(parent) {
        children.0.insert(child);
    }
    if let Some(link) = world.get_mut::<Parent>(child) {
        link.0 = Some(parent);
    }

    mark_as_dirty(world, child)?;
    log::debug!("attached {child} under {parent}");
    Ok(child)
}

/// Cut the link between `parent` and `child`. `child` becomes a dirty root.
pub fn detach_child(world: &mut World, parent: Entity, child: Entity) -> SceneResult<Entity> {
    ensure_link_components(world, parent, child)?;
    let listed = world
        .get::<Children>(parent)
        .is_some_and(|c| c.contains(child));
    if !listed || parent_of(world, child) != Some(parent) {
        return Err(SceneError::NotAChild { parent, child });
    }

    unlink(world, parent, child);
    mark_as_dirty(world, child)?;
    log::debug!("detached {child} from {parent}");
    Ok(child)
}

/// [`attach_child`] from the child's side.
pub fn attach_parent(world: &mut World, child: Entity, parent: Entity) -> SceneResult<Entity> {
    attach_child(world, parent, child)
}

/// [`detach_child`] from the child's side.
pub fn detach_parent(world: &mut World, child: Entity, parent: Entity) -> SceneResult<Entity> {
    detach_child(world, parent, child)
}

/// Mark `entity` and, transitively, every child dirty.
///
/// An entity that is already dirty is left alone along with its subtree.
pub fn mark_as_dirty(world: &mut World, entity: Entity) -> SceneResult<Entity> {
    ensure_in_tree(world, entity)?;
    let mut stack = vec![entity];
    while let Some(e) = stack.pop() {
        if world.has::<Dirty>(e) {
            continue;
        }
        world.insert(e, Dirty);
        stack.extend(children_of(world, e));
    }
    Ok(entity)
}

/// Clear the dirty marker of `entity` only.
pub fn mark_as_clean(world: &mut World, entity: Entity) -> SceneResult<Entity> {
    ensure_alive(world, entity)?;
    world.remove::<Dirty>(entity);
    Ok(entity)
}

/// Clear the dirty marker of `entity` and of its whole subtree.
pub fn mark_as_clean_recurse(world: &mut World, entity: Entity) -> SceneResult<Entity> {
    ensure_alive(world, entity)?;
    let mut stack = vec![entity];
    while let Some(e) = stack.pop() {
        world.remove::<Dirty>(e);
        stack.extend(children_of(world, e));
    }
    Ok(entity)
}

pub fn is_dirty(world: &World, entity: Entity) -> bool {
    world.has::<Dirty>(entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(world: &mut World) -> Entity {
        let e = world.spawn_empty();
        attach_scene_tree_components(world, e).unwrap();
        e
    }

    fn clean_all(world: &mut World) {
        for e in world.entities_with::<Dirty>() {
            mark_as_clean(world, e).unwrap();
        }
    }

    #[test]
    fn attaching_makes_a_dirty_root() {
        let mut world = World::new();
        let e = node(&mut world);
        assert!(is_dirty(&world, e));
        assert_eq!(parent_of(&world, e), None);
        assert!(children_of(&world, e).is_empty());
        assert!(is_in_tree(&world, e));
    }

    #[test]
    fn attaching_twice_fails() {
        let mut world = World::new();
        let e = node(&mut world);
        assert_eq!(
            attach_scene_tree_components(&mut world, e),
            Err(SceneError::AlreadyInTree(e))
        );
    }

    #[test]
    fn attach_then_detach_child_restores_root() {
        let mut world = World::new();
        let p = node(&mut world);
        let c = node(&mut world);
        attach_child(&mut world, p, c).unwrap();
        assert_eq!(parent_of(&world, c), Some(p));
        assert_eq!(children_of(&world, p), vec![c]);

        clean_all(&mut world);
        detach_child(&mut world, p, c).unwrap();
        assert_eq!(parent_of(&world, c), None);
        assert!(children_of(&world, p).is_empty());
        assert!(is_dirty(&world, c));
        assert!(!is_dirty(&world, p));
    }

    #[test]
    fn reparenting_keeps_a_forest() {
        let mut world = World::new();
        let p1 = node(&mut world);
        let p2 = node(&mut world);
        let c = node(&mut world);
        attach_child(&mut world, p1, c).unwrap();
        attach_child(&mut world, p2, c).unwrap();

        assert!(!children_of(&world, p1).contains(&c));
        assert_eq!(children_of(&world, p2), vec![c]);
        assert_eq!(parent_of(&world, c), Some(p2));
    }

    #[test]
    fn attaching_same_child_twice_lists_it_once() {
        let mut world = World::new();
        let p = node(&mut world);
        let c = node(&mut world);
        attach_child(&mut world, p, c).unwrap();
        attach_parent(&mut world, c, p).unwrap();
        assert_eq!(children_of(&world, p), vec![c]);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut world = World::new();
        let a = node(&mut world);
        let b = node(&mut world);
        let c = node(&mut world);
        attach_child(&mut world, a, b).unwrap();
        attach_child(&mut world, b, c).unwrap();

        assert_eq!(
            attach_child(&mut world, c, a),
            Err(SceneError::WouldCycle { parent: c, child: a })
        );
        assert_eq!(
            attach_child(&mut world, a, a),
            Err(SceneError::WouldCycle { parent: a, child: a })
        );
        assert_eq!(parent_of(&world, a), None);
    }

    #[test]
    fn detaching_a_non_child_fails() {
        let mut world = World::new();
        let p = node(&mut world);
        let stranger = node(&mut world);
        assert_eq!(
            detach_parent(&mut world, stranger, p),
            Err(SceneError::NotAChild { parent: p, child: stranger })
        );
    }

    #[test]
    fn linking_requires_tree_components() {
        let mut world = World::new();
        let p = node(&mut world);
        let loose = world.spawn_empty();
        assert_eq!(
            attach_child(&mut world, p, loose),
            Err(SceneError::missing::<Parent>(loose))
        );
        assert_eq!(
            attach_child(&mut world, loose, p),
            Err(SceneError::missing::<Children>(loose))
        );
    }

    #[test]
    fn dirty_spreads_down_and_clean_does_not() {
        let mut world = World::new();
        let p = node(&mut world);
        let a = node(&mut world);
        let b = node(&mut world);
        attach_child(&mut world, p, a).unwrap();
        attach_child(&mut world, p, b).unwrap();
        clean_all(&mut world);

        mark_as_dirty(&mut world, p).unwrap();
        assert!(is_dirty(&world, p) && is_dirty(&world, a) && is_dirty(&world, b));

        mark_as_clean(&mut world, p).unwrap();
        assert!(!is_dirty(&world, p));
        assert!(is_dirty(&world, a) && is_dirty(&world, b));

        mark_as_clean_recurse(&mut world, p).unwrap();
        assert!(!is_dirty(&world, a) && !is_dirty(&world, b));
    }

    #[test]
    fn marking_outside_the_tree_fails() {
        let mut world = World::new();
        let loose = world.spawn_empty();
        assert_eq!(mark_as_dirty(&mut world, loose), Err(SceneError::NotInTree(loose)));
    }

    #[test]
    fn detach_components_orphans_children() {
        let mut world = World::new();
        let root = node(&mut world);
        let mid = node(&mut world);
        let leaf = node(&mut world);
        attach_child(&mut world, root, mid).unwrap();
        attach_child(&mut world, mid, leaf).unwrap();
        clean_all(&mut world);
        mark_as_dirty(&mut world, mid).unwrap();

        detach_scene_tree_components(&mut world, mid).unwrap();

        assert!(!is_in_tree(&world, mid));
        assert!(!is_dirty(&world, mid));
        assert!(children_of(&world, root).is_empty());
        assert_eq!(parent_of(&world, leaf), None);
        assert!(is_dirty(&world, leaf));
        assert!(world.is_alive(mid));
    }

    #[test]
    fn descendants_are_parent_first() {
        let mut world = World::new();
        let root = node(&mut world);
        let a = node(&mut world);
        let b = node(&mut world);
        let a1 = node(&mut world);
        attach_child(&mut world, root, a).unwrap();
        attach_child(&mut world, root, b).unwrap();
        attach_child(&mut world, a, a1).unwrap();

        let order = descendants(&world, root);
        assert_eq!(order.len(), 3);
        let pos = |e| order.iter().position(|&x| x == e).unwrap();
        assert!(pos(a) < pos(a1));
        assert!(is_ancestor_of(&world, root, a1));
        assert!(!is_ancestor_of(&world, b, a1));
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut world = World::new();
        let e = node(&mut world);
        world.despawn(e);
        assert_eq!(mark_as_dirty(&mut world, e), Err(SceneError::StaleEntity(e)));
        assert_eq!(mark_as_clean(&mut world, e), Err(SceneError::StaleEntity(e)));
    }
}

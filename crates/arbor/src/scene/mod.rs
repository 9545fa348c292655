//! # Scene Graph
//!
//! - [`layout`]: local/global transforms, anchors and the layout routine
//! - [`tree`]: parent/child links and dirty propagation
//! - [`resolve`]: the bounded pass that recomputes dirty transforms
//! - [`unmount`]: deferred, bottom-up destruction of subtrees
//! - [`movement`]: the only sanctioned way to move things
//! - [`tree_like`]: tree membership for prefab wrappers
//! - [`draw_order`]: render-facing ordering

pub mod draw_order;
pub mod layout;
pub mod movement;
pub mod resolve;
pub mod tree;
pub mod tree_like;
pub mod unmount;

pub use draw_order::{RenderLayer, sorted_for_draw};
pub use layout::{
    Anchor, GlobalTransform, HasLayout, Layout, LayoutBuilder, LayoutType, LocalTransform,
    attach_layout_components, calculate_layout,
};
pub use movement::{Flip, Velocity};
pub use resolve::{ResolveOutcome, ResolveReport, Resolver, resolve_transforms};
pub use tree::{Children, Dirty, Node, Parent, Unmount};
pub use tree_like::{SceneHandle, TreeLike, UnmountMode};
pub use unmount::{drain_unmount_queue, queue_unmount, unmount, unmount_all};

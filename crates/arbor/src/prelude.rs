//! Common imports.
//!
//! ```ignore
//! use arbor::prelude::*;
//! ```

pub use crate::config::{AnchorMode, ConfigError, SceneConfig};
pub use crate::ecs::{Entity, Schedule, System, World};
pub use crate::error::{SceneError, SceneResult};
pub use crate::game::{FrameReport, Game, Plugin};
pub use crate::logging::init_logger;
pub use crate::math::Vec2;
pub use crate::prefab::{Root, spawn_node};
pub use crate::scene::movement::{self, Flip, Velocity};
pub use crate::scene::tree::{self, Children, Dirty, Node, Parent, Unmount};
pub use crate::scene::{
    Anchor, GlobalTransform, HasLayout, Layout, LayoutBuilder, LayoutType, LocalTransform,
    RenderLayer, ResolveOutcome, ResolveReport, Resolver, SceneHandle, TreeLike, UnmountMode,
    queue_unmount, resolve_transforms, sorted_for_draw,
};
pub use crate::script::Script;
pub use crate::time::Time;

//! Error types for scene-tree operations.
//!
//! Every variant is a caller bug: the scene graph refuses the operation and
//! leaves its state untouched instead of guessing what was meant.

use thiserror::Error;

use crate::ecs::Entity;
use crate::math::Vec2;

/// A structural precondition of the scene tree was violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("entity {0} is already part of the scene tree")]
    AlreadyInTree(Entity),

    #[error("entity {0} is not part of the scene tree")]
    NotInTree(Entity),

    #[error("entity {entity} is missing required component `{component}`")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },

    #[error("entity handle {0} is stale")]
    StaleEntity(Entity),

    #[error("entity {child} is not a child of {parent}")]
    NotAChild { parent: Entity, child: Entity },

    #[error("attaching {child} under {parent} would create a cycle")]
    WouldCycle { parent: Entity, child: Entity },

    #[error("entity {0} already has layout components")]
    LayoutAlreadyAttached(Entity),

    #[error("bounds are inverted: min {min} exceeds max {max}")]
    InvalidBounds { min: Vec2, max: Vec2 },
}

impl SceneError {
    pub(crate) fn missing<T>(entity: Entity) -> Self {
        let full = std::any::type_name::<T>();
        Self::MissingComponent {
            entity,
            component: full.rsplit("::").next().unwrap_or(full),
        }
    }
}

/// Shorthand used throughout the scene modules.
pub type SceneResult<T> = Result<T, SceneError>;

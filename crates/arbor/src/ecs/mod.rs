//! # Entity Store
//!
//! A small sparse-set ECS sized for a 2D scene runtime.
//!
//! - [`entity`]: generational handles and the slot allocator
//! - [`component`]: one sparse set per component type
//! - [`world`]: entities, components and singleton resources
//! - [`query`]: closure iteration over component tuples
//! - [`system`]: `FnMut(&mut World)` systems and ordered schedules

pub(crate) mod component;
pub mod entity;
pub mod query;
pub mod system;
pub mod world;

pub use entity::Entity;
pub use query::QueryParam;
pub use system::{Schedule, System};
pub use world::{Bundle, World};

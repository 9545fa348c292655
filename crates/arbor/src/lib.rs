//! # Arbor — 2D Scene-Graph Runtime
//!
//! A small sparse-set ECS with a scene tree on top: parent/child links,
//! anchor-based layout, dirty propagation, a bounded transform resolver and
//! deferred, bottom-up destruction.
//!
//! Start with `use arbor::prelude::*` and drive frames through
//! [`Game`](game::Game).

pub mod config;
pub mod ecs;
pub mod error;
pub mod game;
pub mod logging;
pub mod math;
pub mod prefab;
pub mod prelude;
pub mod scene;
pub mod script;
pub mod time;

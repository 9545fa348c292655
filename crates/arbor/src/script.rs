//! Per-entity behaviour.
//!
//! A [`Script`] is a pair of optional callbacks stored on an entity. Both get
//! full world access, so a script can move its entity, spawn bullets, or
//! queue itself for unmount.
//!
//! ```ignore
//! world.insert(bullet, Script::new().on_update(|world, me, dt| {
//!     movement::move_by(world, me, Vec2::new(0.0, -400.0 * dt))
//! }));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::ecs::{Entity, World};
use crate::error::SceneResult;

type StartFn = Arc<dyn Fn(&mut World, Entity) -> SceneResult<()> + Send + Sync>;
type UpdateFn = Arc<dyn Fn(&mut World, Entity, f32) -> SceneResult<()> + Send + Sync>;

#[derive(Clone, Default)]
pub struct Script {
    on_start: Option<StartFn>,
    on_update: Option<UpdateFn>,
    started: bool,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs once, on the first frame the script is seen.
    pub fn on_start(
        mut self,
        f: impl Fn(&mut World, Entity) -> SceneResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_start = Some(Arc::new(f));
        self
    }

    /// Runs every frame with the scaled delta in seconds.
    pub fn on_update(
        mut self,
        f: impl Fn(&mut World, Entity, f32) -> SceneResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_update = Some(Arc::new(f));
        self
    }

    pub fn has_started(&self) -> bool {
        self.started
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script")
            .field("on_start", &self.on_start.is_some())
            .field("on_update", &self.on_update.is_some())
            .field("started", &self.started)
            .finish()
    }
}

/// Invoke every script once. Returns how many entities ran.
///
/// Callbacks are cloned out of storage before they run, so a callback may
/// freely mutate the world, including destroying its own or another
/// scripted entity; destroyed entities are skipped.
pub fn run_scripts(world: &mut World, dt: f32) -> SceneResult<usize> {
    let mut ran = 0;
    for entity in world.entities_with::<Script>() {
        let Some(script) = world.get_mut::<Script>(entity) else {
            continue;
        };
        let start = if script.started {
            None
        } else {
            script.started = true;
            script.on_start.clone()
        };
        let update = script.on_update.clone();

        if let Some(f) = start {
            f(world, entity)?;
        }
        if !world.is_alive(entity) {
            continue;
        }
        if let Some(f) = update {
            f(world, entity, dt)?;
        }
        ran += 1;
    }
    Ok(ran)
}

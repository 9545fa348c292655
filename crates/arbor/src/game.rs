//! # Frame Pipeline
//!
//! [`Game`] owns the world and runs one frame per [`step`](Game::step):
//!
//! ```text
//! advance Time
//! run_scripts           scripts mutate locals, queue unmounts
//! integrate_velocity
//! logic schedule        gameplay systems
//! resolve               every GlobalTransform is now current
//! post_resolve schedule collision, tweening, audio
//! resolve (if needed)   post_resolve moved something
//! render schedule       reads GlobalTransform + RenderLayer
//! drain unmount queue   the only point where scene entities die
//! ```
//!
//! Each phase owns write access to its own components, so nothing in a frame
//! ever observes a half-destroyed subtree or a stale transform.
//!
//! ```ignore
//! let mut game = Game::new()
//!     .setup(spawn_level)
//!     .logic(fire_bullets)
//!     .post_resolve(collide)
//!     .render(draw);
//! game.run_frames(60, Duration::from_millis(16))?;
//! ```

use std::time::Duration;

use crate::config::SceneConfig;
use crate::ecs::{Schedule, System, World};
use crate::error::SceneResult;
use crate::scene::movement::integrate_velocity;
use crate::scene::resolve::{ResolveReport, resolve_transforms};
use crate::scene::tree::Dirty;
use crate::scene::unmount::{drain_unmount_queue, unmount_all};
use crate::script::run_scripts;
use crate::time::Time;

/// Bundles resources and systems that belong together.
pub trait Plugin {
    fn build(&self, game: &mut Game);
}

/// What happened during one [`Game::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub delta_secs: f32,
    pub resolve: ResolveReport,
    /// Second pass, present only when `post_resolve` dirtied something.
    pub late_resolve: Option<ResolveReport>,
    /// Entities destroyed by the unmount drain.
    pub destroyed: usize,
}

pub struct Game {
    world: World,
    startup: Schedule,
    logic: Schedule,
    post_resolve: Schedule,
    render: Schedule,
    started: bool,
}

impl Game {
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// An invalid config is logged and used anyway: the resolver clamps its
    /// iteration cap to 1 and [`Time`] pauses on a bad scale.
    pub fn with_config(config: SceneConfig) -> Self {
        if let Err(err) = config.validate() {
            log::warn!("scene config: {err}");
        }
        let mut world = World::new();
        world.insert_resource(Time::new(config.time_scale));
        world.insert_resource(config);
        Self {
            world,
            startup: Schedule::new("startup"),
            logic: Schedule::new("logic"),
            post_resolve: Schedule::new("post_resolve"),
            render: Schedule::new("render"),
            started: false,
        }
    }

    pub fn resource<T: 'static + Send + Sync>(mut self, value: T) -> Self {
        self.world.insert_resource(value);
        self
    }

    /// Runs once, before the first frame.
    pub fn setup<S: System + 'static>(mut self, system: S) -> Self {
        self.startup.add_system(system);
        self
    }

    pub fn logic<S: System + 'static>(mut self, system: S) -> Self {
        self.logic.add_system(system);
        self
    }

    pub fn post_resolve<S: System + 'static>(mut self, system: S) -> Self {
        self.post_resolve.add_system(system);
        self
    }

    pub fn render<S: System + 'static>(mut self, system: S) -> Self {
        self.render.add_system(system);
        self
    }

    pub fn plugin(mut self, plugin: impl Plugin) -> Self {
        plugin.build(&mut self);
        self
    }

    // Non-consuming variants, for plugins.

    pub fn insert_resource<T: 'static + Send + Sync>(&mut self, value: T) {
        self.world.insert_resource(value);
    }

    pub fn add_startup_system<S: System + 'static>(&mut self, system: S) {
        self.startup.add_system(system);
    }

    pub fn add_logic_system<S: System + 'static>(&mut self, system: S) {
        self.logic.add_system(system);
    }

    pub fn add_post_resolve_system<S: System + 'static>(&mut self, system: S) {
        self.post_resolve.add_system(system);
    }

    pub fn add_render_system<S: System + 'static>(&mut self, system: S) {
        self.render.add_system(system);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Run one frame that lasted `raw_delta` on the host clock.
    pub fn step(&mut self, raw_delta: Duration) -> SceneResult<FrameReport> {
        if !self.started {
            log::debug!("running {} startup systems", self.startup.len());
            self.startup.run(&mut self.world);
            self.started = true;
        }

        if !self.world.has_resource::<Time>() {
            self.world.insert_resource(Time::default());
        }
        let time = self.world.resource_mut::<Time>();
        time.advance(raw_delta);
        let (frame, dt) = (time.frame_count(), time.delta_secs());

        run_scripts(&mut self.world, dt)?;
        integrate_velocity(&mut self.world, dt)?;
        self.logic.run(&mut self.world);

        let resolve = resolve_transforms(&mut self.world);
        self.post_resolve.run(&mut self.world);
        let late_resolve =
            (self.world.count::<Dirty>() > 0).then(|| resolve_transforms(&mut self.world));

        self.render.run(&mut self.world);
        let destroyed = drain_unmount_queue(&mut self.world)?;

        log::trace!("frame {frame} done: {} resolved, {destroyed} destroyed", resolve.resolved);
        Ok(FrameReport {
            frame,
            delta_secs: dt,
            resolve,
            late_resolve,
            destroyed,
        })
    }

    pub fn run_frames(&mut self, frames: usize, raw_delta: Duration) -> SceneResult<Vec<FrameReport>> {
        (0..frames).map(|_| self.step(raw_delta)).collect()
    }

    /// Destroy every scene tree. Returns how many entities were destroyed.
    pub fn shutdown(&mut self) -> SceneResult<usize> {
        let destroyed = unmount_all(&mut self.world)?;
        log::info!("shutdown: destroyed {destroyed} scene entities");
        Ok(destroyed)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

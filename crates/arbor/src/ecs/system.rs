//! # Systems and Schedules
//!
//! A system is any `FnMut(&mut World)`. A [`Schedule`] runs its systems in
//! insertion order, once per call to [`Schedule::run`]. The frame pipeline in
//! [`Game`](crate::game::Game) owns one schedule per frame phase; there is no
//! dependency graph and no parallelism, since every phase owns write access to
//! a disjoint set of components.

use super::world::World;

/// Something that can be run against a [`World`].
pub trait System {
    fn run(&mut self, world: &mut World);
}

impl<F: FnMut(&mut World)> System for F {
    fn run(&mut self, world: &mut World) {
        (self)(world);
    }
}

struct NamedSystem {
    name: String,
    system: Box<dyn System>,
}

/// An ordered list of systems.
pub struct Schedule {
    label: &'static str,
    systems: Vec<NamedSystem>,
}

impl Schedule {
    /// Create an empty schedule. `label` only shows up in log output.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            systems: Vec::new(),
        }
    }

    /// Append a system; it runs after everything already added.
    pub fn add_system<S: System + 'static>(&mut self, system: S) -> &mut Self {
        self.systems.push(NamedSystem {
            name: short_system_name(std::any::type_name::<S>()),
            system: Box::new(system),
        });
        self
    }

    pub fn run(&mut self, world: &mut World) {
        for ns in &mut self.systems {
            log::trace!("[{}] running {}", self.label, ns.name);
            ns.system.run(world);
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Short names of the systems, in run order.
    pub fn system_names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|ns| ns.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new("schedule")
    }
}

/// `shmup::bullet_system` → `bullet_system`, closures → `<closure>`.
fn short_system_name(full: &str) -> String {
    let name = full.rsplit("::").next().unwrap_or(full);
    if name.contains("closure") {
        "<closure>".to_string()
    } else {
        name.to_string()
    }
}

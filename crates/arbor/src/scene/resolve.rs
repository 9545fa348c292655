//! # Transform Resolution
//!
//! Drains the dirty set once per pass, parent before child:
//!
//! ```text
//! iteration 1: dirty {root, a, a1}   ready {root}    → resolve root
//!              (a sees root clean now)   ready {a}   → resolve a
//!              (a1 sees a clean now)     ready {a1}  → resolve a1
//! ```
//!
//! Readiness is checked against the live dirty state, so a chain usually
//! settles in a single iteration; otherwise the scan repeats. The loop is
//! bounded. On overflow every remaining dirty marker is cleared and the pass
//! reports [`ResolveOutcome::IterationLimit`], so a broken scene renders with
//! best-effort transforms instead of hanging the frame.

use crate::config::{AnchorMode, DEFAULT_MAX_RESOLVE_ITERATIONS, SceneConfig};
use crate::ecs::{Entity, World};

use super::layout::{HasLayout, calculate_layout};
use super::tree::{Children, Dirty, Node, Parent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Every dirty entity was resolved.
    Settled,
    /// The iteration bound was hit; leftovers were force-cleaned.
    IterationLimit,
    /// The loop ended with dirty markers outside the tree; they were
    /// force-cleaned.
    Leftover,
}

/// Summary of one resolver pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveReport {
    pub iterations: usize,
    pub resolved: usize,
    pub force_cleaned: usize,
    pub outcome: ResolveOutcome,
}

impl ResolveReport {
    pub fn is_settled(&self) -> bool {
        self.outcome == ResolveOutcome::Settled
    }
}

type ResolvedHook = Box<dyn FnMut(&mut World, Entity)>;

/// Resolves dirty `GlobalTransform`s.
pub struct Resolver {
    max_iterations: usize,
    anchor_mode: AnchorMode,
    on_resolved: Option<ResolvedHook>,
}

impl Resolver {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
            anchor_mode: AnchorMode::default(),
            on_resolved: None,
        }
    }

    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(config.max_resolve_iterations).with_anchor_mode(config.anchor_mode)
    }

    pub fn with_anchor_mode(mut self, mode: AnchorMode) -> Self {
        self.anchor_mode = mode;
        self
    }

    /// Run `hook` right after each entity is resolved and cleaned.
    pub fn with_on_resolved(mut self, hook: impl FnMut(&mut World, Entity) + 'static) -> Self {
        self.on_resolved = Some(Box::new(hook));
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn run(&mut self, world: &mut World) -> ResolveReport {
        let mut iterations = 0;
        let mut resolved = 0;

        while world.count::<Dirty>() > 0 {
            if iterations == self.max_iterations {
                let force_cleaned = force_clean(world);
                log::error!(
                    "transform resolution exceeded {} iterations; force-cleaned {} dirty entities",
                    self.max_iterations,
                    force_cleaned
                );
                return ResolveReport {
                    iterations,
                    resolved,
                    force_cleaned,
                    outcome: ResolveOutcome::IterationLimit,
                };
            }
            iterations += 1;

            let mut pending = Vec::new();
            world.query_filtered::<(&Node, &Parent, &Children), Dirty>(|entity, (_, parent, _)| {
                pending.push((entity, parent.get()));
            });
            if pending.is_empty() {
                break;
            }

            for (entity, parent) in pending {
                if !world.has::<Dirty>(entity) {
                    continue;
                }
                let ready = parent.is_none_or(|p| !is_dirty_node(world, p));
                if !ready {
                    continue;
                }

                if world.has::<HasLayout>(entity) {
                    if let Err(err) = calculate_layout(world, entity, self.anchor_mode) {
                        log::error!("layout of {entity} failed: {err}");
                    }
                }
                world.remove::<Dirty>(entity);
                resolved += 1;

                if let Some(hook) = self.on_resolved.as_mut() {
                    hook(world, entity);
                }
            }
        }

        let mut report = ResolveReport {
            iterations,
            resolved,
            force_cleaned: 0,
            outcome: ResolveOutcome::Settled,
        };
        if world.count::<Dirty>() > 0 {
            report.force_cleaned = force_clean(world);
            report.outcome = ResolveOutcome::Leftover;
            log::error!(
                "{} entities still dirty after resolution; force-cleaned",
                report.force_cleaned
            );
        }
        log::trace!("resolved {resolved} entities in {iterations} iterations");
        report
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESOLVE_ITERATIONS)
    }
}

fn is_dirty_node(world: &World, entity: Entity) -> bool {
    world.has::<Dirty>(entity) && world.has::<Node>(entity)
}

fn force_clean(world: &mut World) -> usize {
    let dirty = world.entities_with::<Dirty>();
    for &entity in &dirty {
        world.remove::<Dirty>(entity);
    }
    dirty.len()
}

/// Resolve all dirty transforms using the world's [`SceneConfig`], or the
/// defaults when none is installed.
pub fn resolve_transforms(world: &mut World) -> ResolveReport {
    let mut resolver = match world.get_resource::<SceneConfig>() {
        Some(config) => Resolver::from_config(config),
        None => Resolver::default(),
    };
    resolver.run(world)
}

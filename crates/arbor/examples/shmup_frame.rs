//! Headless shmup frame loop.
//!
//! A player ship bobs along the bottom of the screen firing bullets upward.
//! Bullets fly under velocity integration and queue themselves for unmount
//! once they leave the viewport; the unmount queue destroys them after the
//! frame's render pass. Nothing is drawn: the render schedule logs the draw
//! list instead.
//!
//! Run with: `RUST_LOG=debug cargo run -p arbor --example shmup_frame`

use std::time::Duration;

use arbor::prelude::*;

const VIEWPORT: Vec2 = Vec2::new(480.0, 640.0);
const BULLET_SPEED: f32 = 900.0;
const FIRE_INTERVAL: f32 = 0.1;

// ── Resources ────────────────────────────────────────────────────────────

struct Level {
    root: Root,
    player: Entity,
}

struct Gun {
    cooldown: f32,
    fired: u32,
}

// ── Markers ──────────────────────────────────────────────────────────────

struct Bullet;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();

    let mut game = Game::with_config(SceneConfig::from_json_str(
        r#"{ "anchor_mode": "origin", "time_scale": 1.0 }"#,
    )?)
    .resource(Gun {
        cooldown: 0.0,
        fired: 0,
    })
    .setup(setup)
    .logic(fire)
    .post_resolve(cull_bullets)
    .render(draw);

    let reports = game.run_frames(60, Duration::from_millis(16))?;
    let destroyed: usize = reports.iter().map(|r| r.destroyed).sum();
    let late = reports.iter().filter(|r| r.late_resolve.is_some()).count();

    let world = game.world();
    log::info!(
        "{} frames, {} bullets fired, {} destroyed, {} still flying, {} late resolves",
        reports.len(),
        world.resource::<Gun>().fired,
        destroyed,
        world.count::<Bullet>(),
        late
    );

    let mut level = game.world_mut().resource_remove::<Level>().ok_or("level missing")?;
    level.root.unmount(game.world_mut(), UnmountMode::Immediate)?;
    log::info!("entities left after teardown: {}", game.world().entity_count());
    Ok(())
}

fn setup(world: &mut World) {
    if let Err(err) = build_level(world) {
        log::error!("level setup failed: {err}");
    }
}

fn build_level(world: &mut World) -> SceneResult<()> {
    let root = Root::create(world, VIEWPORT)?;

    let player = spawn_node(
        world,
        LayoutBuilder::new()
            .size(Vec2::new(32.0, 32.0))
            .local_position(Vec2::new(VIEWPORT.x / 2.0, VIEWPORT.y - 48.0))
            .anchor(Anchor::MIDDLE_CENTER),
    )?;
    world.insert(player, RenderLayer::new(1, 0));
    world.insert(
        player,
        Script::new()
            .on_start(|_, me| {
                log::info!("player {me} ready");
                Ok(())
            })
            .on_update(|world, me, _| {
                let frame = world.resource::<Time>().frame_count() as f32;
                movement::set_position(
                    world,
                    me,
                    Vec2::new(
                        VIEWPORT.x / 2.0 + (frame * 0.1).sin() * 120.0,
                        VIEWPORT.y - 48.0,
                    ),
                )
            }),
    );
    root.mount_child(world, player)?;

    world.insert_resource(Level { root, player });
    Ok(())
}

fn spawn_bullet(world: &mut World, at: Vec2) -> SceneResult<Entity> {
    let bullet = spawn_node(
        world,
        LayoutBuilder::new()
            .size(Vec2::new(4.0, 12.0))
            .local_position(at)
            .anchor(Anchor::MIDDLE_CENTER)
            .layout_type(LayoutType::Absolute),
    )?;
    world.insert(bullet, Bullet);
    world.insert(bullet, RenderLayer::new(0, 0));
    world.insert(bullet, Velocity::new(Vec2::new(0.0, -BULLET_SPEED)));
    Ok(bullet)
}

/// Fire from the player's resolved position every `FIRE_INTERVAL` seconds.
fn fire(world: &mut World) {
    let dt = world.resource::<Time>().delta_secs();
    let gun = world.resource_mut::<Gun>();
    gun.cooldown -= dt;
    if gun.cooldown > 0.0 {
        return;
    }
    gun.cooldown += FIRE_INTERVAL;
    gun.fired += 1;

    let Some((root, player)) = world
        .get_resource::<Level>()
        .map(|level| (level.root.entity(), level.player))
    else {
        return;
    };
    let Some(muzzle) = world.get::<GlobalTransform>(player).map(|g| g.position()) else {
        return;
    };
    let mounted = spawn_bullet(world, muzzle).and_then(|b| tree::attach_child(world, root, b));
    if let Err(err) = mounted {
        log::error!("could not fire: {err}");
    }
}

/// Bullets that left the viewport are queued; they still render this frame.
fn cull_bullets(world: &mut World) {
    let mut gone = Vec::new();
    world.query_filtered::<(&GlobalTransform,), Bullet>(|entity, (global,)| {
        if movement::is_out_of_bounds(global.position(), Vec2::ZERO, VIEWPORT).unwrap_or(true) {
            gone.push(entity);
        }
    });
    for bullet in gone {
        if let Err(err) = queue_unmount(world, bullet) {
            log::error!("could not queue {bullet}: {err}");
        }
    }
}

fn draw(world: &mut World) {
    let frame = world.resource::<Time>().frame_count();
    let list = sorted_for_draw(world);
    if frame % 15 == 0 {
        for (entity, global) in &list {
            log::debug!(
                "frame {frame}: draw {entity} at ({:.1}, {:.1})",
                global.position().x,
                global.position().y
            );
        }
    }
}

/// The step function: advances the world by one frame.
///
/// Processing order:
///   1. Transition scroll (only while transitioning; skips 2–3)
///   2. Enemy drift (frozen while the player is down)
///   3. Player: respawn, or gem pickup then enemy contact
///   4. Key: reveal, or pickup → start transition
///
/// `now` is the wall-clock instant of the frame, `dt` the seconds since
/// the previous one. Both come from the loop driver.

use std::time::Instant;

use tracing::debug;

use super::event::GameEvent;
use super::level;
use super::world::WorldState;

pub fn step(world: &mut WorldState, now: Instant, dt: f32) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();

    if world.is_transitioning() {
        level::advance_transition(world, dt, &mut events);
    } else {
        resolve_enemies(world, dt);
        resolve_player(world, now, &mut events);
    }
    level::resolve_key(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

fn resolve_enemies(world: &mut WorldState, dt: f32) {
    if world.player.is_dead() { return; }
    let level = world.level.current;
    for enemy in world.enemies.iter_mut() {
        enemy.update(dt, level, &world.grid, &mut world.rng);
    }
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(world: &mut WorldState, now: Instant, events: &mut Vec<GameEvent>) {
    let out = world.player.update(now, &mut world.gems, &world.enemies, &world.grid);

    for &(col, row) in &out.picked {
        debug!(col, row, total = world.player.gems, "gem collected");
        events.push(GameEvent::GemCollected { col, row });
    }
    if out.hit {
        let (col, row) = (world.player.col(), world.player.row());
        debug!(col, row, lives = world.player.lives, "player hit");
        events.push(GameEvent::PlayerHit { col, row });
    }
    if out.respawned {
        debug!(lives = world.player.lives, "player respawned");
        events.push(GameEvent::PlayerRespawned { lives: world.player.lives });
    }
}

/// Level generation and the between-levels scroll transition.
///
/// Generation is fixed: one enemy and one gem on each of the lanes
/// `FIRST_LANE..FIRST_LANE + LANES`, at random columns.
///
/// Transition timeline (one terrain row per step):
///   1. key taken      → enemies cleared, level + 1, key hidden
///   2. scroll < offsetY → scroll += SCROLL_SPEED × dt
///   3. scroll reached → scroll = 0, row + 1, rotate terrain
///   4. row == num_rows → new enemies + gems, player to row num_rows − 2

use rand::Rng;
use tracing::{debug, info};

use crate::domain::entity::{Enemy, Entity};
use crate::domain::rules::{self, FIRST_LANE, LANES};
use crate::domain::tile::Sprite;
use super::event::GameEvent;
use super::world::{LevelPhase, WorldState};

/// Spawn the enemies and gems of the current level, replacing any left over.
pub fn populate(world: &mut WorldState) {
    let spawn_cols = 0..world.grid.last_col();
    let rng = &mut world.rng;

    world.enemies = (FIRST_LANE..FIRST_LANE + LANES)
        .map(|row| Enemy::new(rng.gen_range(spawn_cols.clone()) as f32, row))
        .collect();

    world.gems = (FIRST_LANE..FIRST_LANE + LANES)
        .map(|row| {
            let sprite = Sprite::GEMS[rng.gen_range(0..Sprite::GEMS.len())];
            let col = rng.gen_range(spawn_cols.clone());
            Entity::new(sprite, col as f32, row as f32, true)
        })
        .collect();
}

/// Key handling after entity updates.
///
/// A visible key under the player starts the transition. Otherwise the key
/// appears once the last gem is gone.
pub fn resolve_key(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.key.visible {
        if world.key.same_cell(&world.player.body) {
            start_transition(world);
            events.push(GameEvent::KeyCollected { next_level: world.level.current });
        }
    } else if !world.is_transitioning() && world.gems.is_empty() {
        world.key.visible = true;
        debug!(level = world.level.current, "key revealed");
        events.push(GameEvent::KeyRevealed);
    }
}

pub fn start_transition(world: &mut WorldState) {
    world.key.visible = false;
    world.enemies.clear();
    world.level.current += 1;
    world.level.phase = LevelPhase::Transitioning { row: 0 };
    world.level.scroll_offset = 0.0;
    info!(level = world.level.current, gems = world.player.gems, "key collected, scrolling to next level");
}

/// Advance the scroll by `dt` seconds. Returns `true` on the tick the new
/// level becomes playable.
pub fn advance_transition(world: &mut WorldState, dt: f32, events: &mut Vec<GameEvent>) -> bool {
    let row = match world.level.phase {
        LevelPhase::Transitioning { row } => row,
        LevelPhase::Playing => return false,
    };

    if world.level.scroll_offset < world.grid.offset_y {
        world.level.scroll_offset += rules::SCROLL_SPEED * dt;
        return false;
    }

    world.level.scroll_offset = 0.0;
    world.level.rotate_terrain();
    let row = row + 1;
    events.push(GameEvent::RowScrolled { row });

    if row < world.grid.num_rows {
        world.level.phase = LevelPhase::Transitioning { row };
        debug!(row, "terrain row scrolled in");
        return false;
    }

    populate(world);
    world.level.phase = LevelPhase::Playing;
    let bottom = world.grid.num_rows as i32 - 2;
    let col = world.player.col();
    world.player.set_cell(col, bottom);
    info!(level = world.level.current, "level started");
    events.push(GameEvent::LevelStarted { level: world.level.current });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn world() -> WorldState {
        WorldState::new(GridConfig::default(), StdRng::seed_from_u64(2024))
    }

    /// Run the transition to completion with a fixed frame time.
    fn finish_transition(w: &mut WorldState, dt: f32) -> (usize, Vec<GameEvent>) {
        let mut events = vec![];
        let mut ticks = 0;
        while !advance_transition(w, dt, &mut events) {
            ticks += 1;
            assert!(ticks < 10_000, "transition never finished");
        }
        (ticks + 1, events)
    }

    #[test]
    fn populate_places_one_per_lane() {
        let w = world();
        let enemy_rows: Vec<i32> = w.enemies.iter().map(|e| e.row()).collect();
        let gem_rows: Vec<i32> = w.gems.iter().map(|g| g.cell().1).collect();
        assert_eq!(enemy_rows, vec![1, 2, 3]);
        assert_eq!(gem_rows, vec![1, 2, 3]);
        for e in &w.enemies {
            assert!(e.body.x >= 0.0 && e.body.x < 7.0);
        }
        for g in &w.gems {
            assert!((0..7).contains(&g.cell().0));
            assert!(Sprite::GEMS.contains(&g.sprite));
            assert!(g.visible);
        }
    }

    #[test]
    fn key_appears_when_gems_run_out() {
        let mut w = world();
        let mut events = vec![];
        resolve_key(&mut w, &mut events);
        assert!(!w.key.visible);

        w.gems.clear();
        resolve_key(&mut w, &mut events);
        assert!(w.key.visible);
        assert_eq!(events, vec![GameEvent::KeyRevealed]);
    }

    #[test]
    fn key_stays_hidden_during_transition() {
        let mut w = world();
        w.gems.clear();
        w.level.phase = LevelPhase::Transitioning { row: 2 };
        resolve_key(&mut w, &mut vec![]);
        assert!(!w.key.visible);
    }

    #[test]
    fn taking_key_starts_transition() {
        let mut w = world();
        w.gems.clear();
        w.key.visible = true;
        w.player.set_cell(3, 0);
        let mut events = vec![];
        resolve_key(&mut w, &mut events);

        assert!(w.enemies.is_empty());
        assert_eq!(w.level.current, 2);
        assert_eq!(w.level.phase, LevelPhase::Transitioning { row: 0 });
        assert_eq!(w.level.scroll_offset, 0.0);
        assert!(!w.key.visible);
        assert_eq!(events, vec![GameEvent::KeyCollected { next_level: 2 }]);
    }

    #[test]
    fn visible_key_elsewhere_does_nothing() {
        let mut w = world();
        w.gems.clear();
        w.key.visible = true;
        w.player.set_cell(4, 0);
        resolve_key(&mut w, &mut vec![]);
        assert!(w.key.visible);
        assert_eq!(w.level.current, 1);
    }

    #[test]
    fn scroll_accumulates_at_fixed_speed() {
        let mut w = world();
        start_transition(&mut w);
        let mut events = vec![];
        advance_transition(&mut w, 0.1, &mut events);
        assert!((w.level.scroll_offset - 15.0).abs() < 1e-4);
        assert!(events.is_empty());
    }

    #[test]
    fn each_row_resets_scroll_and_rotates() {
        let mut w = world();
        start_transition(&mut w);
        w.level.scroll_offset = 83.0;
        let before = w.level.row_terrain.clone();
        let mut events = vec![];
        assert!(!advance_transition(&mut w, 0.016, &mut events));
        assert_eq!(w.level.phase, LevelPhase::Transitioning { row: 1 });
        assert_eq!(w.level.scroll_offset, 0.0);
        assert_eq!(w.level.row_terrain.front(), before.back());
        assert_eq!(events, vec![GameEvent::RowScrolled { row: 1 }]);
    }

    #[test]
    fn completed_transition_regenerates_level() {
        let mut w = world();
        w.gems.clear();
        w.key.visible = true;
        w.player.set_cell(3, 0);
        let terrain_before = w.level.row_terrain.clone();
        resolve_key(&mut w, &mut vec![]);

        let (_, events) = finish_transition(&mut w, 0.05);

        assert_eq!(w.level.phase, LevelPhase::Playing);
        assert_eq!(w.level.current, 2);
        assert_eq!(w.enemies.len(), 3);
        assert_eq!(w.gems.len(), 3);
        assert_eq!((w.player.col(), w.player.row()), (3, 4));
        assert_eq!(w.level.scroll_offset, 0.0);
        // one rotation per row: a full cycle
        assert_eq!(w.level.row_terrain, terrain_before);
        let rows: Vec<usize> = events.iter().filter_map(|e| match e {
            GameEvent::RowScrolled { row } => Some(*row),
            _ => None,
        }).collect();
        assert_eq!(rows, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(events.last(), Some(&GameEvent::LevelStarted { level: 2 }));
    }

    #[test]
    fn transition_length_depends_on_frame_time_only_through_scroll() {
        // At 0.1 s per tick each row needs 6 scroll ticks (15 px each, 90 ≥ 83)
        // plus the tick that resets the row.
        let mut w = world();
        start_transition(&mut w);
        let (ticks, _) = finish_transition(&mut w, 0.1);
        assert_eq!(ticks, 6 * 7);
    }

    #[test]
    fn advance_is_noop_while_playing() {
        let mut w = world();
        let mut events = vec![];
        assert!(!advance_transition(&mut w, 1.0, &mut events));
        assert_eq!(w.level.scroll_offset, 0.0);
        assert!(events.is_empty());
    }
}

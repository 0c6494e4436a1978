/// WorldState: the complete snapshot of a running board.
///
/// ## Ownership
///
/// Every entity is owned by exactly one field:
///   - `enemies` / `gems`: rebuilt by `level::populate` at level start.
///   - `player` / `key`  : created once per session, mutated in place.
///
/// ## Level phases
///
///   Playing ──(key taken)──▶ Transitioning { row: 0 }
///   Transitioning { row: num_rows } ──▶ Playing
///
/// `scroll_offset` is the pixel offset the board is drawn at while the
/// terrain scrolls in from the bottom. It stays 0 while Playing.

use std::collections::VecDeque;

use rand::rngs::StdRng;

use crate::config::GridConfig;
use crate::domain::entity::{Enemy, Entity, Player};
use crate::domain::tile::{Sprite, Terrain};
use super::level;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LevelPhase {
    Playing,
    /// `row` counts the terrain rows scrolled so far.
    Transitioning { row: usize },
}

#[derive(Clone, Debug)]
pub struct LevelState {
    pub current: u32,
    pub phase: LevelPhase,
    /// Terrain of each board row, top to bottom.
    pub row_terrain: VecDeque<Terrain>,
    pub scroll_offset: f32,
}

impl LevelState {
    pub fn new(num_rows: usize) -> Self {
        LevelState {
            current: 1,
            phase: LevelPhase::Playing,
            row_terrain: Terrain::initial_rows().iter().copied().cycle().take(num_rows).collect(),
            scroll_offset: 0.0,
        }
    }

    /// Bring the bottom row to the top, as if new terrain scrolled in.
    pub fn rotate_terrain(&mut self) {
        if let Some(last) = self.row_terrain.pop_back() {
            self.row_terrain.push_front(last);
        }
    }
}

pub struct WorldState {
    pub grid: GridConfig,

    // ── Entities ──
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub gems: Vec<Entity>,
    pub key: Entity,

    // ── Level ──
    pub level: LevelState,

    /// Source of every random choice (spawn columns, gem colors, wraparound).
    pub rng: StdRng,
}

impl WorldState {
    pub fn new(grid: GridConfig, rng: StdRng) -> Self {
        let mut world = WorldState {
            grid,
            player: Player::new(&grid),
            enemies: vec![],
            gems: vec![],
            key: Entity::new(Sprite::Key, grid.start_col as f32, 0.0, false),
            level: LevelState::new(grid.num_rows),
            rng,
        };
        level::populate(&mut world);
        world
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.level.phase, LevelPhase::Transitioning { .. })
    }

    /// Row the player is drawn on. Follows the scroll while transitioning.
    pub fn player_draw_row(&self) -> f32 {
        match self.level.phase {
            LevelPhase::Playing => self.player.body.y,
            LevelPhase::Transitioning { row } => {
                crate::domain::rules::pinned_transition_row(row, self.grid.num_rows) as f32
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn new_world_is_level_one_and_populated() {
        let w = WorldState::new(GridConfig::default(), StdRng::seed_from_u64(9));
        assert_eq!(w.level.current, 1);
        assert_eq!(w.level.phase, LevelPhase::Playing);
        assert_eq!(w.level.scroll_offset, 0.0);
        assert_eq!(w.enemies.len(), 3);
        assert_eq!(w.gems.len(), 3);
        assert!(!w.key.visible);
        assert_eq!(w.key.cell(), (3, 0));
    }

    #[test]
    fn terrain_rotation_moves_last_to_front() {
        let mut l = LevelState::new(6);
        l.rotate_terrain();
        let rows: Vec<Terrain> = l.row_terrain.iter().copied().collect();
        assert_eq!(rows, vec![
            Terrain::Grass, Terrain::Grass, Terrain::Stone,
            Terrain::Stone, Terrain::Stone, Terrain::Grass,
        ]);
    }

    #[test]
    fn full_rotation_cycle_restores_layout() {
        let mut l = LevelState::new(6);
        let before = l.row_terrain.clone();
        for _ in 0..6 { l.rotate_terrain(); }
        assert_eq!(l.row_terrain, before);
    }

    #[test]
    fn player_draw_row_follows_transition() {
        let mut w = WorldState::new(GridConfig::default(), StdRng::seed_from_u64(9));
        assert_eq!(w.player_draw_row(), 4.0);
        w.level.phase = LevelPhase::Transitioning { row: 1 };
        assert_eq!(w.player_draw_row(), 1.0);
        w.level.phase = LevelPhase::Transitioning { row: 5 };
        assert_eq!(w.player_draw_row(), 3.0);
    }
}

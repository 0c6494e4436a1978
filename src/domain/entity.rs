/// Entities: the shared drawable shape plus Enemy and Player behavior.
/// Gems and the key are plain `Entity` values; only enemies and the
/// player carry extra state.

use std::time::Instant;

use rand::Rng;

use crate::config::GridConfig;
use crate::domain::rules;
use crate::domain::tile::Sprite;

/// Movement direction of one discrete input event.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
    Up,
    Down,
}

/// Position, sprite and visibility. Coordinates are in tile units:
/// `x` is a column, `y` a row. Enemies use fractional columns, everything
/// else sits on whole cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub sprite: Sprite,
    pub x: f32,
    pub y: f32,
    pub visible: bool,
}

impl Entity {
    pub fn new(sprite: Sprite, x: f32, y: f32, visible: bool) -> Self {
        Entity { sprite, x, y, visible }
    }

    /// Grid cell the entity occupies.
    pub fn cell(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }

    pub fn same_cell(&self, other: &Entity) -> bool {
        self.cell() == other.cell()
    }
}

// ── Enemy ──

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub body: Entity,
}

impl Enemy {
    pub fn new(col: f32, row: usize) -> Self {
        Enemy { body: Entity::new(Sprite::EnemyBug, col, row as f32, true) }
    }

    pub fn row(&self) -> i32 {
        self.body.y as i32
    }

    /// Drift right by `dt` seconds at the level's speed. Past the last
    /// column the enemy re-enters from a random column left of the board.
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, level: u32, grid: &GridConfig, rng: &mut R) {
        if self.body.x > grid.last_col() as f32 {
            self.body.x = rng.gen_range(rules::ENEMY_RESPAWN_COLS) as f32;
        } else {
            self.body.x += dt * rules::speed_multiplier(level);
        }
    }
}

// ── Player ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LifeState {
    Alive,
    Dead { since: Instant },
}

/// What happened to the player during one update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerUpdate {
    /// Cells of the gems picked up this update.
    pub picked: Vec<(i32, i32)>,
    pub hit: bool,
    pub respawned: bool,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Entity,
    pub lives: u32,
    pub gems: u32,
    pub life: LifeState,
}

impl Player {
    pub fn new(grid: &GridConfig) -> Self {
        Player {
            body: Entity::new(
                Sprite::CharBoy,
                grid.start_col as f32,
                grid.start_row as f32,
                true,
            ),
            lives: rules::STARTING_LIVES,
            gems: 0,
            life: LifeState::Alive,
        }
    }

    pub fn col(&self) -> i32 {
        self.body.cell().0
    }

    pub fn row(&self) -> i32 {
        self.body.cell().1
    }

    pub fn set_cell(&mut self, col: i32, row: i32) {
        self.body.x = col as f32;
        self.body.y = row as f32;
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.life, LifeState::Dead { .. })
    }

    /// Move one cell. Ignored while dead or when the move would leave the
    /// play box. Returns whether the player moved.
    pub fn handle_input(&mut self, dir: MoveDir, grid: &GridConfig) -> bool {
        if self.is_dead() {
            return false;
        }
        match rules::step_target(grid, self.col(), self.row(), dir) {
            Some((c, r)) => {
                self.set_cell(c, r);
                true
            }
            None => false,
        }
    }

    /// One frame of player logic.
    ///
    /// Dead: respawn at the start cell once the death pause is over.
    /// Alive: pick up every gem on the player's cell, then test enemy contact.
    pub fn update(
        &mut self,
        now: Instant,
        gems: &mut Vec<Entity>,
        enemies: &[Enemy],
        grid: &GridConfig,
    ) -> PlayerUpdate {
        let mut out = PlayerUpdate::default();

        if let LifeState::Dead { since } = self.life {
            if rules::death_pause_over(now.saturating_duration_since(since)) {
                self.life = LifeState::Alive;
                self.set_cell(grid.start_col, grid.start_row);
                self.lives = self.lives.saturating_sub(1);
                out.respawned = true;
            }
            return out;
        }

        let here = self.body.cell();
        gems.retain(|g| {
            if g.cell() == here {
                out.picked.push(here);
                false
            } else {
                true
            }
        });
        self.gems += out.picked.len() as u32;

        let (px, prow) = (self.body.x, self.row());
        if enemies.iter().any(|e| rules::is_hit(px, prow, e.body.x, e.row())) {
            self.life = LifeState::Dead { since: now };
            out.hit = true;
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn gem_at(col: i32, row: i32) -> Entity {
        Entity::new(Sprite::GemBlue, col as f32, row as f32, true)
    }

    // ── Enemy ──

    #[test]
    fn enemy_drifts_right_by_dt() {
        let g = GridConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut e = Enemy::new(2.0, 1);
        e.update(0.5, 1, &g, &mut rng);
        assert!((e.body.x - 2.5).abs() < 1e-6);
        assert_eq!(e.row(), 1);
    }

    #[test]
    fn enemy_speed_scales_with_level() {
        let g = GridConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut e = Enemy::new(0.0, 2);
        e.update(1.0, 3, &g, &mut rng); // multiplier 2.0
        assert!((e.body.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn enemy_wraps_into_negative_columns() {
        let g = GridConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let mut e = Enemy::new(7.01, 3);
            e.update(0.016, 1, &g, &mut rng);
            assert!(e.body.x >= -3.0 && e.body.x < 0.0, "x = {}", e.body.x);
            assert_eq!(e.row(), 3);
        }
    }

    #[test]
    fn enemy_at_last_column_keeps_moving() {
        // exactly num_cols - 1 is not past the edge yet
        let g = GridConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut e = Enemy::new(7.0, 1);
        e.update(0.1, 1, &g, &mut rng);
        assert!((e.body.x - 7.1).abs() < 1e-5);
    }

    // ── Player ──

    #[test]
    fn new_player_starts_alive_at_start_cell() {
        let p = Player::new(&GridConfig::default());
        assert_eq!((p.col(), p.row()), (3, 4));
        assert_eq!(p.lives, 4);
        assert_eq!(p.gems, 0);
        assert!(!p.is_dead());
    }

    #[test]
    fn input_moves_and_clamps() {
        let g = GridConfig::default();
        let mut p = Player::new(&g);
        assert!(!p.handle_input(MoveDir::Down, &g));
        assert!(p.handle_input(MoveDir::Up, &g));
        assert_eq!(p.row(), 3);
        for _ in 0..10 { p.handle_input(MoveDir::Right, &g); }
        assert_eq!(p.col(), 7);
        for _ in 0..10 { p.handle_input(MoveDir::Up, &g); }
        assert_eq!(p.row(), 0);
    }

    #[test]
    fn dead_player_ignores_input() {
        let g = GridConfig::default();
        let mut p = Player::new(&g);
        p.life = LifeState::Dead { since: Instant::now() };
        for dir in [MoveDir::Up, MoveDir::Left, MoveDir::Right, MoveDir::Down] {
            assert!(!p.handle_input(dir, &g));
        }
        assert_eq!((p.col(), p.row()), (3, 4));
        assert!(p.is_dead());
    }

    #[test]
    fn enemy_on_same_cell_kills_in_same_update() {
        let g = GridConfig::default();
        let mut p = Player::new(&g);
        let now = Instant::now();
        let enemies = vec![Enemy::new(3.0, 4)];
        let out = p.update(now, &mut vec![], &enemies, &g);
        assert!(out.hit);
        assert_eq!(p.life, LifeState::Dead { since: now });
    }

    #[test]
    fn enemy_on_other_row_is_harmless() {
        let g = GridConfig::default();
        let mut p = Player::new(&g);
        let enemies = vec![Enemy::new(3.0, 3), Enemy::new(1.0, 4)];
        let out = p.update(Instant::now(), &mut vec![], &enemies, &g);
        assert!(!out.hit);
        assert!(!p.is_dead());
    }

    #[test]
    fn respawn_waits_for_death_pause() {
        let g = GridConfig::default();
        let mut p = Player::new(&g);
        p.set_cell(5, 2);
        let t0 = Instant::now();
        p.life = LifeState::Dead { since: t0 };

        let out = p.update(t0 + Duration::from_millis(999), &mut vec![], &[], &g);
        assert!(!out.respawned);
        assert!(p.is_dead());
        assert_eq!(p.lives, 4);

        let out = p.update(t0 + Duration::from_millis(1000), &mut vec![], &[], &g);
        assert!(out.respawned);
        assert!(!p.is_dead());
        assert_eq!((p.col(), p.row()), (3, 4));
        assert_eq!(p.lives, 3);
    }

    #[test]
    fn lives_floor_at_zero() {
        let g = GridConfig::default();
        let mut p = Player::new(&g);
        p.lives = 0;
        let t0 = Instant::now();
        p.life = LifeState::Dead { since: t0 };
        p.update(t0 + Duration::from_secs(2), &mut vec![], &[], &g);
        assert_eq!(p.lives, 0);
        assert!(!p.is_dead());
    }

    #[test]
    fn dead_player_collects_nothing() {
        let g = GridConfig::default();
        let mut p = Player::new(&g);
        let t0 = Instant::now();
        p.life = LifeState::Dead { since: t0 };
        let mut gems = vec![gem_at(3, 4)];
        p.update(t0, &mut gems, &[], &g);
        assert_eq!(gems.len(), 1);
        assert_eq!(p.gems, 0);
    }

    #[test]
    fn pickup_removes_only_matching_gems() {
        let g = GridConfig::default();
        let mut p = Player::new(&g);
        p.set_cell(2, 1);
        let mut gems = vec![gem_at(2, 1), gem_at(4, 2), gem_at(2, 3)];
        let out = p.update(Instant::now(), &mut gems, &[], &g);
        assert_eq!(out.picked, vec![(2, 1)]);
        assert_eq!(gems.len(), 2);
        assert_eq!(p.gems, 1);
    }

    #[test]
    fn pickup_happens_before_collision() {
        let g = GridConfig::default();
        let mut p = Player::new(&g);
        p.set_cell(6, 2);
        let mut gems = vec![gem_at(6, 2)];
        let enemies = vec![Enemy::new(6.5, 2)];
        let out = p.update(Instant::now(), &mut gems, &enemies, &g);
        assert_eq!(out.picked.len(), 1);
        assert!(out.hit);
        assert_eq!(p.gems, 1);
    }
}

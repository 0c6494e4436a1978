/// Gameplay rules: pure functions and tuning constants.
///
/// Nothing here mutates state. `step` and the entities call into these
/// so the numbers that define game feel live in one place.
///
/// ## Collision
/// ┌──────────────────────────────┬──────────┐
/// │ Condition                     │ Hit?     │
/// ├──────────────────────────────┼──────────┤
/// │ enemy row ≠ player row        │ NO       │
/// │ |enemy x − player x| < 0.7    │ YES      │
/// │ Otherwise                     │ NO       │
/// └──────────────────────────────┴──────────┘
///
/// ## Movement clamp
/// Column ∈ [0, num_cols − 1], row ∈ [0, start_row]. A move that would leave
/// the box is dropped, not partially applied.

use std::ops::Range;
use std::time::Duration;

use crate::config::GridConfig;
use crate::domain::entity::MoveDir;

/// Horizontal distance (tile units) under which an enemy on the same row hits.
pub const HIT_DISTANCE: f32 = 0.7;

/// How long a hit player stays down before respawning.
pub const DEATH_PAUSE: Duration = Duration::from_millis(1000);

/// Vertical scroll speed of the level transition, pixels per second.
pub const SCROLL_SPEED: f32 = 150.0;

/// Columns an enemy re-enters from after leaving the right edge.
pub const ENEMY_RESPAWN_COLS: Range<i32> = -3..0;

pub const STARTING_LIVES: u32 = 4;

/// Enemies and gems per level, one per row starting at `FIRST_LANE`.
pub const LANES: usize = 3;
pub const FIRST_LANE: usize = 1;

/// Enemy speed factor for a level: +50% per level after the first.
#[inline]
pub fn speed_multiplier(level: u32) -> f32 {
    1.0 + 0.5 * level.saturating_sub(1) as f32
}

/// Does an enemy at `(enemy_x, enemy_row)` hit a player at `(player_x, player_row)`?
#[inline]
pub fn is_hit(player_x: f32, player_row: i32, enemy_x: f32, enemy_row: i32) -> bool {
    player_row == enemy_row && (player_x - enemy_x).abs() < HIT_DISTANCE
}

/// Target cell of a one-step move, or `None` if it would leave the play box.
pub fn step_target(grid: &GridConfig, col: i32, row: i32, dir: MoveDir) -> Option<(i32, i32)> {
    let (dc, dr) = match dir {
        MoveDir::Left  => (-1, 0),
        MoveDir::Right => (1, 0),
        MoveDir::Up    => (0, -1),
        MoveDir::Down  => (0, 1),
    };
    let (nc, nr) = (col + dc, row + dr);
    if nc < 0 || nc > grid.last_col() || nr < 0 || nr > grid.start_row {
        None
    } else {
        Some((nc, nr))
    }
}

/// Has the death pause run out?
#[inline]
pub fn death_pause_over(elapsed: Duration) -> bool {
    elapsed >= DEATH_PAUSE
}

/// Row the player is drawn on while the board scrolls to the next level.
#[inline]
pub fn pinned_transition_row(transition_row: usize, num_rows: usize) -> usize {
    transition_row.min(num_rows.saturating_sub(3))
}

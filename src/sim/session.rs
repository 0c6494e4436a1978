/// Session: the loop driver's state around one `WorldState`.
///
/// Owns everything that outlives a level: play clock, game-over latch,
/// and which input handler is active.
///
/// ## Input modes
///
///   Player: directional events move the player
///   Detached: everything ignored (level scroll, game over pending)
///   RestartPrompt: any key restarts the session
///
/// ## Game over
///
///   tick N:   lives hit 0  → game_over, input Detached, scene still drawn
///   tick N+1: overlay drawn once, input RestartPrompt
///   tick N+2…: Hold (nothing to update or draw) until a key arrives

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::config::GridConfig;
use crate::domain::entity::MoveDir;
use super::event::GameEvent;
use super::step;
use super::world::WorldState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputMode {
    Player,
    Detached,
    RestartPrompt,
}

/// One discrete event from an input source.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputEvent {
    Move(MoveDir),
    /// Any key without a direction. Only the restart prompt reacts to it.
    Other,
}

/// What the renderer should do after a tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Frame {
    Scene,
    GameOver,
    Hold,
}

pub struct Session {
    pub world: WorldState,
    pub started_at: Instant,
    pub last_tick: Instant,
    pub game_over: bool,
    pub game_over_displayed: bool,
    pub game_over_at: Option<Instant>,
    pub input: InputMode,
}

impl Session {
    pub fn new(grid: GridConfig, rng: StdRng, now: Instant) -> Self {
        info!(level = 1, "session started");
        Session {
            world: WorldState::new(grid, rng),
            started_at: now,
            last_tick: now,
            game_over: false,
            game_over_displayed: false,
            game_over_at: None,
            input: InputMode::Player,
        }
    }

    /// Throw the whole session away and start over from level 1.
    pub fn restart(&mut self, now: Instant) {
        let grid = self.world.grid;
        let rng = StdRng::seed_from_u64(self.world.rng.gen());
        *self = Session::new(grid, rng, now);
    }

    /// One frame of the loop driver.
    pub fn tick(&mut self, now: Instant) -> (Frame, Vec<GameEvent>) {
        let dt = now.saturating_duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;

        if self.game_over {
            if self.game_over_displayed {
                return (Frame::Hold, vec![]);
            }
            self.game_over_displayed = true;
            self.game_over_at = Some(now);
            self.input = InputMode::RestartPrompt;
            return (Frame::GameOver, vec![]);
        }

        let mut events = step::step(&mut self.world, now, dt);
        for e in &events {
            match e {
                GameEvent::KeyCollected { .. } => self.input = InputMode::Detached,
                GameEvent::LevelStarted { .. } => self.input = InputMode::Player,
                _ => {}
            }
        }

        if !self.world.is_transitioning() && self.world.player.lives == 0 {
            self.game_over = true;
            self.game_over_displayed = false;
            self.input = InputMode::Detached;
            let (level, gems) = (self.world.level.current, self.world.player.gems);
            info!(level, gems, "game over");
            events.push(GameEvent::GameOver { level, gems });
        }

        (Frame::Scene, events)
    }

    /// Apply one input event immediately.
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) -> Vec<GameEvent> {
        match self.input {
            InputMode::Player => {
                if let InputEvent::Move(dir) = event {
                    let grid = self.world.grid;
                    self.world.player.handle_input(dir, &grid);
                }
                vec![]
            }
            InputMode::Detached => vec![],
            InputMode::RestartPrompt => {
                self.restart(now);
                info!("restarted from game over");
                vec![GameEvent::Restarted]
            }
        }
    }

    /// Milliseconds played so far (frozen once the game-over screen is up).
    pub fn play_time_ms(&self, now: Instant) -> u64 {
        let end = self.game_over_at.unwrap_or(now);
        end.saturating_duration_since(self.started_at).as_millis() as u64
    }
}

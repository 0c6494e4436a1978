/// Events emitted during a tick or an input event.
/// The presentation layer consumes these for sound and logging.

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    GemCollected { col: i32, row: i32 },
    PlayerHit { col: i32, row: i32 },
    PlayerRespawned { lives: u32 },
    KeyRevealed,
    KeyCollected { next_level: u32 },
    RowScrolled { row: usize },
    LevelStarted { level: u32 },
    GameOver { level: u32, gems: u32 },
    Restarted,
}

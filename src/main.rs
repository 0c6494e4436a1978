/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod logging;
mod sim;
mod ui;

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use config::{GameConfig, GridConfig};
use domain::tile::ALL_ASSETS;
use error::GameError;
use sim::clock::{Clock, SystemClock};
use sim::event::GameEvent;
use sim::session::{Frame, Session};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::TerminalCanvas;
use ui::resources::{ResourceProvider, SpriteSheet};
use ui::scene::{self, SceneView};
use ui::sound::{self as sfx, SoundEngine};

fn main() {
    let (config, config_err) = GameConfig::load();

    match logging::init(&config.log) {
        Ok(true) => info!(version = env!("CARGO_PKG_VERSION"), "gemhop starting"),
        Ok(false) => {}
        Err(e) => eprintln!("Logging disabled: {e}"),
    }
    if let Some(e) = config_err {
        warn!(error = %e, "config not loaded, using defaults");
    }

    let grid = GridConfig::default();
    let (canvas_w, canvas_h) = grid.canvas_size();
    let mut canvas = TerminalCanvas::new(canvas_w, canvas_h);

    if let Err(e) = canvas.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = if config.audio_enabled { SoundEngine::new() } else { None };

    let result = game_loop(&mut canvas, sound.as_ref(), &config, grid);

    if let Err(e) = canvas.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(Some((level, gems))) => {
            println!();
            println!("Thanks for playing Gem Hop!");
            println!("Reached level {level} with {gems} gems.");
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(error = %e, "game loop aborted");
            eprintln!("Game error: {e}");
        }
    }
}

/// Runs until the player quits. Returns the level and gem count reached,
/// or `None` if the game never started.
fn game_loop(
    canvas: &mut TerminalCanvas,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    grid: GridConfig,
) -> Result<Option<(u32, u32)>, GameError> {
    let clock = SystemClock;
    let frame_sleep = Duration::from_millis(config.frame_ms);

    let mut sprites = SpriteSheet::new();
    let ready = Rc::new(Cell::new(false));
    {
        let ready = Rc::clone(&ready);
        sprites.on_ready(Box::new(move || ready.set(true)));
    }
    sprites.load(&ALL_ASSETS);

    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&config.gamepad);
    let mut session: Option<Session> = None;

    loop {
        kb.drain_events();
        gp.update();
        if kb.quit {
            break;
        }

        // Nothing runs until every asset is available.
        if !ready.get() {
            std::thread::sleep(frame_sleep);
            continue;
        }
        let s = session.get_or_insert_with(|| {
            Session::new(grid, StdRng::from_entropy(), clock.now())
        });

        for &ev in kb.events.iter().chain(gp.events.iter()) {
            let events = s.handle_input(ev, clock.now());
            play_sounds(sound, &events, grid.num_rows);
        }

        let now = clock.now();
        let (frame, events) = s.tick(now);
        play_sounds(sound, &events, grid.num_rows);

        match frame {
            Frame::Scene => {
                let view = SceneView {
                    play_ms: s.play_time_ms(now),
                    blink_ms: wall_clock_ms(),
                    hide_player: events.iter().any(|e| matches!(e, GameEvent::KeyCollected { .. })),
                };
                canvas.begin_frame()?;
                scene::draw_scene(canvas, &sprites, &s.world, &view);
                canvas.present()?;
            }
            Frame::GameOver => {
                canvas.begin_frame()?;
                scene::draw_game_over(
                    canvas,
                    &grid,
                    s.world.level.current,
                    s.world.player.gems,
                    s.play_time_ms(now),
                );
                canvas.present()?;
            }
            Frame::Hold => {}
        }

        std::thread::sleep(frame_sleep);
    }

    let summary = session.map(|s| (s.world.level.current, s.world.player.gems));
    if let Some((level, gems)) = summary {
        info!(level, gems, "quit");
    }
    Ok(summary)
}

fn play_sounds(sound: Option<&SoundEngine>, events: &[GameEvent], num_rows: usize) {
    let Some(engine) = sound else { return };
    for e in events {
        if let Some(fx) = sfx::effect_for(e, num_rows) {
            engine.play(fx);
        }
    }
}

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

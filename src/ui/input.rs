/// Keyboard input: drains crossterm events into discrete game events.
///
/// The game reacts to key strokes, not held keys, so every Press becomes
/// one event. Repeat and Release events are dropped; terminals without
/// keyboard enhancement never send Release anyway.
///
///   Arrows          →  Move
///   Esc / q / ^C    →  quit the program
///   anything else   →  Other ("any key")

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::MoveDir;
use crate::sim::session::InputEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyAction {
    Game(InputEvent),
    Quit,
    Ignore,
}

pub fn translate(key: &KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Ignore;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return KeyAction::Quit;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        KeyCode::Left  => KeyAction::Game(InputEvent::Move(MoveDir::Left)),
        KeyCode::Right => KeyAction::Game(InputEvent::Move(MoveDir::Right)),
        KeyCode::Up    => KeyAction::Game(InputEvent::Move(MoveDir::Up)),
        KeyCode::Down  => KeyAction::Game(InputEvent::Move(MoveDir::Down)),
        // Modifier-only presses are not "a key" to the restart prompt.
        KeyCode::Modifier(_) => KeyAction::Ignore,
        _ => KeyAction::Game(InputEvent::Other),
    }
}

pub struct InputState {
    /// Game events collected during the most recent drain, in arrival order.
    pub events: Vec<InputEvent>,
    pub quit: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            events: Vec::with_capacity(8),
            quit: false,
        }
    }

    /// Read all pending terminal events without blocking.
    /// Call once per frame, before the tick.
    pub fn drain_events(&mut self) {
        self.events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.push(&key);
            }
        }
    }

    fn push(&mut self, key: &KeyEvent) {
        match translate(key) {
            KeyAction::Game(ev) => self.events.push(ev),
            KeyAction::Quit => self.quit = true,
            KeyAction::Ignore => {}
        }
    }
}

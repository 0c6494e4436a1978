/// Gamepad input using gilrs, turned into the same discrete events as the
/// keyboard.
///
///   D-pad / Left Stick  →  Move (one event per press or stick flick)
///   `any_key` buttons   →  Other (restart on the game-over screen)
///
/// The `any_key` list comes from `[gamepad]` in config.toml.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use tracing::{debug, info};

use crate::config::GamepadConfig;
use crate::domain::entity::MoveDir;
use crate::sim::session::InputEvent;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

fn parse_buttons(names: &[String]) -> Vec<Btn> {
    names.iter().filter_map(|s| Btn::from_name(s)).collect()
}

/// Which stick direction (if any) a deflection counts as. The dominant
/// axis wins so a diagonal flick gives one move, not two.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
fn stick_dir(x: f32, y: f32) -> Option<MoveDir> {
    if x.abs() <= STICK_DEADZONE && y.abs() <= STICK_DEADZONE {
        return None;
    }
    Some(if x.abs() >= y.abs() {
        if x < 0.0 { MoveDir::Left } else { MoveDir::Right }
    } else if y > 0.0 {
        MoveDir::Up
    } else {
        MoveDir::Down
    })
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Events produced by the most recent `update`.
    pub events: Vec<InputEvent>,

    any_key: Vec<Btn>,
    stick_x: f32,
    stick_y: f32,
    /// Direction the stick is currently held in. A new event fires only
    /// when this changes to a direction.
    stick_held: Option<MoveDir>,

    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    info!(error = %e, "gamepad support unavailable");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        let mut any_key = parse_buttons(&cfg.any_key);
        if any_key.is_empty() {
            any_key = vec![Btn::A, Btn::B, Btn::Start];
        }

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            events: Vec::with_capacity(4),
            any_key,
            stick_x: 0.0,
            stick_y: 0.0,
            stick_held: None,
            connected,
        }
    }

    pub fn update(&mut self) {
        self.events.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.button_pressed(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                    self.stick_moved();
                }
                EventType::Connected => {
                    self.connected = true;
                    debug!("gamepad connected");
                }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                    debug!("gamepad disconnected");
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn button_pressed(&mut self, gilrs_btn: Button) {
        let dir = match gilrs_btn {
            Button::DPadUp    => Some(MoveDir::Up),
            Button::DPadDown  => Some(MoveDir::Down),
            Button::DPadLeft  => Some(MoveDir::Left),
            Button::DPadRight => Some(MoveDir::Right),
            _ => None,
        };
        if let Some(dir) = dir {
            self.events.push(InputEvent::Move(dir));
            return;
        }
        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.logical_pressed(btn);
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn logical_pressed(&mut self, btn: Btn) {
        if self.any_key.contains(&btn) {
            self.events.push(InputEvent::Other);
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn stick_moved(&mut self) {
        let now = stick_dir(self.stick_x, self.stick_y);
        if now != self.stick_held {
            if let Some(dir) = now {
                self.events.push(InputEvent::Move(dir));
            }
            self.stick_held = now;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.stick_x = 0.0;
        self.stick_y = 0.0;
        self.stick_held = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(any_key: &[&str]) -> GamepadState {
        let cfg = GamepadConfig { any_key: any_key.iter().map(|s| s.to_string()).collect() };
        let mut gp = GamepadState::new(&cfg);
        gp.events.clear();
        gp
    }

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("start"), Some(Btn::Start));
        assert_eq!(Btn::from_name("South"), Some(Btn::A));
        assert_eq!(Btn::from_name("rb"), Some(Btn::R1));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn configured_buttons_count_as_any_key() {
        let mut gp = pad(&["Y", "bogus"]);
        gp.logical_pressed(Btn::A);
        assert!(gp.events.is_empty());
        gp.logical_pressed(Btn::Y);
        assert_eq!(gp.events, vec![InputEvent::Other]);
    }

    #[test]
    fn empty_config_falls_back_to_defaults() {
        let mut gp = pad(&[]);
        gp.logical_pressed(Btn::Start);
        assert_eq!(gp.events, vec![InputEvent::Other]);
    }

    #[test]
    fn stick_fires_once_per_flick() {
        let mut gp = pad(&[]);
        gp.stick_x = 0.9;
        gp.stick_moved();
        gp.stick_x = 1.0;
        gp.stick_moved();
        assert_eq!(gp.events, vec![InputEvent::Move(MoveDir::Right)]);

        gp.stick_x = 0.0;
        gp.stick_moved();
        gp.stick_x = 0.8;
        gp.stick_moved();
        assert_eq!(gp.events.len(), 2);
    }

    #[test]
    fn stick_dominant_axis_wins() {
        assert_eq!(stick_dir(0.1, 0.2), None);
        assert_eq!(stick_dir(-0.6, 0.3), Some(MoveDir::Left));
        assert_eq!(stick_dir(0.3, 0.7), Some(MoveDir::Up));
        assert_eq!(stick_dir(0.3, -0.7), Some(MoveDir::Down));
    }
}

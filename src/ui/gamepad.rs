/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Move (on Ready: start, then move)
///   Start / A             →  Start
///   Select                →  Restart
///   Mode                  →  Quit
///   L1 / R1               →  Previous / next difficulty

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::{Difficulty, Direction};
use crate::sim::intent::Intent;
use crate::sim::world::Status;
use super::input::{direction_commands, Command};

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
    Start,
    Select,
    Mode,
}

const BTN_COUNT: usize = 9;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            "MODE" | "GUIDE" | "HOME" => Some(Btn::Mode),
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
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            Button::Mode      => Some(Btn::Mode),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Clone, Debug, PartialEq)]
struct ActionMap {
    start: Vec<Btn>,
    restart: Vec<Btn>,
    quit: Vec<Btn>,
    difficulty_prev: Vec<Btn>,
    difficulty_next: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            start:           vec![Btn::Start, Btn::A],
            restart:         vec![Btn::Select],
            quit:            vec![Btn::Mode],
            difficulty_prev: vec![Btn::L1],
            difficulty_next: vec![Btn::R1],
        }
    }
}

impl ActionMap {
    /// Names that don't parse are dropped; an empty list keeps the default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if parsed.is_empty() { fallback } else { parsed }
        }
        let d = ActionMap::default();
        ActionMap {
            start: parse_list(&cfg.start, d.start),
            restart: parse_list(&cfg.restart, d.restart),
            quit: parse_list(&cfg.quit, d.quit),
            difficulty_prev: parse_list(&cfg.difficulty_prev, d.difficulty_prev),
            difficulty_next: parse_list(&cfg.difficulty_next, d.difficulty_next),
        }
    }
}

/// Edge-triggered snapshot of one frame of pad input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PadFrame {
    pub direction: Option<Direction>,
    pub start: bool,
    pub restart: bool,
    pub quit: bool,
    pub difficulty_prev: bool,
    pub difficulty_next: bool,
}

impl PadFrame {
    /// Commands for this frame, checked in priority order.
    pub fn commands(&self, status: Status, difficulty: Difficulty) -> Vec<Command> {
        if self.quit { return vec![Command::Quit]; }
        if self.restart { return vec![Command::Apply(Intent::Restart)]; }

        let mut out = Vec::new();
        if status != Status::Playing && (self.difficulty_prev || self.difficulty_next) {
            let level = difficulty.cycled(self.difficulty_next);
            out.push(Command::Apply(Intent::SetDifficulty(level)));
        }
        if self.start {
            out.push(Command::Apply(Intent::Start));
        }
        if let Some(dir) = self.direction {
            let status = if self.start && status == Status::Ready { Status::Playing } else { status };
            out.extend(direction_commands(dir, status));
        }
        out
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons that went down since the last `update()`, indexed by Btn.
    pressed: [bool; BTN_COUNT],
    dpad: Option<Direction>,

    // Stick
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_dir: Option<Direction>,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(_) => (None, false),
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            pressed: [false; BTN_COUNT],
            dpad: None,
            stick_dir: None,
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map = ActionMap::from_config(cfg);
    }

    /// Poll the pad and return this frame's edge-triggered input.
    pub fn update(&mut self) -> PadFrame {
        self.pressed = [false; BTN_COUNT];
        self.dpad = None;
        #[cfg_attr(not(feature = "gamepad"), allow(unused_mut))]
        let mut stick_edge = None;

        #[cfg(feature = "gamepad")]
        {
            stick_edge = self.poll_gilrs();
        }

        let any = |btns: &[Btn]| btns.iter().any(|&b| self.pressed[b as usize]);
        let map = &self.action_map;
        PadFrame {
            direction: self.dpad.or(stick_edge),
            start: any(&map.start),
            restart: any(&map.restart),
            quit: any(&map.quit),
            difficulty_prev: any(&map.difficulty_prev),
            difficulty_next: any(&map.difficulty_next),
        }
    }

    /// Drain gilrs events. Returns a stick direction that just crossed
    /// the deadzone this frame.
    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) -> Option<Direction> {
        let gilrs = self.gilrs.as_mut()?;
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press_button(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => { self.connected = true; }
                EventType::Disconnected => {
                    self.connected = false;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                }
                _ => {}
            }
        }

        let now = stick_direction(self.stick_x, self.stick_y);
        let edge = if now != self.stick_dir { now } else { None };
        self.stick_dir = now;
        edge
    }

    #[cfg(feature = "gamepad")]
    fn press_button(&mut self, gilrs_btn: Button) {
        // D-pad handled separately (not in Btn enum)
        let dir = match gilrs_btn {
            Button::DPadUp    => Some(Direction::Up),
            Button::DPadDown  => Some(Direction::Down),
            Button::DPadLeft  => Some(Direction::Left),
            Button::DPadRight => Some(Direction::Right),
            _ => None,
        };
        if dir.is_some() {
            self.dpad = dir;
            return;
        }
        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.pressed[btn as usize] = true;
        }
    }
}

/// Dominant stick axis outside the deadzone. gilrs reports +Y as up.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
fn stick_direction(x: f32, y: f32) -> Option<Direction> {
    if x.abs() < STICK_DEADZONE && y.abs() < STICK_DEADZONE {
        return None;
    }
    if x.abs() >= y.abs() {
        Some(if x < 0.0 { Direction::Left } else { Direction::Right })
    } else {
        Some(if y > 0.0 { Direction::Up } else { Direction::Down })
    }
}

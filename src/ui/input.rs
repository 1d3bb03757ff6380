/// Keyboard input.
///
/// Drains pending terminal events each frame and maps key presses to
/// commands for the game loop. Only Press and Repeat events count; the
/// muncher keeps going on its own, so nothing needs a held state.
///
/// Key map:
///   Arrows / WASD   →  Move (on Ready: start, then move)
///   Enter / Space   →  Start (on Ready: any other key too)
///   R               →  Restart
///   1 / 2 / 3       →  Easy / Normal / Hard
///   Esc / Q / Ctrl+C →  Quit

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::{Difficulty, Direction};
use crate::sim::intent::Intent;
use crate::sim::world::Status;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Quit,
    Apply(Intent),
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Press/Repeat events collected by the last `drain_events()`.
    presses: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { presses: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind != KeyEventKind::Release {
                    self.presses.push(key);
                }
            }
        }
    }

    pub fn presses(&self) -> &[KeyEvent] {
        &self.presses
    }
}

pub fn key_direction(code: KeyCode) -> Option<Direction> {
    if KEYS_UP.contains(&code) {
        Some(Direction::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(Direction::Down)
    } else if KEYS_LEFT.contains(&code) {
        Some(Direction::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(Direction::Right)
    } else {
        None
    }
}

fn key_difficulty(code: KeyCode) -> Option<Difficulty> {
    match code {
        KeyCode::Char('1') => Some(Difficulty::Easy),
        KeyCode::Char('2') => Some(Difficulty::Normal),
        KeyCode::Char('3') => Some(Difficulty::Hard),
        _ => None,
    }
}

/// A direction press. On the Ready screen it also starts the run.
pub fn direction_commands(dir: Direction, status: Status) -> Vec<Command> {
    match status {
        Status::Ready => vec![Command::Apply(Intent::Start), Command::Apply(Intent::Move(dir))],
        Status::Playing => vec![Command::Apply(Intent::Move(dir))],
        Status::GameOver | Status::Won => vec![],
    }
}

/// Map one key press to commands, given the status it lands in.
pub fn key_commands(key: &KeyEvent, status: Status) -> Vec<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return vec![Command::Quit];
    }
    if KEYS_QUIT.contains(&key.code) {
        return vec![Command::Quit];
    }
    if KEYS_RESTART.contains(&key.code) {
        return vec![Command::Apply(Intent::Restart)];
    }
    if KEYS_CONFIRM.contains(&key.code) {
        return vec![Command::Apply(Intent::Start)];
    }
    if let Some(level) = key_difficulty(key.code) {
        return vec![Command::Apply(Intent::SetDifficulty(level))];
    }
    match (key_direction(key.code), status) {
        (Some(dir), _) => direction_commands(dir, status),
        (None, Status::Ready) => vec![Command::Apply(Intent::Start)],
        (None, _) => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_move() {
        for (code, dir) in [
            (KeyCode::Up, Direction::Up),
            (KeyCode::Char('s'), Direction::Down),
            (KeyCode::Char('A'), Direction::Left),
            (KeyCode::Right, Direction::Right),
        ] {
            assert_eq!(key_commands(&press(code), Status::Playing), vec![Command::Apply(Intent::Move(dir))]);
        }
    }

    #[test]
    fn direction_on_ready_starts_and_queues() {
        assert_eq!(
            key_commands(&press(KeyCode::Left), Status::Ready),
            vec![Command::Apply(Intent::Start), Command::Apply(Intent::Move(Direction::Left))],
        );
        assert!(key_commands(&press(KeyCode::Left), Status::GameOver).is_empty());
    }

    #[test]
    fn meta_keys() {
        assert_eq!(key_commands(&press(KeyCode::Esc), Status::Playing), vec![Command::Quit]);
        assert_eq!(key_commands(&press(KeyCode::Char('q')), Status::Ready), vec![Command::Quit]);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_commands(&ctrl_c, Status::Playing), vec![Command::Quit]);
        assert_eq!(key_commands(&press(KeyCode::Char('R')), Status::Won), vec![Command::Apply(Intent::Restart)]);
        assert_eq!(key_commands(&press(KeyCode::Enter), Status::Ready), vec![Command::Apply(Intent::Start)]);
    }

    #[test]
    fn number_keys_pick_difficulty() {
        assert_eq!(
            key_commands(&press(KeyCode::Char('3')), Status::Ready),
            vec![Command::Apply(Intent::SetDifficulty(Difficulty::Hard))],
        );
        assert!(key_commands(&press(KeyCode::Char('9')), Status::Playing).is_empty());
    }

    #[test]
    fn any_key_starts_from_ready() {
        let start = vec![Command::Apply(Intent::Start)];
        for code in [KeyCode::Char('9'), KeyCode::Char('x'), KeyCode::Tab, KeyCode::F(5)] {
            assert_eq!(key_commands(&press(code), Status::Ready), start, "{:?}", code);
        }
        assert_eq!(key_commands(&press(KeyCode::Char('r')), Status::Ready), vec![Command::Apply(Intent::Restart)]);
        assert!(key_commands(&press(KeyCode::Char('x')), Status::GameOver).is_empty());
    }

    #[test]
    fn plain_c_is_not_quit() {
        assert!(key_commands(&press(KeyCode::Char('c')), Status::Playing).is_empty());
    }
}

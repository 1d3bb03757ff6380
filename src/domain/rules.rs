/// Scoring and contact rules, table driven.
///
/// Pure functions, no side effects. These say *what happens*; the
/// step function applies it.
///
/// ### Pickup
/// ┌──────────────┬────────┬──────────────────────────────┐
/// │ Tile          │ Score  │ Effect                        │
/// ├──────────────┼────────┼──────────────────────────────┤
/// │ Pellet        │ +10    │ tile → Empty                  │
/// │ PowerPellet   │ +50    │ tile → Empty, all ghosts      │
/// │               │        │ Frightened for 40 ticks       │
/// └──────────────┴────────┴──────────────────────────────┘
///
/// ### Ghost contact (same cell after ghosts move)
/// ┌──────────────┬──────────────────────────────────────┐
/// │ Ghost mode    │ Outcome                               │
/// ├──────────────┼──────────────────────────────────────┤
/// │ Frightened    │ +200, ghost → Eaten                   │
/// │ Chase         │ lose a life (respawn or game over)    │
/// │ Eaten         │ nothing                               │
/// └──────────────┴──────────────────────────────────────┘

use super::entity::GhostMode;
use super::tile::Tile;

pub const STARTING_LIVES: u32 = 3;
pub const FRIGHTENED_TICKS: u32 = 40;
pub const GHOST_SCORE: u32 = 200;
/// Frightened ghosts start blinking when this few ticks remain.
pub const BLINK_THRESHOLD: u32 = 15;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pickup {
    Pellet,
    PowerPellet,
}

impl Pickup {
    pub fn from_tile(tile: Tile) -> Option<Pickup> {
        match tile {
            Tile::Pellet => Some(Pickup::Pellet),
            Tile::PowerPellet => Some(Pickup::PowerPellet),
            _ => None,
        }
    }

    pub fn score(self) -> u32 {
        match self {
            Pickup::Pellet => Tile::Pellet.score_value(),
            Pickup::PowerPellet => Tile::PowerPellet.score_value(),
        }
    }

    pub fn frightens(self) -> bool {
        self == Pickup::PowerPellet
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    /// Muncher eats the ghost.
    EatGhost,
    /// Ghost catches the muncher.
    LoseLife,
    Ignore,
}

pub fn contact(mode: GhostMode) -> Contact {
    match mode {
        GhostMode::Frightened => Contact::EatGhost,
        GhostMode::Chase => Contact::LoseLife,
        GhostMode::Eaten => Contact::Ignore,
    }
}

/// Should a frightened ghost be drawn in its blink colour this tick?
pub fn is_blinking(frightened_ticks_left: u32) -> bool {
    frightened_ticks_left > 0 && frightened_ticks_left < BLINK_THRESHOLD && frightened_ticks_left % 2 == 0
}

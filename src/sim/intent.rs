/// Intents: the closed set of requests the host may make of the core.
///
/// | Intent          | Accepted when     | Effect                              |
/// |-----------------|-------------------|-------------------------------------|
/// | Start           | Ready             | status → Playing                    |
/// | Restart         | always            | fresh state, difficulty → Normal    |
/// | Move(dir)       | Playing           | queue `dir` for the next tick       |
/// | SetDifficulty   | not Playing       | replace difficulty                  |
/// | Tick            | Playing           | one simulation step                 |
///
/// Rejected intents return a clone of the input and no events.

use rand::Rng;
use tracing::info;

use crate::domain::entity::{Difficulty, Direction};
use super::event::GameEvent;
use super::step::step;
use super::world::{GameState, Status};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Start,
    Restart,
    Move(Direction),
    SetDifficulty(Difficulty),
    Tick,
}

pub fn apply<R: Rng + ?Sized>(prev: &GameState, intent: Intent, rng: &mut R) -> (GameState, Vec<GameEvent>) {
    let (next, events) = match intent {
        Intent::Start => start(prev),
        Intent::Restart => (GameState::new(), vec![GameEvent::Restarted]),
        Intent::Move(dir) => queue_move(prev, dir),
        Intent::SetDifficulty(level) => set_difficulty(prev, level),
        Intent::Tick => step(prev, rng),
    };

    if next.status != prev.status {
        info!(from = ?prev.status, to = ?next.status, score = next.score, tick = next.tick, "status changed");
        if next.status.is_terminal() {
            info!(score = next.score, lives = next.lives, difficulty = next.difficulty.label(), "run finished");
        }
    }
    (next, events)
}

fn start(prev: &GameState) -> (GameState, Vec<GameEvent>) {
    if prev.status != Status::Ready { return (prev.clone(), vec![]); }
    let mut next = prev.clone();
    next.status = Status::Playing;
    (next, vec![GameEvent::Started])
}

fn queue_move(prev: &GameState, dir: Direction) -> (GameState, Vec<GameEvent>) {
    let mut next = prev.clone();
    if prev.status == Status::Playing {
        next.player.queued = dir;
    }
    (next, vec![])
}

fn set_difficulty(prev: &GameState, level: Difficulty) -> (GameState, Vec<GameEvent>) {
    if prev.status == Status::Playing || prev.difficulty == level {
        return (prev.clone(), vec![]);
    }
    let mut next = prev.clone();
    next.difficulty = level;
    info!(difficulty = level.label(), "difficulty selected");
    (next, vec![GameEvent::DifficultyChanged(level)])
}

/// Events emitted by intents and simulation steps.
/// The presentation layer consumes these for banners, sound and logs.

use crate::domain::entity::{Difficulty, Position};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    Restarted,
    DifficultyChanged(Difficulty),
    PelletEaten { at: Position },
    PowerPelletEaten { at: Position },
    FrightenedEnded,
    GhostEaten { id: usize },
    GhostRecovered { id: usize },
    LifeLost { lives_left: u32 },
    GameOver,
    Won,
}

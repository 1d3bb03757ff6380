/// GameState: the complete snapshot of a running game.
///
/// Snapshots are values. `step::step` and `intent::apply` take the
/// previous snapshot by reference and return a new one, so a reader
/// holding a snapshot never sees it change underneath.
///
/// ## Status machine
///   Ready ──start──▶ Playing ──▶ GameOver | Won
///   any   ──restart──▶ Ready (fresh state, difficulty reset)

use crate::domain::entity::{Difficulty, Ghost, Player, Position};
use crate::domain::maze::{self, Board};
use crate::domain::rules::STARTING_LIVES;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Ready,
    Playing,
    GameOver,
    Won,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::GameOver | Status::Won)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GameState {
    // ── Maze ──
    pub board: Board,
    /// Always equals `board.pellet_count()`.
    pub remaining_pellets: usize,

    // ── Agents ──
    pub player: Player,
    pub player_spawn: Position,
    pub ghosts: Vec<Ghost>,

    // ── Meta ──
    pub score: u32,
    pub lives: u32,
    pub status: Status,
    pub frightened_ticks_left: u32,
    pub tick: u64,
    pub difficulty: Difficulty,
}

// ── Construction ──

impl GameState {
    /// Fresh game on the built-in maze.
    pub fn new() -> Self {
        GameState::with_layout(Board::classic(), maze::PLAYER_SPAWN, maze::classic_ghosts())
    }

    /// Fresh game on an arbitrary board and roster.
    pub fn with_layout(board: Board, player_spawn: Position, ghosts: Vec<Ghost>) -> Self {
        let remaining_pellets = board.pellet_count();
        GameState {
            board,
            remaining_pellets,
            player: Player::new(player_spawn),
            player_spawn,
            ghosts,
            score: 0,
            lives: STARTING_LIVES,
            status: Status::Ready,
            frightened_ticks_left: 0,
            tick: 0,
            difficulty: Difficulty::default(),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}

// ── Agent reset ──

impl GameState {
    /// Put the muncher and every ghost back at spawn. Board, score,
    /// lives, difficulty and the frightened timer are left alone.
    pub fn respawn_agents(&mut self) {
        self.player = Player::new(self.player_spawn);
        for g in &mut self.ghosts {
            *g = g.respawned();
        }
    }
}

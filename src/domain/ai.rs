/// Ghost AI: direction selection.
///
/// Three strategies:
///   1. **Random**: uniform over valid moves (frightened, half of Easy chase).
///   2. **Greedy**: minimise Manhattan distance to the target after one step.
///   3. **Shortest path**: BFS to the muncher, first step of a shortest path
///      (Hard chase). Falls back to Greedy.
///
/// Valid moves for chasing/frightened ghosts: not a wall, and never *into*
/// the ghost house from outside it. No 180° reversal while another option
/// exists. Eaten ghosts ignore the house rule and home greedily.

use std::collections::VecDeque;

use rand::Rng;
use tracing::trace;

use super::entity::{Difficulty, Direction, Ghost, GhostMode, Position};
use super::maze::Board;
use super::movement::next_position;

/// Which strategy produced a decision (for logs and tests).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Strategy {
    Random,
    Greedy,
    ShortestPath,
}

// ── Move enumeration ──

/// Moves open to a chasing or frightened ghost, reversal filter applied.
pub fn valid_moves(board: &Board, ghost: &Ghost) -> Vec<Direction> {
    let in_house = board.is_ghost_house(ghost.position);
    let mut moves: Vec<Direction> = Direction::MOVES
        .into_iter()
        .filter(|&dir| {
            let next = next_position(ghost.position, dir, board.width());
            if board.is_wall(next) { return false; }
            in_house || !board.is_ghost_house(next)
        })
        .collect();

    if moves.len() > 1 && ghost.direction != Direction::None {
        let back = ghost.direction.opposite();
        moves.retain(|&d| d != back);
    }
    moves
}

/// Moves open to an eaten ghost: any non-wall neighbour.
pub fn homing_moves(board: &Board, pos: Position) -> Vec<Direction> {
    Direction::MOVES
        .into_iter()
        .filter(|&dir| !board.is_wall(next_position(pos, dir, board.width())))
        .collect()
}

// ── Strategies ──

/// Uniform pick. None only when `moves` is empty.
pub fn random_move<R: Rng + ?Sized>(moves: &[Direction], rng: &mut R) -> Option<Direction> {
    if moves.is_empty() { return None; }
    Some(moves[rng.gen_range(0..moves.len())])
}

/// Move whose resulting cell is closest to `target`. Ties keep the
/// earliest entry of `moves`.
pub fn greedy_move(pos: Position, target: Position, moves: &[Direction], width: usize) -> Option<Direction> {
    let mut best: Option<(Direction, u32)> = None;
    for &dir in moves {
        let dist = next_position(pos, dir, width).manhattan(target);
        match best {
            Some((_, d)) if d <= dist => {}
            _ => best = Some((dir, dist)),
        }
    }
    best.map(|(dir, _)| dir)
}

/// BFS from `start` to `goal` over non-wall cells (ghost house included,
/// tunnels wrap). Returns the first step of one shortest path, or None
/// when unreachable or already there.
pub fn shortest_path_move(board: &Board, start: Position, goal: Position) -> Option<Direction> {
    if start == goal { return None; }
    let (w, h) = (board.width(), board.height());
    if board.tile_at(start).is_none() { return None; }

    let mut visited = vec![vec![false; w]; h];
    visited[start.y as usize][start.x as usize] = true;

    // Each entry carries the first step taken out of `start`.
    let mut queue: VecDeque<(Position, Direction)> = VecDeque::with_capacity(w * h);

    for dir in Direction::MOVES {
        let next = next_position(start, dir, w);
        if board.is_wall(next) { continue; }
        if next == goal { return Some(dir); }
        visited[next.y as usize][next.x as usize] = true;
        queue.push_back((next, dir));
    }

    while let Some((cur, first)) = queue.pop_front() {
        for dir in Direction::MOVES {
            let next = next_position(cur, dir, w);
            // Non-wall implies in bounds, so the index below is safe.
            if board.is_wall(next) { continue; }
            if visited[next.y as usize][next.x as usize] { continue; }
            if next == goal { return Some(first); }
            visited[next.y as usize][next.x as usize] = true;
            queue.push_back((next, first));
        }
    }
    None
}

/// BFS step count between two cells, None if unreachable.
#[cfg(test)]
pub fn path_distance(board: &Board, start: Position, goal: Position) -> Option<usize> {
    if start == goal { return Some(0); }
    let (w, h) = (board.width(), board.height());
    if board.tile_at(start).is_none() { return None; }

    let mut dist = vec![vec![usize::MAX; w]; h];
    dist[start.y as usize][start.x as usize] = 0;
    let mut queue = VecDeque::from([start]);

    while let Some(cur) = queue.pop_front() {
        let d = dist[cur.y as usize][cur.x as usize];
        for dir in Direction::MOVES {
            let next = next_position(cur, dir, w);
            if board.is_wall(next) { continue; }
            let slot = &mut dist[next.y as usize][next.x as usize];
            if *slot != usize::MAX { continue; }
            *slot = d + 1;
            if next == goal { return Some(d + 1); }
            queue.push_back(next);
        }
    }
    None
}

// ── Dispatch ──

/// Direction for a chasing or frightened ghost toward `target`.
/// None when boxed in (the ghost then stays put).
pub fn choose_direction<R: Rng + ?Sized>(
    board: &Board,
    ghost: &Ghost,
    target: Position,
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<(Direction, Strategy)> {
    let moves = valid_moves(board, ghost);
    if moves.is_empty() { return None; }

    let greedy = |moves: &[Direction]| greedy_move(ghost.position, target, moves, board.width());

    let decision = if ghost.mode == GhostMode::Frightened {
        random_move(&moves, rng).map(|d| (d, Strategy::Random))
    } else {
        match difficulty {
            Difficulty::Easy => {
                if rng.gen_bool(0.5) {
                    random_move(&moves, rng).map(|d| (d, Strategy::Random))
                } else {
                    greedy(&moves).map(|d| (d, Strategy::Greedy))
                }
            }
            Difficulty::Normal => greedy(&moves).map(|d| (d, Strategy::Greedy)),
            Difficulty::Hard => match shortest_path_move(board, ghost.position, target) {
                Some(step) if moves.contains(&step) => Some((step, Strategy::ShortestPath)),
                _ => greedy(&moves).map(|d| (d, Strategy::Greedy)),
            },
        }
    };

    if let Some((dir, strategy)) = decision {
        trace!(ghost = ghost.name, ?dir, ?strategy, "ghost decision");
    }
    decision
}

/// Direction for an eaten ghost heading home.
pub fn homing_direction(board: &Board, ghost: &Ghost) -> Option<Direction> {
    let moves = homing_moves(board, ghost.position);
    greedy_move(ghost.position, ghost.home, &moves, board.width())
}

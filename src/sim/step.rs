/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Tick counter
///   2. Frightened timer decay (expiry → ghosts back to Chase)
///   3. Muncher movement (queued turn, then current heading)
///   4. Pellet pickup
///   5. Ghost movement (roster order, all see the same muncher cell)
///   6. Collision / contact
///   7. Win check
///
/// Only runs while Playing. The previous snapshot is never touched:
/// the step works on a clone and returns it.

use rand::Rng;
use tracing::debug;

use crate::domain::ai;
use crate::domain::entity::{Difficulty, Ghost, GhostMode, Position};
use crate::domain::maze::Board;
use crate::domain::movement::next_position;
use crate::domain::rules::{self, Contact, Pickup, FRIGHTENED_TICKS, GHOST_SCORE};
use super::event::GameEvent;
use super::world::{GameState, Status};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step<R: Rng + ?Sized>(prev: &GameState, rng: &mut R) -> (GameState, Vec<GameEvent>) {
    if prev.status != Status::Playing { return (prev.clone(), vec![]); }

    let mut world = prev.clone();
    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    resolve_frightened_timer(&mut world, &mut events);
    resolve_player_movement(&mut world);
    resolve_pickup(&mut world, &mut events);
    resolve_ghost_movement(&mut world, rng, &mut events);
    resolve_collisions(&mut world, &mut events);
    resolve_win(&mut world, &mut events);

    if !events.is_empty() {
        debug!(tick = world.tick, ?events, "tick events");
    }
    (world, events)
}

// ══════════════════════════════════════════════════════════════
// Timers
// ══════════════════════════════════════════════════════════════

fn resolve_frightened_timer(world: &mut GameState, events: &mut Vec<GameEvent>) {
    if world.frightened_ticks_left == 0 { return; }
    world.frightened_ticks_left -= 1;
    if world.frightened_ticks_left > 0 { return; }

    for g in world.ghosts.iter_mut().filter(|g| g.mode == GhostMode::Frightened) {
        g.mode = GhostMode::Chase;
    }
    events.push(GameEvent::FrightenedEnded);
}

// ══════════════════════════════════════════════════════════════
// Muncher movement
// ══════════════════════════════════════════════════════════════

fn resolve_player_movement(world: &mut GameState) {
    let board = &world.board;
    let w = board.width();
    let p = &mut world.player;

    // Queued turn is taken as soon as the way is open.
    if !board.is_wall(next_position(p.position, p.queued, w)) {
        p.direction = p.queued;
    }

    let next = next_position(p.position, p.direction, w);
    if !board.is_wall(next) {
        p.position = next;
        p.mouth_open = !p.mouth_open;
    }
}

// ══════════════════════════════════════════════════════════════
// Pickup
// ══════════════════════════════════════════════════════════════

fn resolve_pickup(world: &mut GameState, events: &mut Vec<GameEvent>) {
    let at = world.player.position;
    let pickup = match world.board.consume(at).and_then(Pickup::from_tile) {
        Some(p) => p,
        None => return,
    };

    world.score += pickup.score();
    world.remaining_pellets = world.remaining_pellets.saturating_sub(1);

    if pickup.frightens() {
        world.frightened_ticks_left = FRIGHTENED_TICKS;
        // Eaten ghosts are not exempt.
        for g in &mut world.ghosts {
            g.mode = GhostMode::Frightened;
        }
        events.push(GameEvent::PowerPelletEaten { at });
    } else {
        events.push(GameEvent::PelletEaten { at });
    }
}

// ══════════════════════════════════════════════════════════════
// Ghost movement
// ══════════════════════════════════════════════════════════════

fn resolve_ghost_movement<R: Rng + ?Sized>(world: &mut GameState, rng: &mut R, events: &mut Vec<GameEvent>) {
    let target = world.player.position;
    let difficulty = world.difficulty;
    let tick = world.tick;
    let board = &world.board;

    for ghost in &mut world.ghosts {
        if ghost.mode == GhostMode::Eaten {
            if move_eaten_ghost(board, ghost) {
                events.push(GameEvent::GhostRecovered { id: ghost.id });
            }
            continue;
        }
        move_active_ghost(board, ghost, target, difficulty, tick, rng);
    }
}

/// Home arrival flips the ghost back to Chase without moving this tick.
/// Returns true on recovery.
fn move_eaten_ghost(board: &Board, ghost: &mut Ghost) -> bool {
    if ghost.is_home() {
        ghost.mode = GhostMode::Chase;
        return true;
    }
    if let Some(dir) = ai::homing_direction(board, ghost) {
        ghost.direction = dir;
        ghost.position = next_position(ghost.position, dir, board.width());
    }
    false
}

fn move_active_ghost<R: Rng + ?Sized>(
    board: &Board,
    ghost: &mut Ghost,
    target: Position,
    difficulty: Difficulty,
    tick: u64,
    rng: &mut R,
) {
    // Easy: chasing ghosts move at half speed.
    if difficulty == Difficulty::Easy && tick % 2 != 0 && ghost.mode != GhostMode::Frightened {
        return;
    }
    if let Some((dir, _)) = ai::choose_direction(board, ghost, target, difficulty, rng) {
        ghost.direction = dir;
        ghost.position = next_position(ghost.position, dir, board.width());
    }
}

// ══════════════════════════════════════════════════════════════
// Collision
// ══════════════════════════════════════════════════════════════

fn resolve_collisions(world: &mut GameState, events: &mut Vec<GameEvent>) {
    for i in 0..world.ghosts.len() {
        if world.ghosts[i].position != world.player.position { continue; }

        match rules::contact(world.ghosts[i].mode) {
            Contact::EatGhost => {
                world.score += GHOST_SCORE;
                world.ghosts[i].mode = GhostMode::Eaten;
                events.push(GameEvent::GhostEaten { id: world.ghosts[i].id });
            }
            // Later ghosts are still checked once the game is over.
            Contact::LoseLife if world.status == Status::GameOver => {}
            Contact::LoseLife => {
                world.lives = world.lives.saturating_sub(1);
                if world.lives > 0 {
                    world.respawn_agents();
                    events.push(GameEvent::LifeLost { lives_left: world.lives });
                } else {
                    world.status = Status::GameOver;
                    events.push(GameEvent::LifeLost { lives_left: 0 });
                    events.push(GameEvent::GameOver);
                }
            }
            Contact::Ignore => {}
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Win check
// ══════════════════════════════════════════════════════════════

/// Unconditional: clearing the last pellet wins even on the tick
/// the last life is lost.
fn resolve_win(world: &mut GameState, events: &mut Vec<GameEvent>) {
    if world.remaining_pellets == 0 {
        world.status = Status::Won;
        events.push(GameEvent::Won);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Direction, Rgb};
    use crate::domain::tile::Tile;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0xC0FFEE)
    }

    fn playing(mut s: GameState) -> GameState {
        s.status = Status::Playing;
        s
    }

    fn ghost(id: usize, x: i32, y: i32, dir: Direction) -> Ghost {
        Ghost::new(id, "Test", Position::new(x, y), dir, Rgb(200, 0, 0))
    }

    /// Playing state on a text-diagram board. Boards that must not
    /// count as cleared carry a walled-in pellet row of their own.
    fn layout(rows: &[&str], spawn: (i32, i32), ghosts: Vec<Ghost>) -> GameState {
        playing(GameState::with_layout(
            Board::from_rows(rows),
            Position::new(spawn.0, spawn.1),
            ghosts,
        ))
    }

    // ── Status gating ──

    #[test]
    fn step_outside_playing_is_identity() {
        let mut r = rng();
        for status in [Status::Ready, Status::GameOver, Status::Won] {
            let mut s = GameState::new();
            s.status = status;
            let (next, events) = step(&s, &mut r);
            assert_eq!(next, s);
            assert!(events.is_empty());
        }
    }

    #[test]
    fn step_never_mutates_previous_snapshot() {
        let s = playing(GameState::new());
        let before = s.clone();
        let (next, _) = step(&s, &mut rng());
        assert_eq!(s, before);
        assert_eq!(next.tick, 1);
    }

    // ── Muncher ──

    #[test]
    fn move_right_from_spawn_eats_pellet() {
        let mut s = playing(GameState::new());
        let start_pellets = s.remaining_pellets;
        s.player.queued = Direction::Right;
        assert_eq!(s.board.tile_at(Position::new(10, 16)), Some(Tile::Pellet));

        let (next, events) = step(&s, &mut rng());

        assert_eq!(next.player.position, Position::new(10, 16));
        assert_eq!(next.player.direction, Direction::Right);
        assert_eq!(next.score, 10);
        assert_eq!(next.board.tile_at(Position::new(10, 16)), Some(Tile::Empty));
        assert_eq!(next.remaining_pellets, start_pellets - 1);
        assert!(events.contains(&GameEvent::PelletEaten { at: Position::new(10, 16) }));
    }

    #[test]
    fn queued_turn_waits_for_opening() {
        let mut s = layout(&[
            "#####",
            "#   #",
            "### #",
            "#o###",
        ], (1, 1), vec![]);
        s.player.direction = Direction::Right;
        s.player.queued = Direction::Down;
        let mut r = rng();

        // (1,2) is wall: keep heading Right.
        let (s, _) = step(&s, &mut r);
        assert_eq!(s.player.position, Position::new(2, 1));
        assert_eq!(s.player.direction, Direction::Right);
        let (s, _) = step(&s, &mut r);
        assert_eq!(s.player.position, Position::new(3, 1));
        // Below (3,1) is open: the queued turn is taken.
        let (s, _) = step(&s, &mut r);
        assert_eq!(s.player.direction, Direction::Down);
        assert_eq!(s.player.position, Position::new(3, 2));
    }

    #[test]
    fn blocked_muncher_stays_and_keeps_animation() {
        let mut s = layout(&[
            "####",
            "#  #",
            "#o##",
        ], (2, 1), vec![]);
        s.player.direction = Direction::Right;
        s.player.queued = Direction::Right;
        let mouth = s.player.mouth_open;
        let (next, _) = step(&s, &mut rng());
        assert_eq!(next.player.position, Position::new(2, 1));
        assert_eq!(next.player.mouth_open, mouth);
    }

    #[test]
    fn successful_step_toggles_mouth() {
        let mut s = layout(&[
            "#####",
            "#   #",
            "#o###",
        ], (1, 1), vec![]);
        s.player.queued = Direction::Right;
        let mut r = rng();
        let (a, _) = step(&s, &mut r);
        let (b, _) = step(&a, &mut r);
        assert_ne!(a.player.mouth_open, s.player.mouth_open);
        assert_ne!(b.player.mouth_open, a.player.mouth_open);
    }

    #[test]
    fn muncher_uses_tunnel() {
        let mut s = layout(&[
            "#####",
            "  .  ",
            "#o###",
        ], (0, 1), vec![]);
        s.player.queued = Direction::Left;
        let (next, _) = step(&s, &mut rng());
        assert_eq!(next.player.position, Position::new(4, 1));
    }

    // ── Pickup ──

    #[test]
    fn power_pellet_frightens_every_ghost() {
        let mut s = layout(&[
            "#########",
            "# o.    #",
            "#########",
            "#.#######",
        ], (1, 1), vec![ghost(0, 7, 1, Direction::Left), ghost(1, 6, 1, Direction::Left)]);
        s.ghosts[1].mode = GhostMode::Eaten;
        s.player.queued = Direction::Right;

        let (next, events) = step(&s, &mut rng());

        assert_eq!(next.score, 50);
        assert_eq!(next.frightened_ticks_left, FRIGHTENED_TICKS);
        assert!(next.ghosts.iter().all(|g| g.mode == GhostMode::Frightened));
        assert!(events.contains(&GameEvent::PowerPelletEaten { at: Position::new(2, 1) }));
    }

    #[test]
    fn pellets_never_increase_and_match_board() {
        let mut s = playing(GameState::new());
        s.player.queued = Direction::Left;
        let mut r = rng();
        let mut prev = s.remaining_pellets;
        for _ in 0..60 {
            let (next, _) = step(&s, &mut r);
            assert!(next.remaining_pellets <= prev);
            assert_eq!(next.remaining_pellets, next.board.pellet_count());
            prev = next.remaining_pellets;
            s = next;
            if s.status != Status::Playing { break; }
        }
    }

    // ── Frightened timer ──

    #[test]
    fn frightened_expiry_reverts_to_chase() {
        let mut s = playing(GameState::new());
        s.frightened_ticks_left = 1;
        for g in &mut s.ghosts {
            g.mode = GhostMode::Frightened;
        }
        // Park the muncher far from the house so no contact happens.
        s.player.position = Position::new(1, 1);
        s.player_spawn = Position::new(1, 1);

        let (next, events) = step(&s, &mut rng());

        assert_eq!(next.frightened_ticks_left, 0);
        assert!(next.ghosts.iter().all(|g| g.mode == GhostMode::Chase));
        assert!(events.contains(&GameEvent::FrightenedEnded));
    }

    #[test]
    fn frightened_timer_counts_down() {
        let mut s = playing(GameState::new());
        s.frightened_ticks_left = 5;
        s.player.position = Position::new(1, 1);
        let (next, events) = step(&s, &mut rng());
        assert_eq!(next.frightened_ticks_left, 4);
        assert!(!events.contains(&GameEvent::FrightenedEnded));
    }

    // ── Ghosts ──

    #[test]
    fn easy_chasers_skip_odd_ticks() {
        let mut s = layout(&[
            "#########",
            "#       #",
            "#########",
            "#.#######",
        ], (1, 1), vec![ghost(0, 6, 1, Direction::Left)]);
        s.difficulty = Difficulty::Easy;
        let mut r = rng();

        // tick becomes 1 (odd): no move.
        let (a, _) = step(&s, &mut r);
        assert_eq!(a.ghosts[0].position, Position::new(6, 1));
        // tick 2 (even): moves.
        let (b, _) = step(&a, &mut r);
        assert_ne!(b.ghosts[0].position, Position::new(6, 1));
    }

    #[test]
    fn easy_frightened_ghosts_are_not_throttled() {
        let mut s = layout(&[
            "#########",
            "#       #",
            "#########",
            "#.#######",
        ], (1, 1), vec![ghost(0, 6, 1, Direction::Left)]);
        s.difficulty = Difficulty::Easy;
        s.frightened_ticks_left = 10;
        s.ghosts[0].mode = GhostMode::Frightened;
        let (a, _) = step(&s, &mut rng());
        assert_ne!(a.ghosts[0].position, Position::new(6, 1));
    }

    #[test]
    fn eaten_ghost_homes_then_recovers() {
        let mut s = layout(&[
            "#######",
            "#     #",
            "###H###",
            "#.#####",
        ], (1, 1), vec![ghost(0, 3, 2, Direction::Up)]);
        s.ghosts[0].position = Position::new(5, 1);
        s.ghosts[0].mode = GhostMode::Eaten;
        let mut r = rng();

        let (a, _) = step(&s, &mut r);
        assert_eq!(a.ghosts[0].position, Position::new(4, 1));
        let (b, _) = step(&a, &mut r);
        assert_eq!(b.ghosts[0].position, Position::new(3, 1));
        // Eaten ghosts may re-enter the house.
        let (c, _) = step(&b, &mut r);
        assert_eq!(c.ghosts[0].position, Position::new(3, 2));
        assert_eq!(c.ghosts[0].mode, GhostMode::Eaten);
        // Arrival is noticed on the next tick, without moving.
        let (d, events) = step(&c, &mut r);
        assert_eq!(d.ghosts[0].position, Position::new(3, 2));
        assert_eq!(d.ghosts[0].mode, GhostMode::Chase);
        assert!(events.contains(&GameEvent::GhostRecovered { id: 0 }));
    }

    #[test]
    fn ghost_never_reverses_with_options() {
        let mut s = playing(GameState::new());
        s.difficulty = Difficulty::Hard;
        s.player.queued = Direction::Left;
        let mut r = rng();
        for _ in 0..80 {
            let (next, _) = step(&s, &mut r);
            if next.status != Status::Playing || next.lives != s.lives { break; }
            for (before, after) in s.ghosts.iter().zip(&next.ghosts) {
                if before.mode != GhostMode::Chase || after.position == before.position { continue; }
                let options = ai::valid_moves(&s.board, &Ghost { direction: Direction::None, ..before.clone() });
                if options.len() >= 2 && before.direction != Direction::None {
                    assert_ne!(after.direction, before.direction.opposite(), "{} reversed", before.name);
                }
            }
            s = next;
        }
    }

    #[test]
    fn hard_ghost_converges_along_shortest_path() {
        let mut s = layout(&[
            "#######",
            "#     #",
            "#######",
            "#.#####",
        ], (5, 1), vec![ghost(0, 2, 1, Direction::Right)]);
        s.difficulty = Difficulty::Hard;
        let mut r = rng();

        let mut dist = ai::path_distance(&s.board, s.ghosts[0].position, s.player.position).unwrap();
        assert_eq!(dist, 3);
        for _ in 0..2 {
            let (next, _) = step(&s, &mut r);
            assert_eq!(next.player.position, Position::new(5, 1));
            let d = ai::path_distance(&next.board, next.ghosts[0].position, next.player.position).unwrap();
            assert!(d < dist);
            dist = d;
            s = next;
        }
        assert_eq!(dist, 1);
        // Third tick: the ghost reaches the muncher and a life is lost.
        let (next, events) = step(&s, &mut r);
        assert_eq!(next.lives, 2);
        assert!(events.contains(&GameEvent::LifeLost { lives_left: 2 }));
    }

    // ── Collision ──

    #[test]
    fn eating_frightened_ghost_scores_200() {
        let mut s = layout(&[
            "#####",
            "#   #",
            "#####",
            "#.###",
        ], (1, 1), vec![ghost(0, 3, 1, Direction::Left)]);
        s.frightened_ticks_left = 20;
        s.ghosts[0].mode = GhostMode::Frightened;
        s.player.queued = Direction::Right;
        let (next, events) = step(&s, &mut rng());
        // Muncher steps to (2,1); the frightened ghost can only go Left to (2,1).
        assert_eq!(next.player.position, Position::new(2, 1));
        assert_eq!(next.ghosts[0].mode, GhostMode::Eaten);
        assert_eq!(next.score, 200);
        assert!(events.contains(&GameEvent::GhostEaten { id: 0 }));
    }

    #[test]
    fn chase_contact_respawns_everyone() {
        let mut s = layout(&[
            "#######",
            "#     #",
            "#######",
            "#.#####",
        ], (1, 1), vec![ghost(0, 5, 1, Direction::Left)]);
        s.player.position = Position::new(3, 1);
        s.player.queued = Direction::Right;
        s.score = 70;
        s.difficulty = Difficulty::Hard;
        let (next, _) = step(&s, &mut rng());
        assert_eq!(next.lives, 2);
        assert_eq!(next.status, Status::Playing);
        assert_eq!(next.player.position, Position::new(1, 1));
        assert_eq!(next.player.direction, Direction::None);
        assert_eq!(next.ghosts[0].position, Position::new(5, 1));
        assert_eq!(next.ghosts[0].direction, Direction::Left);
        assert_eq!(next.score, 70);
        assert_eq!(next.difficulty, Difficulty::Hard);
    }

    #[test]
    fn respawn_mid_frightened_keeps_timer() {
        let mut s = layout(&[
            "#######",
            "#     #",
            "#######",
            "#.#####",
        ], (1, 1), vec![ghost(0, 5, 1, Direction::Left), ghost(1, 4, 1, Direction::Left)]);
        s.player.position = Position::new(4, 1);
        s.frightened_ticks_left = 20;
        s.ghosts[1].mode = GhostMode::Frightened;
        s.ghosts[1].position = Position::new(1, 1);
        let (next, _) = step(&s, &mut rng());
        assert_eq!(next.lives, 2);
        assert_eq!(next.frightened_ticks_left, 19);
        assert!(next.ghosts.iter().all(|g| g.mode == GhostMode::Chase));
    }

    #[test]
    fn last_life_ends_game() {
        let mut s = layout(&[
            "#######",
            "#     #",
            "#######",
            "#.#####",
        ], (1, 1), vec![ghost(0, 5, 1, Direction::Left)]);
        s.lives = 1;
        s.player.position = Position::new(3, 1);
        s.player.queued = Direction::Right;
        let (next, events) = step(&s, &mut rng());
        assert_eq!(next.lives, 0);
        assert_eq!(next.status, Status::GameOver);
        assert!(events.contains(&GameEvent::GameOver));
        // Terminal: further ticks change nothing.
        let (after, _) = step(&next, &mut rng());
        assert_eq!(after, next);
    }

    #[test]
    fn frightened_ghost_behind_fatal_contact_is_still_eaten() {
        let mut s = layout(&[
            "#######",
            "#     #",
            "#### ##",
            "#######",
            "#.#####",
        ], (1, 1), vec![ghost(0, 5, 1, Direction::Left), ghost(1, 4, 2, Direction::Up)]);
        s.lives = 1;
        s.player.position = Position::new(3, 1);
        s.player.queued = Direction::Right;
        s.frightened_ticks_left = 20;
        s.ghosts[1].mode = GhostMode::Frightened;
        // All three meet on (4,1): the chaser ends the game, the
        // frightened ghost after it in the roster is still eaten.
        let (next, events) = step(&s, &mut rng());
        assert_eq!(next.status, Status::GameOver);
        assert_eq!(next.lives, 0);
        assert_eq!(next.ghosts[1].mode, GhostMode::Eaten);
        assert_eq!(next.score, 200);
        assert!(events.contains(&GameEvent::GhostEaten { id: 1 }));
    }

    #[test]
    fn second_chaser_after_game_over_adds_nothing() {
        let mut s = layout(&[
            "#######",
            "#     #",
            "#### ##",
            "#######",
            "#.#####",
        ], (1, 1), vec![ghost(0, 5, 1, Direction::Left), ghost(1, 4, 2, Direction::Up)]);
        s.lives = 1;
        s.player.position = Position::new(3, 1);
        s.player.queued = Direction::Right;
        let (next, events) = step(&s, &mut rng());
        assert_eq!(next.status, Status::GameOver);
        assert_eq!(next.lives, 0);
        assert_eq!(events.iter().filter(|e| **e == GameEvent::GameOver).count(), 1);
        assert_eq!(events.iter().filter(|e| matches!(e, GameEvent::LifeLost { .. })).count(), 1);
    }

    #[test]
    fn eaten_ghost_contact_is_harmless() {
        let mut s = layout(&[
            "#######",
            "#     #",
            "#######",
            "#.#####",
        ], (1, 1), vec![ghost(0, 1, 1, Direction::Right)]);
        s.ghosts[0].position = Position::new(3, 1);
        s.ghosts[0].mode = GhostMode::Eaten;
        s.player.queued = Direction::Right;
        // Both land on (2,1): the homing ghost passes through.
        let (next, events) = step(&s, &mut rng());
        assert_eq!(next.player.position, Position::new(2, 1));
        assert_eq!(next.ghosts[0].position, Position::new(2, 1));
        assert_eq!(next.lives, 3);
        assert_eq!(next.score, 0);
        assert!(events.is_empty());
    }

    // ── Win ──

    #[test]
    fn last_pellet_wins() {
        let mut s = layout(&[
            "#####",
            "# . #",
            "#####",
        ], (1, 1), vec![]);
        s.player.queued = Direction::Right;
        let (next, events) = step(&s, &mut rng());
        assert_eq!(next.remaining_pellets, 0);
        assert_eq!(next.status, Status::Won);
        assert!(events.contains(&GameEvent::Won));
    }

    #[test]
    fn last_pellet_wins_even_when_last_life_is_lost() {
        let mut s = layout(&[
            "#######",
            "# .   #",
            "#######",
        ], (1, 1), vec![ghost(0, 3, 1, Direction::Left)]);
        s.lives = 1;
        s.player.queued = Direction::Right;
        let (next, events) = step(&s, &mut rng());
        assert_eq!(next.lives, 0);
        assert_eq!(next.status, Status::Won);
        assert!(events.contains(&GameEvent::GameOver));
        assert!(events.contains(&GameEvent::Won));
    }
}

/// Movement resolver.
///
/// Computes candidate cells only. Wall checks are the caller's job
/// (`Board::is_wall`), so the same function serves "can I step here"
/// for the muncher, valid-move enumeration for ghosts and BFS expansion.

use super::entity::{Direction, Position};

/// Unit step in `dir`, then x wraps modulo `width` (tunnels).
/// y never wraps: stepping off the top or bottom yields an
/// out-of-bounds cell, which `Board::is_wall` treats as wall.
#[inline]
pub fn next_position(pos: Position, dir: Direction, width: usize) -> Position {
    let (dx, dy) = dir.delta();
    let w = width.max(1) as i32;
    Position {
        x: (pos.x + dx).rem_euclid(w),
        y: pos.y + dy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 19;

    #[test]
    fn wraps_left_edge_to_right() {
        for y in 0..22 {
            assert_eq!(next_position(Position::new(0, y), Direction::Left, W), Position::new(18, y));
        }
    }

    #[test]
    fn wraps_right_edge_to_left() {
        for y in 0..22 {
            assert_eq!(next_position(Position::new(18, y), Direction::Right, W), Position::new(0, y));
        }
    }

    #[test]
    fn y_is_never_wrapped() {
        assert_eq!(next_position(Position::new(4, 0), Direction::Up, W), Position::new(4, -1));
        assert_eq!(next_position(Position::new(4, 21), Direction::Down, W), Position::new(4, 22));
    }

    #[test]
    fn none_stays_put() {
        let p = Position::new(7, 7);
        assert_eq!(next_position(p, Direction::None, W), p);
    }

    #[test]
    fn interior_steps() {
        let p = Position::new(5, 5);
        assert_eq!(next_position(p, Direction::Up, W), Position::new(5, 4));
        assert_eq!(next_position(p, Direction::Down, W), Position::new(5, 6));
        assert_eq!(next_position(p, Direction::Left, W), Position::new(4, 5));
        assert_eq!(next_position(p, Direction::Right, W), Position::new(6, 5));
    }
}

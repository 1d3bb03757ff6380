/// Entities: the muncher and the ghosts, plus the small value types
/// (position, direction, mode, difficulty) they are built from.
/// Ghost behaviour is a mode tag on one shared struct; transitions
/// only ever flip the tag.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// Fixed enumeration order. Greedy tie-breaks and BFS expansion follow it.
    pub const MOVES: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::None => (0, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }
}

/// Ghost AI strength. Only changeable while a run is not in progress.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    /// Cycle through `ALL`, wrapping at both ends.
    pub fn cycled(self, forward: bool) -> Difficulty {
        let idx = Self::ALL.iter().position(|&d| d == self).unwrap_or(1);
        let next = if forward { (idx + 1) % 3 } else { (idx + 2) % 3 };
        Self::ALL[next]
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Player {
    pub position: Position,
    pub direction: Direction,
    /// Last input intent. Re-tried every tick until the way opens.
    pub queued: Direction,
    /// Flips on every successful step (mouth open/closed).
    pub mouth_open: bool,
}

impl Player {
    pub fn new(position: Position) -> Self {
        Player {
            position,
            direction: Direction::None,
            queued: Direction::None,
            mouth_open: false,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GhostMode {
    Chase,
    Frightened,
    /// Caught while frightened; homing back to its spawn cell.
    Eaten,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Ghost {
    pub id: usize,
    pub name: &'static str,
    pub position: Position,
    /// Spawn cell; also the recovery target while Eaten.
    pub home: Position,
    pub direction: Direction,
    pub spawn_direction: Direction,
    pub color: Rgb,
    pub mode: GhostMode,
}

impl Ghost {
    pub fn new(id: usize, name: &'static str, home: Position, direction: Direction, color: Rgb) -> Self {
        Ghost {
            id,
            name,
            position: home,
            home,
            direction,
            spawn_direction: direction,
            color,
            mode: GhostMode::Chase,
        }
    }

    /// Fresh copy of this ghost as it was at spawn.
    pub fn respawned(&self) -> Self {
        Ghost::new(self.id, self.name, self.home, self.spawn_direction, self.color)
    }

    pub fn is_home(&self) -> bool {
        self.position == self.home
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_pairs() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::None.opposite(), Direction::None);
        for d in Direction::MOVES {
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn manhattan_is_symmetric() {
        let a = Position::new(1, 7);
        let b = Position::new(4, 3);
        assert_eq!(a.manhattan(b), 7);
        assert_eq!(b.manhattan(a), 7);
        assert_eq!(a.manhattan(a), 0);
    }

    #[test]
    fn difficulty_cycles_both_ways() {
        assert_eq!(Difficulty::Normal.cycled(true), Difficulty::Hard);
        assert_eq!(Difficulty::Hard.cycled(true), Difficulty::Easy);
        assert_eq!(Difficulty::Easy.cycled(false), Difficulty::Hard);
        assert_eq!(Difficulty::default(), Difficulty::Normal);
    }

    #[test]
    fn respawn_restores_spawn_state() {
        let mut g = Ghost::new(2, "Inky", Position::new(10, 10), Direction::Down, Rgb(0, 255, 255));
        g.position = Position::new(3, 4);
        g.direction = Direction::Left;
        g.mode = GhostMode::Eaten;
        let fresh = g.respawned();
        assert_eq!(fresh.position, Position::new(10, 10));
        assert_eq!(fresh.direction, Direction::Down);
        assert_eq!(fresh.mode, GhostMode::Chase);
        assert!(fresh.is_home());
    }
}

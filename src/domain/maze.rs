/// Board: the maze grid plus the pellet-consumption overlay.
///
/// ## Layout legend (see `Tile::from_char`):
///   '#' = Wall          '.' = Pellet        'o' = Power pellet
///   'H' = Ghost house   ' ' = Path          '_' = Empty (no pellet)
///
/// The built-in maze is 19×22. Rows 8, 10 and 12 are open at both
/// edges: those are the tunnels, handled by x-wraparound in
/// `movement::next_position`.

use super::entity::{Direction, Ghost, Position, Rgb};
use super::tile::Tile;

const MAZE_ROWS: [&str; 22] = [
    "###################",
    "#........#.......o#",
    "#.##.###.#.###.##.#",
    "#o##.###.#.###.##.#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.###_#_###.####",
    "___#.#___H___#.#___",
    "####.#_##H##_#.####",
    ".....__#HHH#__.....",
    "####.#_#####_#.####",
    "___#.#_______#.#___",
    "####.#_#####_#.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#o.#....._.....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

pub const PLAYER_SPAWN: Position = Position::new(9, 16);

/// Fixed roster: (name, spawn, initial direction, colour).
const GHOST_ROSTER: [(&str, Position, Direction, Rgb); 4] = [
    ("Blinky", Position::new(9, 10), Direction::Left, Rgb(239, 68, 68)),
    ("Pinky", Position::new(8, 10), Direction::Up, Rgb(236, 72, 153)),
    ("Inky", Position::new(10, 10), Direction::Down, Rgb(6, 182, 212)),
    ("Clyde", Position::new(9, 9), Direction::Right, Rgb(249, 115, 22)),
];

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    tiles: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
}

impl Board {
    /// Parse a map diagram. Rows shorter than the first are padded with
    /// walls; unknown characters read as Path.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut tiles = vec![vec![Tile::Wall; width]; height];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if x >= width { break; }
                tiles[y][x] = Tile::from_char(ch).unwrap_or_default();
            }
        }
        Board { tiles, width, height }
    }

    /// The compiled-in maze.
    pub fn classic() -> Self {
        Board::from_rows(&MAZE_ROWS)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Tile at `pos`, or None outside the board.
    #[inline]
    pub fn tile_at(&self, pos: Position) -> Option<Tile> {
        if self.in_bounds(pos) {
            Some(self.tiles[pos.y as usize][pos.x as usize])
        } else {
            None
        }
    }

    /// Traversability test: out of bounds counts as wall.
    #[inline]
    pub fn is_wall(&self, pos: Position) -> bool {
        self.tile_at(pos).map_or(true, Tile::is_wall)
    }

    /// Membership test: out of bounds is not ghost house.
    #[inline]
    pub fn is_ghost_house(&self, pos: Position) -> bool {
        self.tile_at(pos).map_or(false, Tile::is_ghost_house)
    }

    /// Eat whatever is at `pos`. Returns the tile that was consumed,
    /// or None if there was nothing edible there.
    pub fn consume(&mut self, pos: Position) -> Option<Tile> {
        let tile = self.tile_at(pos)?;
        if !tile.is_edible() { return None; }
        self.tiles[pos.y as usize][pos.x as usize] = Tile::Empty;
        Some(tile)
    }

    /// Number of Pellet + PowerPellet tiles still on the board.
    pub fn pellet_count(&self) -> usize {
        self.tiles.iter().flatten().filter(|t| t.is_edible()).count()
    }

    /// Row-major iteration for the renderer.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.iter().map(Vec::as_slice)
    }
}

/// The four ghosts at their spawn cells.
pub fn classic_ghosts() -> Vec<Ghost> {
    GHOST_ROSTER
        .iter()
        .enumerate()
        .map(|(id, &(name, home, dir, color))| Ghost::new(id, name, home, dir, color))
        .collect()
}

/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Wall,
    Path,
    Pellet,      // +10, consumed on contact
    PowerPellet, // +50, frightens every ghost
    GhostHouse,  // Ghosts may leave but not re-enter
    Empty,       // A path cell whose pellet has been eaten
}

impl Tile {
    /// Does this tile block every agent?
    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// Is this part of the ghost house?
    pub fn is_ghost_house(self) -> bool {
        matches!(self, Tile::GhostHouse)
    }

    /// Does this tile still hold something to eat?
    pub fn is_edible(self) -> bool {
        matches!(self, Tile::Pellet | Tile::PowerPellet)
    }

    /// Score awarded for eating this tile, 0 if nothing to eat.
    pub fn score_value(self) -> u32 {
        match self {
            Tile::Pellet => 10,
            Tile::PowerPellet => 50,
            _ => 0,
        }
    }

    /// Map-diagram legend, shared by the built-in maze and test boards.
    pub fn from_char(ch: char) -> Option<Tile> {
        match ch {
            '#' => Some(Tile::Wall),
            ' ' => Some(Tile::Path),
            '.' => Some(Tile::Pellet),
            'o' => Some(Tile::PowerPellet),
            'H' => Some(Tile::GhostHouse),
            '_' => Some(Tile::Empty),
            _ => None,
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Path
    }
}

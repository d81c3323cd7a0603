/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so glyph semantics are centralized here.

// ── Stage map glyphs ──

pub const CH_GHOST: char = 'G';
pub const CH_TARGET: char = 'o';
pub const CH_POISON: char = 'X';
pub const CH_WALL_HASH: char = '#';
pub const CH_WALL_PIPE: char = '|';
pub const CH_WALL_DASH: char = '-';
pub const CH_BORDER: char = '+';
pub const CH_PLAYER: char = 'P';
pub const CH_SPACE: char = ' ';

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Space,
    Wall(char), // one of '#', '|', '-'
    Border,
    Target,
    Poison,
}

impl Tile {
    /// Static tile for a map glyph. Spawn markers (`G`, `P`) are floor.
    pub fn from_char(ch: char) -> Self {
        match ch {
            CH_WALL_HASH | CH_WALL_PIPE | CH_WALL_DASH => Tile::Wall(ch),
            CH_BORDER => Tile::Border,
            CH_TARGET => Tile::Target,
            CH_POISON => Tile::Poison,
            _ => Tile::Space,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Tile::Space => CH_SPACE,
            Tile::Wall(ch) => ch,
            Tile::Border => CH_BORDER,
            Tile::Target => CH_TARGET,
            Tile::Poison => CH_POISON,
        }
    }

    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Wall(_))
    }

    pub fn is_border(self) -> bool {
        matches!(self, Tile::Border)
    }

    /// Can an actor step onto this tile?
    pub fn is_passable(self) -> bool {
        !self.is_wall() && !self.is_border()
    }

    pub fn is_space(self) -> bool {
        matches!(self, Tile::Space)
    }

    pub fn is_target(self) -> bool {
        matches!(self, Tile::Target)
    }

    pub fn is_poison(self) -> bool {
        matches!(self, Tile::Poison)
    }
}

/// Is this glyph allowed in the enclosing top and bottom lines?
pub fn is_enclosure_glyph(ch: char) -> bool {
    matches!(ch, CH_BORDER | CH_WALL_HASH | CH_WALL_PIPE | CH_WALL_DASH)
}

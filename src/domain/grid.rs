/// Stage grid: the immutable tile field loaded from a validated map,
/// plus the bookkeeping both control loops query.
///
/// Coordinates are map coordinates (`x` = column, `y` = line, both 0-based).
/// Anything outside the field reads as border, so a lookup never fails and
/// every off-grid step is refused like a wall.

use super::tile::{Tile, CH_GHOST, CH_PLAYER, CH_TARGET};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Pos { x: self.x + dx, y: self.y + dy }
    }

    pub fn manhattan(self, other: Pos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Split map text into lines, tolerating CRLF and a trailing newline.
pub fn map_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    if lines.last().map_or(false, |l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Number of decimal digits in `n` (at least 1).
pub fn digits(n: usize) -> usize {
    let mut n = n / 10;
    let mut d = 1;
    while n > 0 {
        n /= 10;
        d += 1;
    }
    d
}

#[derive(Clone, Debug)]
pub struct Grid {
    tiles: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
    first_line: i32,
    last_line: i32,
    offset: i32,
    player_start: Pos,
    ghost_markers: usize,
    target_total: u32,
}

impl Grid {
    /// Build a grid from map text. The text is expected to have passed
    /// stage-map validation; short rows are padded with floor.
    pub fn parse(text: &str) -> Self {
        let lines = map_lines(text);
        let height = lines.len();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let mut tiles = vec![vec![Tile::Space; width]; height];
        let mut player_start = Pos::default();
        let mut ghost_markers = 0;
        let mut target_total = 0;

        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                match ch {
                    CH_PLAYER => player_start = Pos::new(x as i32, y as i32),
                    CH_GHOST => ghost_markers += 1,
                    CH_TARGET => target_total += 1,
                    _ => {}
                }
                tiles[y][x] = Tile::from_char(ch);
            }
        }

        Grid {
            tiles,
            width,
            height,
            first_line: 1,
            last_line: (height as i32 - 2).max(1),
            offset: (digits(height) + 1) as i32,
            player_start,
            ghost_markers,
            target_total,
        }
    }

    pub fn width(&self) -> i32 {
        self.width as i32
    }

    pub fn height(&self) -> i32 {
        self.height as i32
    }

    /// First line the player can stand on (just below the top enclosure).
    pub fn first_line(&self) -> i32 {
        self.first_line
    }

    /// Last line the player can stand on (just above the bottom enclosure).
    pub fn last_line(&self) -> i32 {
        self.last_line
    }

    /// Horizontal screen offset of column 0 (the line-number gutter width).
    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn player_start(&self) -> Pos {
        self.player_start
    }

    pub fn ghost_markers(&self) -> usize {
        self.ghost_markers
    }

    /// Count of collectible cells; the stage is won when all are eaten.
    pub fn target_total(&self) -> u32 {
        self.target_total
    }

    pub fn in_bounds(&self, p: Pos) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.width && (p.y as usize) < self.height
    }

    pub fn tile(&self, p: Pos) -> Tile {
        if !self.in_bounds(p) {
            return Tile::Border;
        }
        self.tiles[p.y as usize][p.x as usize]
    }

    // ── Cell predicates ──

    pub fn is_wall(&self, p: Pos) -> bool {
        self.tile(p).is_wall()
    }

    pub fn is_border(&self, p: Pos) -> bool {
        self.tile(p).is_border()
    }

    /// Wall, border, or off-grid.
    pub fn blocks(&self, p: Pos) -> bool {
        !self.tile(p).is_passable()
    }

    pub fn is_space(&self, p: Pos) -> bool {
        self.tile(p).is_space()
    }

    pub fn is_target(&self, p: Pos) -> bool {
        self.tile(p).is_target()
    }

    pub fn is_poison(&self, p: Pos) -> bool {
        self.tile(p).is_poison()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 22 x 10 stage shared by the crate's tests.
    /// Player starts at (3,2); 14 targets; poison at (15,1), (2,5), (13,8).
    pub const SAMPLE: &str = "\
++++++++++++++++++++++
+##o o o  ooo  X ####+
+  P               G +
+  ###   o   ###     +
+        |           +
+ X  o o o  -----  G +
+                    +
+####     o  o ######+
+     oo     X       +
++++++++++++++++++++++
";

    pub fn sample() -> Grid {
        Grid::parse(SAMPLE)
    }

    #[test]
    fn bookkeeping() {
        let g = sample();
        assert_eq!(g.width(), 22);
        assert_eq!(g.height(), 10);
        assert_eq!(g.first_line(), 1);
        assert_eq!(g.last_line(), 8);
        assert_eq!(g.offset(), 3);
        assert_eq!(g.player_start(), Pos::new(3, 2));
        assert_eq!(g.ghost_markers(), 2);
        assert_eq!(g.target_total(), 14);
    }

    #[test]
    fn predicates() {
        let g = sample();
        assert!(g.is_border(Pos::new(0, 4)));
        assert!(g.is_wall(Pos::new(1, 1)));
        assert!(g.is_wall(Pos::new(9, 4)));
        assert!(g.is_wall(Pos::new(12, 5)));
        assert!(g.is_target(Pos::new(3, 1)));
        assert!(g.is_poison(Pos::new(15, 1)));
        assert!(g.is_space(Pos::new(4, 2)));
        // markers become floor
        assert!(g.is_space(Pos::new(3, 2)));
        assert!(g.is_space(Pos::new(19, 2)));
    }

    #[test]
    fn off_grid_reads_as_border() {
        let g = sample();
        assert!(g.is_border(Pos::new(-1, 3)));
        assert!(g.is_border(Pos::new(22, 3)));
        assert!(g.blocks(Pos::new(5, 10)));
    }

    #[test]
    fn map_lines_handles_crlf_and_trailing_newline() {
        assert_eq!(map_lines("ab\r\ncd\r\n"), vec!["ab", "cd"]);
        assert_eq!(map_lines("ab\ncd"), vec!["ab", "cd"]);
        assert!(map_lines("").is_empty());
    }

    #[test]
    fn digit_counts() {
        assert_eq!(digits(1), 1);
        assert_eq!(digits(9), 1);
        assert_eq!(digits(10), 2);
        assert_eq!(digits(20), 2);
    }
}

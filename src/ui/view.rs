/// Stage painting: line-number gutter, map cells, ghosts, HUD, cursor.
///
/// Screen column = map column + gutter width. The HUD takes the two rows
/// below the map. The player is the terminal cursor, not a glyph.

use std::io;

use crossterm::style::Color;

use crate::domain::grid::{digits, Grid, Pos};
use crate::domain::tile::{Tile, CH_GHOST};
use crate::sim::session::{GameState, Session};

use super::renderer::Renderer;

const GUTTER: Color = Color::DarkYellow;
const HUD: Color = Color::White;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hud {
    /// 1-based
    pub level: usize,
    pub life: i32,
}

/// Line number right-aligned to `width` digits, plus one space.
pub fn line_number(n: usize, width: usize) -> String {
    format!("{n:>width$} ")
}

/// Smallest (columns, rows) that fits map, gutter and HUD.
pub fn required_size(grid: &Grid) -> (u16, u16) {
    let map = (grid.offset() + grid.width()) as usize;
    (map.max(hud_width(grid)) as u16, (grid.height() + 2) as u16)
}

/// Width of the score row with the longest status it can carry.
fn hud_width(grid: &Grid) -> usize {
    let t = grid.target_total();
    let longest = STATES.iter().map(|&st| status(st).len()).max().unwrap_or(0);
    format!("score: {t}/{t}   ").len() + longest
}

fn screen_pos(grid: &Grid, p: Pos) -> (u16, u16) {
    ((p.x + grid.offset()) as u16, p.y as u16)
}

/// Glyph and color a map cell shows right now.
pub fn look(s: &Session, p: Pos) -> (char, Color) {
    if s.is_enemy(p) {
        return (CH_GHOST, Color::Red);
    }
    let tile = s.grid().tile(p);
    let color = match tile {
        Tile::Target if s.is_collected(p) => Color::Green,
        Tile::Target => Color::White,
        Tile::Poison => Color::Red,
        Tile::Border => Color::Yellow,
        Tile::Wall(_) => Color::Blue,
        Tile::Space => Color::Reset,
    };
    (tile.glyph(), color)
}

const STATES: [GameState; 5] =
    [GameState::Pose, GameState::Continuing, GameState::Win, GameState::Lose, GameState::Quit];

fn status(state: GameState) -> &'static str {
    match state {
        GameState::Pose => "Enter: start  q: quit",
        GameState::Continuing => "",
        GameState::Win => "clear!",
        GameState::Lose => "caught! press any key",
        GameState::Quit => "bye",
    }
}

/// Full paint: clears the screen first.
pub fn paint_stage<R: Renderer>(screen: &mut R, s: &Session, hud: &Hud) -> io::Result<()> {
    let grid = s.grid();
    screen.clear()?;
    let width = digits(grid.height() as usize);
    for y in 0..grid.height() {
        screen.put_str(0, y as u16, &line_number(y as usize + 1, width), GUTTER)?;
        for x in 0..grid.width() {
            paint_cell(screen, s, Pos::new(x, y))?;
        }
    }
    finish(screen, s, hud)
}

/// Paint only the cells that changed since the last paint.
pub fn repaint<R: Renderer>(screen: &mut R, s: &mut Session, hud: &Hud) -> io::Result<()> {
    for p in s.take_damage() {
        paint_cell(screen, s, p)?;
    }
    finish(screen, s, hud)
}

fn paint_cell<R: Renderer>(screen: &mut R, s: &Session, p: Pos) -> io::Result<()> {
    if !s.grid().in_bounds(p) {
        return Ok(());
    }
    let (x, y) = screen_pos(s.grid(), p);
    let (ch, fg) = look(s, p);
    screen.put(x, y, ch, fg)
}

fn finish<R: Renderer>(screen: &mut R, s: &Session, hud: &Hud) -> io::Result<()> {
    let grid = s.grid();
    // full HUD width, so a shorter status overwrites the previous one
    let (cols, _) = required_size(grid);
    let cols = cols as usize;
    let row = grid.height() as u16;

    let score = format!("score: {}/{}   {}", s.score(), s.target_score(), status(s.game_state()));
    screen.put_str(0, row, &format!("{score:<cols$}"), HUD)?;
    let info = format!("level: {}  life: {}", hud.level, hud.life);
    screen.put_str(0, row + 1, &format!("{info:<cols$}"), HUD)?;

    let (cx, cy) = screen_pos(grid, s.player());
    screen.cursor(cx, cy)?;
    screen.show_cursor(true)?;
    screen.flush()
}

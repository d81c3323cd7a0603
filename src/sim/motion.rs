/// Player motion engine: the vim-style key state machine.
///
/// `Player` keeps the numeric prefix and the pending `g`; everything else
/// lives in the `Session`. Stepping motions move one cell at a time and run
/// the move-outcome check after every cell, so the player eats targets
/// they pass over and dies on the first ghost or poison in the way. A
/// multi-step motion stops as soon as the stage leaves `Continuing`.
/// Warps (`0 $ ^ gg G`) jump and are checked once, at the landing cell.

use std::sync::Arc;

use crate::domain::command::{parse_key, push_digit, Command, Word};
use crate::domain::grid::{Grid, Pos};

use super::session::Session;

#[derive(Clone, Copy)]
enum Line {
    First,
    Last,
}

#[derive(Debug, Default)]
pub struct Player {
    prefix: u32,
    pending_g: bool,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(&self) -> u32 {
        self.prefix
    }

    pub fn pending_g(&self) -> bool {
        self.pending_g
    }

    pub fn handle_key(&mut self, ch: char, s: &mut Session) {
        let cmd = parse_key(ch, self.prefix);
        self.apply(cmd, s);
    }

    pub fn apply(&mut self, cmd: Command, s: &mut Session) {
        if !s.is_running() {
            return;
        }

        if self.pending_g {
            // only `gg` completes the leader; anything else is dropped
            if cmd == Command::Leader {
                self.jump_to_line(s, Line::First);
            }
            self.reset();
            return;
        }

        match cmd {
            Command::Digit(d) => {
                self.prefix = push_digit(self.prefix, d);
                return;
            }
            Command::Leader => {
                self.pending_g = true;
                return;
            }
            Command::Cross(dir) => {
                let (dx, dy) = dir.delta();
                self.repeat(s, |s| step(s, dx, dy));
            }
            Command::Word(Word::NextStart) => self.repeat(s, next_word_start),
            Command::Word(Word::PrevStart) => self.repeat(s, prev_word_start),
            Command::Word(Word::End) => self.repeat(s, word_end),
            Command::LineStart => {
                let y = s.player().y;
                if let Some(x) = line_start(s.grid(), y) {
                    warp(s, Pos::new(x, y));
                }
            }
            Command::LineEnd => {
                let y = s.player().y;
                if let Some(x) = line_end(s.grid(), y) {
                    warp(s, Pos::new(x, y));
                }
            }
            Command::FirstWord => {
                let y = s.player().y;
                if let Some(x) = first_word(s.grid(), y) {
                    warp(s, Pos::new(x, y));
                }
            }
            Command::LastLine => self.jump_to_line(s, Line::Last),
            Command::Quit => s.quit(),
            Command::Unmapped => {}
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.prefix = 0;
        self.pending_g = false;
    }

    /// Run `motion` prefix times (once without a prefix), stopping early
    /// when it reports it cannot continue.
    fn repeat(&self, s: &mut Session, mut motion: impl FnMut(&mut Session) -> bool) {
        for _ in 0..self.prefix.max(1) {
            if !motion(s) {
                break;
            }
        }
    }

    fn jump_to_line(&self, s: &mut Session, which: Line) {
        let grid = Arc::clone(s.grid());
        let y = match (self.prefix, which) {
            (0, Line::First) => grid.first_line(),
            (0, Line::Last) => grid.last_line(),
            (n, _) => (i64::from(n) - 1).clamp(i64::from(grid.first_line()), i64::from(grid.last_line())) as i32,
        };
        if let Some(x) = first_word(&grid, y) {
            warp(s, Pos::new(x, y));
        }
    }
}

// ── Single steps ──

/// Move one cell. False when blocked or when the stage ended on arrival.
fn step(s: &mut Session, dx: i32, dy: i32) -> bool {
    if !s.is_running() {
        return false;
    }
    let next = s.player().offset(dx, dy);
    if s.grid().blocks(next) {
        return false;
    }
    s.set_player(next);
    s.settle();
    s.is_running()
}

fn warp(s: &mut Session, to: Pos) {
    s.set_player(to);
    s.settle();
}

// ── Word motions ──

/// `w`: walk right until a target that follows a blank.
fn next_word_start(s: &mut Session) -> bool {
    let mut after_blank = false;
    loop {
        if s.is_space_or_enemy(s.player()) {
            after_blank = true;
        }
        if !step(s, 1, 0) {
            return false;
        }
        if after_blank && s.grid().is_target(s.player()) {
            return true;
        }
    }
}

/// `b`: skip blanks to the left, then walk to the first cell of the word.
fn prev_word_start(s: &mut Session) -> bool {
    word_edge(s, -1)
}

/// `e`: skip blanks to the right, then walk to the last cell of the word.
fn word_end(s: &mut Session) -> bool {
    word_edge(s, 1)
}

fn word_edge(s: &mut Session, dx: i32) -> bool {
    while s.is_space_or_enemy(s.player().offset(dx, 0)) {
        if !step(s, dx, 0) {
            break;
        }
    }
    while !s.is_space_or_enemy(s.player().offset(dx, 0)) {
        if !step(s, dx, 0) {
            return false;
        }
    }
    true
}

// ── Line targets ──

/// First cell after the left border and any walls hugging it.
fn line_start(grid: &Grid, y: i32) -> Option<i32> {
    let border = (0..grid.width()).find(|&x| grid.is_border(Pos::new(x, y)))?;
    let mut x = border + 1;
    while grid.is_wall(Pos::new(x, y)) {
        x += 1;
    }
    (!grid.blocks(Pos::new(x, y))).then_some(x)
}

/// Mirror of `line_start` from the right border.
fn line_end(grid: &Grid, y: i32) -> Option<i32> {
    let border = (0..grid.width()).rev().find(|&x| grid.is_border(Pos::new(x, y)))?;
    let mut x = border - 1;
    while grid.is_wall(Pos::new(x, y)) {
        x -= 1;
    }
    (!grid.blocks(Pos::new(x, y))).then_some(x)
}

/// First target or poison at or after the line start; the line start itself
/// when the line holds neither.
fn first_word(grid: &Grid, y: i32) -> Option<i32> {
    let start = line_start(grid, y)?;
    let word = (start..grid.width()).find(|&x| {
        let p = Pos::new(x, y);
        grid.is_target(p) || grid.is_poison(p)
    });
    Some(word.unwrap_or(start))
}

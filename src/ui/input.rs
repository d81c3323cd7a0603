/// Keyboard input: the blocking `KeySource` seam and its crossterm reader.
///
/// Keys reach the game as plain characters. Enter arrives as `'\n'`, Escape
/// as `'\x1b'`, and Ctrl-C as `'q'` so it always quits.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub const KEY_ENTER: char = '\n';
pub const KEY_ESC: char = '\x1b';

pub trait KeySource {
    /// Block until the next key press.
    fn next_key(&mut self) -> io::Result<char>;
}

pub struct TermKeys;

impl KeySource for TermKeys {
    fn next_key(&mut self) -> io::Result<char> {
        loop {
            if let Event::Key(key) = event::read()? {
                if let Some(ch) = key_char(key) {
                    return Ok(ch);
                }
            }
        }
    }
}

/// Map a crossterm key event to a game key; `None` for releases and keys
/// without a character.
pub fn key_char(key: KeyEvent) -> Option<char> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some('q');
    }
    match key.code {
        KeyCode::Char(c) => Some(c),
        KeyCode::Enter => Some(KEY_ENTER),
        KeyCode::Esc => Some(KEY_ESC),
        _ => None,
    }
}

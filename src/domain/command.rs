/// Key-to-command mapping for the vim-style motions.
///
/// `parse_key` is the only place that knows about key codes; the motion
/// engine works on `Command` values. The mapping depends on the pending
/// numeric prefix because `0` is a digit after `1`-`9` and a line-start
/// warp otherwise.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cross {
    Left,
    Down,
    Up,
    Right,
}

impl Cross {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Cross::Left => (-1, 0),
            Cross::Down => (0, 1),
            Cross::Up => (0, -1),
            Cross::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Word {
    /// `w`: beginning of the next word
    NextStart,
    /// `b`: beginning of the current or previous word
    PrevStart,
    /// `e`: end of the current or next word
    End,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    /// Prefix digit (`1`-`9`, or `0` after a non-zero prefix).
    Digit(u32),
    Cross(Cross),
    Word(Word),
    /// `0`
    LineStart,
    /// `$`
    LineEnd,
    /// `^`
    FirstWord,
    /// `g`: first half of `gg`
    Leader,
    /// `G`
    LastLine,
    /// `q`
    Quit,
    /// Any key without a meaning; clears pending state.
    Unmapped,
}

/// Does `ch` extend the numeric prefix given the current `prefix`?
pub fn accepts_digit(ch: char, prefix: u32) -> bool {
    match ch.to_digit(10) {
        Some(0) => prefix != 0,
        Some(_) => true,
        None => false,
    }
}

/// Map one key to a command.
pub fn parse_key(ch: char, prefix: u32) -> Command {
    if accepts_digit(ch, prefix) {
        // accepts_digit guarantees a decimal digit
        return Command::Digit(ch.to_digit(10).unwrap_or(0));
    }
    match ch {
        'h' => Command::Cross(Cross::Left),
        'j' => Command::Cross(Cross::Down),
        'k' => Command::Cross(Cross::Up),
        'l' => Command::Cross(Cross::Right),
        'w' => Command::Word(Word::NextStart),
        'b' => Command::Word(Word::PrevStart),
        'e' => Command::Word(Word::End),
        '0' => Command::LineStart,
        '$' => Command::LineEnd,
        '^' => Command::FirstWord,
        'g' => Command::Leader,
        'G' => Command::LastLine,
        'q' => Command::Quit,
        _ => Command::Unmapped,
    }
}

/// Append a digit to a prefix, saturating instead of overflowing.
pub fn push_digit(prefix: u32, digit: u32) -> u32 {
    prefix.saturating_mul(10).saturating_add(digit)
}

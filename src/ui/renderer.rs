/// Presentation layer: the `Renderer` seam and its crossterm terminal.
///
/// The terminal keeps a copy of what it last drew per cell. `put` compares
/// against it and only queues terminal commands for cells that change; all
/// commands are batched with `queue!` and written once on `flush`.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

/// Drawing surface used by the game. Coordinates are terminal cells.
pub trait Renderer {
    /// (columns, rows)
    fn size(&self) -> io::Result<(u16, u16)>;
    fn clear(&mut self) -> io::Result<()>;
    fn put(&mut self, x: u16, y: u16, ch: char, fg: Color) -> io::Result<()>;
    /// Glyph and color last drawn at a cell, if any.
    fn cell(&self, x: u16, y: u16) -> Option<(char, Color)>;
    fn cursor(&mut self, x: u16, y: u16) -> io::Result<()>;
    fn show_cursor(&mut self, visible: bool) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;

    fn put_str(&mut self, x: u16, y: u16, text: &str, fg: Color) -> io::Result<()> {
        for (i, ch) in text.chars().enumerate() {
            self.put(x.saturating_add(i as u16), y, ch, fg)?;
        }
        Ok(())
    }
}

// ── Back buffer ──

#[derive(Clone, Debug, Default)]
pub struct CellBuffer {
    width: u16,
    height: u16,
    cells: Vec<Option<(char, Color)>>,
}

impl CellBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        CellBuffer {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<(char, Color)> {
        self.index(x, y).and_then(|i| self.cells[i])
    }

    /// Store a cell; false when it already held the same thing or lies
    /// off the buffer.
    pub fn set(&mut self, x: u16, y: u16, ch: char, fg: Color) -> bool {
        match self.index(x, y) {
            Some(i) if self.cells[i] != Some((ch, fg)) => {
                self.cells[i] = Some((ch, fg));
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.cells.fill(None);
    }
}

// ── Crossterm terminal ──

pub struct Terminal {
    writer: BufWriter<io::Stdout>,
    back: CellBuffer,
}

impl Terminal {
    pub fn new() -> Self {
        Terminal {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            back: CellBuffer::default(),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )?;
        let (tw, th) = terminal::size()?;
        self.back = CellBuffer::new(tw, th);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }
}

impl Renderer for Terminal {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn clear(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size()?;
        if (tw, th) != (self.back.width, self.back.height) {
            self.back = CellBuffer::new(tw, th);
        } else {
            self.back.reset();
        }
        queue!(self.writer, ResetColor, Clear(ClearType::All))
    }

    fn put(&mut self, x: u16, y: u16, ch: char, fg: Color) -> io::Result<()> {
        if !self.back.set(x, y, ch, fg) {
            return Ok(());
        }
        queue!(self.writer, MoveTo(x, y), SetForegroundColor(fg), Print(ch))
    }

    fn cell(&self, x: u16, y: u16) -> Option<(char, Color)> {
        self.back.get(x, y)
    }

    fn cursor(&mut self, x: u16, y: u16) -> io::Result<()> {
        queue!(self.writer, MoveTo(x, y))
    }

    fn show_cursor(&mut self, visible: bool) -> io::Result<()> {
        if visible {
            queue!(self.writer, cursor::Show)
        } else {
            queue!(self.writer, cursor::Hide)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory screen for tests.
    #[derive(Debug)]
    pub struct MemScreen {
        pub cells: CellBuffer,
        pub cursor: (u16, u16),
        pub cursor_visible: bool,
        pub flushes: usize,
        size: (u16, u16),
    }

    impl MemScreen {
        pub fn new(width: u16, height: u16) -> Self {
            MemScreen {
                cells: CellBuffer::new(width, height),
                cursor: (0, 0),
                cursor_visible: false,
                flushes: 0,
                size: (width, height),
            }
        }

        pub fn glyph(&self, x: u16, y: u16) -> char {
            self.cells.get(x, y).map_or(' ', |(ch, _)| ch)
        }

        pub fn row(&self, y: u16) -> String {
            (0..self.size.0).map(|x| self.glyph(x, y)).collect::<String>().trim_end().to_string()
        }
    }

    impl Renderer for MemScreen {
        fn size(&self) -> io::Result<(u16, u16)> {
            Ok(self.size)
        }

        fn clear(&mut self) -> io::Result<()> {
            self.cells.reset();
            Ok(())
        }

        fn put(&mut self, x: u16, y: u16, ch: char, fg: Color) -> io::Result<()> {
            self.cells.set(x, y, ch, fg);
            Ok(())
        }

        fn cell(&self, x: u16, y: u16) -> Option<(char, Color)> {
            self.cells.get(x, y)
        }

        fn cursor(&mut self, x: u16, y: u16) -> io::Result<()> {
            self.cursor = (x, y);
            Ok(())
        }

        fn show_cursor(&mut self, visible: bool) -> io::Result<()> {
            self.cursor_visible = visible;
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn buffer_reports_changes_only() {
        let mut b = CellBuffer::new(4, 2);
        assert!(b.set(1, 1, 'o', Color::White));
        assert!(!b.set(1, 1, 'o', Color::White));
        assert!(b.set(1, 1, 'o', Color::Green));
        assert_eq!(b.get(1, 1), Some(('o', Color::Green)));
        assert!(!b.set(4, 0, 'x', Color::White));
        assert_eq!(b.get(9, 9), None);
        b.reset();
        assert_eq!(b.get(1, 1), None);
    }

    #[test]
    fn put_str_writes_left_to_right() {
        let mut s = MemScreen::new(10, 1);
        s.put_str(2, 0, "abc", Color::Yellow).expect("mem screen");
        assert_eq!(s.row(0), "  abc");
        assert_eq!(s.cell(4, 0), Some(('c', Color::Yellow)));
    }
}

/// Transition slides shown between stages.

use std::io;

use crossterm::style::Color;

use super::renderer::Renderer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scene {
    Start,
    YouWin,
    YouLose,
    Congrats,
    Goodbye,
}

impl Scene {
    pub fn text(self) -> &'static [&'static str] {
        match self {
            Scene::Start => &[
                "+------------------------------+",
                "|                              |",
                "|          P A C V I M         |",
                "|                              |",
                "|   eat every o, dodge the G   |",
                "|   h j k l  w b e  0 $ ^      |",
                "|   gg  G  and counts like 3w  |",
                "|                              |",
                "+------------------------------+",
            ],
            Scene::YouWin => &[
                "+------------------------------+",
                "|                              |",
                "|           YOU WIN!           |",
                "|                              |",
                "+------------------------------+",
            ],
            Scene::YouLose => &[
                "+------------------------------+",
                "|                              |",
                "|           YOU LOSE           |",
                "|                              |",
                "+------------------------------+",
            ],
            Scene::Congrats => &[
                "+------------------------------+",
                "|                              |",
                "|       CONGRATULATIONS!       |",
                "|     every stage is clear     |",
                "|                              |",
                "+------------------------------+",
            ],
            Scene::Goodbye => &[
                "+------------------------------+",
                "|                              |",
                "|           GOODBYE            |",
                "|                              |",
                "+------------------------------+",
            ],
        }
    }
}

/// Draw a scene in yellow at the top-left corner, cursor hidden.
pub fn show<R: Renderer>(screen: &mut R, scene: Scene) -> io::Result<()> {
    screen.clear()?;
    screen.show_cursor(false)?;
    for (y, line) in scene.text().iter().enumerate() {
        screen.put_str(0, y as u16, line, Color::Yellow)?;
    }
    screen.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::renderer::tests::MemScreen;

    #[test]
    fn scenes_are_rectangular() {
        for scene in [Scene::Start, Scene::YouWin, Scene::YouLose, Scene::Congrats, Scene::Goodbye] {
            let lines = scene.text();
            let width = lines[0].chars().count();
            assert!(lines.iter().all(|l| l.chars().count() == width), "{scene:?}");
        }
    }

    #[test]
    fn show_replaces_the_screen() {
        let mut screen = MemScreen::new(40, 12);
        screen.put(35, 11, 'x', Color::White).expect("mem screen");
        show(&mut screen, Scene::YouLose).expect("mem screen");
        assert_eq!(screen.row(2), "|           YOU LOSE           |");
        assert_eq!(screen.glyph(35, 11), ' ');
        assert!(!screen.cursor_visible);
        assert_eq!(screen.flushes, 1);
    }
}

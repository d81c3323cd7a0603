/// One ghost tick: every ghost takes one move, in spawn order.
///
/// Processing order per ghost:
///   1. Chase: first improving cell in the ring-scan table
///   2. Wander: one random open step when nothing improves
///   3. Move-outcome check for the player's cell
///
/// The tick stops between ghosts once the stage has ended, so a ghost that
/// catches the player is the last one to move.

use rand::Rng;

use crate::domain::ai;
use crate::domain::ring::Offset;
use super::session::Session;

pub fn tick<R: Rng>(s: &mut Session, table: &[Offset], rng: &mut R) {
    for i in 0..s.ghosts().len() {
        if !s.is_running() {
            break;
        }
        let here = s.ghosts()[i];
        let next = ai::chase(s.grid(), table, here, s.player())
            .or_else(|| ai::wander(s.grid(), here, rng));
        if let Some(to) = next {
            s.move_ghost(i, to);
            s.settle();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tests::sample;
    use crate::domain::grid::{Grid, Pos};
    use crate::domain::ring::ring_scan;
    use crate::sim::session::tests::running;
    use crate::sim::session::GameState;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn ghosts_close_in() {
        let mut s = running(sample(), vec![Pos::new(10, 2), Pos::new(10, 6)]);
        let table = ring_scan(2);
        let mut rng = StdRng::seed_from_u64(3);
        let before: Vec<i32> = s.ghosts().iter().map(|g| g.manhattan(s.player())).collect();
        tick(&mut s, &table, &mut rng);
        for (g, d) in s.ghosts().iter().zip(before) {
            assert!(g.manhattan(s.player()) < d);
            assert!(!s.grid().blocks(*g));
        }
        assert_eq!(s.game_state(), GameState::Continuing);
    }

    #[test]
    fn catching_the_player_loses_and_stops_the_tick() {
        // first ghost is adjacent; the second must not move after the catch
        let mut s = running(sample(), vec![Pos::new(4, 2), Pos::new(10, 6)]);
        let table = ring_scan(2);
        let mut rng = StdRng::seed_from_u64(3);
        tick(&mut s, &table, &mut rng);
        assert_eq!(s.game_state(), GameState::Lose);
        assert_eq!(s.ghosts(), &[Pos::new(3, 2), Pos::new(10, 6)]);
    }

    #[test]
    fn ghost_wanders_when_nothing_improves() {
        // player sealed off behind a wall column beyond the search radius
        let grid = Grid::parse("\
++++++++++++
+P   ###  G+
++++++++++++
");
        let mut s = running(grid, vec![Pos::new(10, 1)]);
        let table = ring_scan(2);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            tick(&mut s, &table, &mut rng);
            let g = s.ghosts()[0];
            assert!(g.x >= 8 && g.x <= 10 && g.y == 1, "ghost escaped to {g:?}");
        }
    }

    #[test]
    fn no_moves_after_quit() {
        let mut s = running(sample(), vec![Pos::new(10, 2)]);
        s.quit();
        let table = ring_scan(2);
        let mut rng = StdRng::seed_from_u64(0);
        tick(&mut s, &table, &mut rng);
        assert_eq!(s.ghosts(), &[Pos::new(10, 2)]);
    }
}

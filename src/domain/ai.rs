/// Ghost AI: random placement, ring-scan chase, and a wander fallback.
///
/// Pure decisions only. Callers apply the returned position and run the
/// move-outcome check.
///
/// Chase: walk the ring-scan table and take the first cell that is on the
/// grid, not a wall or border, and strictly closer (Manhattan) to the
/// player than the ghost is now. Cells beyond the first ring are reachable,
/// so a ghost may hop over a thin wall when no nearer cell improves.
///
/// Wander: when nothing in range improves, one random step among the
/// four directions that are not blocked.

use rand::seq::SliceRandom;
use rand::Rng;

use super::grid::{Grid, Pos};
use super::ring::Offset;

pub const MAX_GHOSTS: usize = 4;

/// Random draws allowed per stage before placement is declared impossible.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

const DIRS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// How many ghosts a stage spawns.
pub fn ghost_count(grid: &Grid) -> usize {
    grid.ghost_markers().min(MAX_GHOSTS)
}

/// Pick a random free cell for every ghost. `None` when the retry budget
/// runs out before all ghosts are placed.
pub fn place_ghosts<R: Rng>(grid: &Grid, rng: &mut R) -> Option<Vec<Pos>> {
    let wanted = ghost_count(grid);
    let mut placed: Vec<Pos> = Vec::with_capacity(wanted);
    if grid.width() <= 0 || grid.height() <= 0 {
        return if wanted == 0 { Some(placed) } else { None };
    }

    let mut attempts = 0;
    while placed.len() < wanted {
        if attempts >= MAX_PLACEMENT_ATTEMPTS {
            return None;
        }
        attempts += 1;

        let p = Pos::new(rng.gen_range(0..grid.width()), rng.gen_range(0..grid.height()));
        if grid.blocks(p) || p == grid.player_start() || placed.contains(&p) {
            continue;
        }
        placed.push(p);
    }
    Some(placed)
}

/// First ring-scan cell that brings the ghost strictly closer to the player.
pub fn chase(grid: &Grid, table: &[Offset], ghost: Pos, player: Pos) -> Option<Pos> {
    let current = ghost.manhattan(player);
    table
        .iter()
        .map(|o| ghost.offset(o.dx, o.dy))
        .find(|&c| grid.in_bounds(c) && !grid.blocks(c) && c.manhattan(player) < current)
}

/// One random unblocked step, or `None` when boxed in.
pub fn wander<R: Rng>(grid: &Grid, ghost: Pos, rng: &mut R) -> Option<Pos> {
    let open: Vec<Pos> = DIRS
        .iter()
        .map(|&(dx, dy)| ghost.offset(dx, dy))
        .filter(|&p| !grid.blocks(p))
        .collect();
    open.choose(rng).copied()
}

/// Session: the mutable state of one stage attempt.
///
/// Both control loops mutate a `Session`, always through the stage's
/// mutex. The game state lives in a `StateCell` the session shares with
/// the loops, so "is the stage still running?" can be read without the
/// lock. Every write to the state still goes through the session, which
/// keeps score and state consistent: the score reaches the target score
/// exactly when the state becomes `Win`.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::domain::grid::{Grid, Pos};

// ── Game state ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum GameState {
    /// Waiting for the player to start.
    Pose = 0,
    Continuing = 1,
    Quit = 2,
    Win = 3,
    Lose = 4,
}

impl GameState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => GameState::Pose,
            1 => GameState::Continuing,
            2 => GameState::Quit,
            3 => GameState::Win,
            _ => GameState::Lose,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, GameState::Quit | GameState::Win | GameState::Lose)
    }
}

/// Atomic game-state field with an "ended" signal.
///
/// Transitions: `Pose -> Continuing`, and `Pose | Continuing -> terminal`.
/// Terminal states are sticky.
#[derive(Debug, Default)]
pub struct StateCell {
    state: AtomicU8,
    ended: Notify,
}

impl StateCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> GameState {
        GameState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.get() == GameState::Continuing
    }

    fn start(&self) -> bool {
        self.state
            .compare_exchange(
                GameState::Pose as u8,
                GameState::Continuing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    fn finish(&self, to: GameState) -> bool {
        debug_assert!(to.is_terminal());
        let changed = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                if GameState::from_u8(cur).is_terminal() {
                    None
                } else {
                    Some(to as u8)
                }
            })
            .is_ok();
        if changed {
            self.ended.notify_waiters();
        }
        changed
    }

    /// Resolves once the state is terminal.
    pub async fn ended(&self) {
        loop {
            // registered before the check, so a finish() in between still wakes us
            let notified = self.ended.notified();
            if self.get().is_terminal() {
                return;
            }
            notified.await;
        }
    }
}

// ── Session ──

#[derive(Debug)]
pub struct Session {
    grid: Arc<Grid>,
    state: Arc<StateCell>,
    player: Pos,
    ghosts: Vec<Pos>,
    collected: Vec<Vec<bool>>,
    score: u32,
    target_score: u32,
    /// Cells whose appearance changed since the last repaint.
    damage: Vec<Pos>,
}

impl Session {
    pub fn new(grid: Arc<Grid>, ghosts: Vec<Pos>) -> Self {
        let collected = vec![vec![false; grid.width().max(0) as usize]; grid.height().max(0) as usize];
        Session {
            player: grid.player_start(),
            target_score: grid.target_total(),
            grid,
            state: Arc::new(StateCell::new()),
            ghosts,
            collected,
            score: 0,
            damage: Vec::new(),
        }
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn state(&self) -> &Arc<StateCell> {
        &self.state
    }

    pub fn game_state(&self) -> GameState {
        self.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn player(&self) -> Pos {
        self.player
    }

    pub fn ghosts(&self) -> &[Pos] {
        &self.ghosts
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn target_score(&self) -> u32 {
        self.target_score
    }

    // ── Dynamic cell queries ──

    pub fn is_enemy(&self, p: Pos) -> bool {
        self.ghosts.contains(&p)
    }

    /// Word motions treat ghosts like blanks.
    pub fn is_space_or_enemy(&self, p: Pos) -> bool {
        self.grid.is_space(p) || self.is_enemy(p)
    }

    pub fn is_collected(&self, p: Pos) -> bool {
        self.grid.in_bounds(p) && self.collected[p.y as usize][p.x as usize]
    }

    // ── State transitions ──

    /// Pose -> Continuing. Returns false if the stage already left Pose.
    pub fn start(&mut self) -> bool {
        self.state.start()
    }

    pub fn quit(&mut self) {
        self.state.finish(GameState::Quit);
    }

    // ── Mutation ──

    pub(crate) fn set_player(&mut self, p: Pos) {
        self.player = p;
    }

    pub(crate) fn move_ghost(&mut self, idx: usize, to: Pos) {
        let from = std::mem::replace(&mut self.ghosts[idx], to);
        self.damage.push(from);
        self.damage.push(to);
    }

    /// Move-outcome evaluation for the player's cell.
    ///
    /// A ghost or poison on the cell loses the stage; otherwise an
    /// uneaten target is eaten, and eating the last one wins. Runs after
    /// every player step and every ghost move, so a collision is caught
    /// whichever side moved. Does nothing once the stage has ended.
    pub fn settle(&mut self) {
        if !self.is_running() {
            return;
        }
        let p = self.player;
        if self.is_enemy(p) || self.grid.is_poison(p) {
            self.state.finish(GameState::Lose);
            return;
        }
        if self.grid.is_target(p) && !self.is_collected(p) {
            self.collected[p.y as usize][p.x as usize] = true;
            self.score += 1;
            self.damage.push(p);
            if self.score == self.target_score {
                self.state.finish(GameState::Win);
            }
        }
    }

    pub fn take_damage(&mut self) -> Vec<Pos> {
        std::mem::take(&mut self.damage)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::grid::tests::sample;

    pub fn running(grid: Grid, ghosts: Vec<Pos>) -> Session {
        let mut s = Session::new(Arc::new(grid), ghosts);
        assert!(s.start());
        s
    }

    #[test]
    fn new_session_poses_at_player_start() {
        let s = Session::new(Arc::new(sample()), vec![]);
        assert_eq!(s.game_state(), GameState::Pose);
        assert_eq!(s.player(), Pos::new(3, 2));
        assert_eq!(s.score(), 0);
        assert_eq!(s.target_score(), 14);
    }

    #[test]
    fn start_only_from_pose() {
        let mut s = Session::new(Arc::new(sample()), vec![]);
        assert!(s.start());
        assert!(!s.start());
        s.quit();
        assert!(!s.start());
        assert_eq!(s.game_state(), GameState::Quit);
    }

    #[test]
    fn terminal_states_are_sticky() {
        let mut s = running(sample(), vec![Pos::new(3, 2)]);
        s.settle();
        assert_eq!(s.game_state(), GameState::Lose);
        s.quit();
        assert_eq!(s.game_state(), GameState::Lose);
    }

    #[test]
    fn settle_on_neutral_cell_changes_nothing() {
        let mut s = running(sample(), vec![]);
        s.set_player(Pos::new(4, 2));
        s.settle();
        s.settle();
        assert_eq!(s.score(), 0);
        assert_eq!(s.game_state(), GameState::Continuing);
        assert!(s.take_damage().is_empty());
    }

    #[test]
    fn settle_eats_a_target_once() {
        let mut s = running(sample(), vec![]);
        s.set_player(Pos::new(3, 1));
        s.settle();
        s.settle();
        assert_eq!(s.score(), 1);
        assert!(s.is_collected(Pos::new(3, 1)));
        assert_eq!(s.take_damage(), vec![Pos::new(3, 1)]);
        assert_eq!(s.game_state(), GameState::Continuing);
    }

    #[test]
    fn poison_loses() {
        let mut s = running(sample(), vec![]);
        s.set_player(Pos::new(15, 1));
        s.settle();
        assert_eq!(s.game_state(), GameState::Lose);
    }

    #[test]
    fn ghost_on_player_loses() {
        let mut s = running(sample(), vec![Pos::new(5, 2)]);
        s.move_ghost(0, Pos::new(3, 2));
        s.settle();
        assert_eq!(s.game_state(), GameState::Lose);
    }

    #[test]
    fn eating_every_target_wins_and_nothing_after() {
        let g = sample();
        let targets: Vec<Pos> = (0..g.height())
            .flat_map(|y| (0..g.width()).map(move |x| Pos::new(x, y)))
            .filter(|&p| g.is_target(p))
            .collect();
        let mut s = running(g, vec![]);
        let mut last = 0;
        for (i, &p) in targets.iter().enumerate() {
            s.set_player(p);
            s.settle();
            assert!(s.score() >= last);
            last = s.score();
            assert_eq!(s.score() == s.target_score(), s.game_state() == GameState::Win, "step {i}");
        }
        assert_eq!(s.game_state(), GameState::Win);
        assert_eq!(s.score(), 14);
    }

    #[test]
    fn no_score_after_the_stage_ends() {
        let mut s = running(sample(), vec![]);
        s.quit();
        s.set_player(Pos::new(3, 1));
        s.settle();
        assert_eq!(s.score(), 0);
        assert_eq!(s.game_state(), GameState::Quit);
    }

    #[tokio::test]
    async fn ended_resolves_after_finish() {
        let cell = Arc::new(StateCell::new());
        let waiter = {
            let cell = Arc::clone(&cell);
            tokio::spawn(async move { cell.ended().await })
        };
        assert!(cell.start());
        assert!(cell.finish(GameState::Win));
        waiter.await.expect("waiter task");
        assert_eq!(cell.get(), GameState::Win);
    }
}

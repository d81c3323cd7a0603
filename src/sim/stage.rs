/// Stage runner: stand-by, then the player and ghost tasks.
///
/// The session and the screen sit together behind one `tokio::sync::Mutex`
/// so a move, its outcome check, and its repaint happen as one unit. The
/// player task runs on the blocking pool because reading a key blocks the
/// thread. The ghost task sleeps between ticks and wakes early when the
/// stage ends. Each task checks the lock-free state cell at the top of its
/// loop and again once it holds the lock, so neither moves after the stage
/// has ended. A task that fails quits the stage before returning its error,
/// which releases the other one.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, trace};
use rand::rngs::StdRng;
use tokio::sync::Mutex;

use crate::domain::ai;
use crate::domain::grid::{Grid, Pos};
use crate::domain::ring::{ring_scan, Offset};
use crate::error::GameError;
use crate::ui::input::{KeySource, KEY_ENTER};
use crate::ui::renderer::Renderer;
use crate::ui::view::{self, Hud};

use super::motion::Player;
use super::session::{GameState, Session, StateCell};
use super::step;

#[derive(Clone, Copy, Debug)]
pub struct StageSettings {
    pub interval: Duration,
    pub search_radius: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageReport {
    pub state: GameState,
    pub score: u32,
    pub target_score: u32,
}

/// What a finished stage hands back: its report and both collaborators.
pub struct StageOutcome<R, K> {
    pub report: StageReport,
    pub screen: R,
    pub keys: K,
}

struct Board<R> {
    session: Session,
    screen: R,
    hud: Hud,
}

impl<R: Renderer> Board<R> {
    fn repaint(&mut self) -> std::io::Result<()> {
        view::repaint(&mut self.screen, &mut self.session, &self.hud)
    }
}

pub struct Stage<R> {
    label: String,
    board: Arc<Mutex<Board<R>>>,
    state: Arc<StateCell>,
    table: Vec<Offset>,
    interval: Duration,
    rng: StdRng,
}

impl<R: Renderer + Send + 'static> Stage<R> {
    /// Set up a stage with randomly placed ghosts.
    pub fn new(label: &str, grid: Grid, screen: R, hud: Hud, settings: StageSettings, mut rng: StdRng) -> Result<Self, GameError> {
        let ghosts = ai::place_ghosts(&grid, &mut rng).ok_or_else(|| GameError::Placement {
            stage: label.to_string(),
            ghosts: ai::ghost_count(&grid),
            attempts: ai::MAX_PLACEMENT_ATTEMPTS,
        })?;
        debug!("{label}: ghosts at {ghosts:?}");
        Ok(Self::with_ghosts(label, grid, ghosts, screen, hud, settings, rng))
    }

    pub(crate) fn with_ghosts(
        label: &str,
        grid: Grid,
        ghosts: Vec<Pos>,
        screen: R,
        hud: Hud,
        settings: StageSettings,
        rng: StdRng,
    ) -> Self {
        let session = Session::new(Arc::new(grid), ghosts);
        let state = Arc::clone(session.state());
        Stage {
            label: label.to_string(),
            board: Arc::new(Mutex::new(Board { session, screen, hud })),
            state,
            table: ring_scan(settings.search_radius),
            interval: settings.interval,
            rng,
        }
    }

    pub fn state(&self) -> GameState {
        self.state.get()
    }

    /// Pose -> Continuing without going through stand-by.
    pub async fn start(&self) -> bool {
        self.board.lock().await.session.start()
    }

    pub async fn quit(&self) {
        self.board.lock().await.session.quit();
    }

    /// Paint, wait for Enter, play, and report.
    pub async fn run<K: KeySource + Send + 'static>(self, keys: K) -> Result<StageOutcome<R, K>, GameError> {
        self.draw().await?;
        let keys = self.stand_by(keys).await?;
        self.play(keys).await
    }

    async fn draw(&self) -> Result<(), GameError> {
        let mut board = self.board.lock().await;
        let (need_w, need_h) = view::required_size(board.session.grid());
        let (have_w, have_h) = board.screen.size()?;
        if have_w < need_w || have_h < need_h {
            return Err(GameError::TerminalTooSmall { need_w, need_h, have_w, have_h });
        }
        let Board { session, screen, hud } = &mut *board;
        view::paint_stage(screen, session, hud)?;
        Ok(())
    }

    /// Read keys until Enter starts the stage or `q` quits it.
    pub async fn stand_by<K: KeySource + Send + 'static>(&self, keys: K) -> Result<K, GameError> {
        let board = Arc::clone(&self.board);
        tokio::task::spawn_blocking(move || stand_by_loop(&board, keys)).await?
    }

    /// Run both tasks until the stage ends and join them.
    pub async fn play<K: KeySource + Send + 'static>(self, keys: K) -> Result<StageOutcome<R, K>, GameError> {
        info!("{}: stage {:?}, ghost tick {:?}", self.label, self.state.get(), self.interval);

        let player = {
            let board = Arc::clone(&self.board);
            let state = Arc::clone(&self.state);
            tokio::task::spawn_blocking(move || player_task(&board, &state, keys))
        };
        let ghosts = tokio::spawn(ghost_task(
            Arc::clone(&self.board),
            Arc::clone(&self.state),
            self.table,
            self.interval,
            self.rng,
        ));

        let (player, ghosts) = tokio::join!(player, ghosts);
        let keys = player??;
        ghosts??;

        let board = Arc::try_unwrap(self.board)
            .map_err(|_| GameError::Task("stage board still shared after join".into()))?
            .into_inner();
        let report = StageReport {
            state: board.session.game_state(),
            score: board.session.score(),
            target_score: board.session.target_score(),
        };
        info!("{}: ended {:?} with {}/{}", self.label, report.state, report.score, report.target_score);
        Ok(StageOutcome { report, screen: board.screen, keys })
    }
}

// ── Stand-by ──

fn stand_by_loop<R: Renderer, K: KeySource>(board: &Mutex<Board<R>>, mut keys: K) -> Result<K, GameError> {
    loop {
        let key = keys.next_key()?;
        let mut board = board.blocking_lock();
        if board.session.game_state() != GameState::Pose {
            return Ok(keys);
        }
        match key {
            KEY_ENTER => {
                board.session.start();
                board.repaint()?;
                return Ok(keys);
            }
            'q' => {
                board.session.quit();
                return Ok(keys);
            }
            _ => {}
        }
    }
}

// ── Player task ──

fn player_task<R: Renderer, K: KeySource>(board: &Mutex<Board<R>>, state: &StateCell, keys: K) -> Result<K, GameError> {
    let result = player_loop(board, state, keys);
    if let Err(e) = &result {
        error!("player task failed: {e}");
        board.blocking_lock().session.quit();
    }
    result
}

fn player_loop<R: Renderer, K: KeySource>(board: &Mutex<Board<R>>, state: &StateCell, mut keys: K) -> Result<K, GameError> {
    let mut player = Player::new();
    while state.is_running() {
        let key = keys.next_key()?;
        let mut board = board.blocking_lock();
        if !board.session.is_running() {
            break;
        }
        trace!("key {key:?}");
        player.handle_key(key, &mut board.session);
        board.repaint()?;
    }
    Ok(keys)
}

// ── Ghost task ──

async fn ghost_task<R: Renderer + Send>(
    board: Arc<Mutex<Board<R>>>,
    state: Arc<StateCell>,
    table: Vec<Offset>,
    interval: Duration,
    mut rng: StdRng,
) -> Result<(), GameError> {
    let result = ghost_loop(&board, &state, &table, interval, &mut rng).await;
    if let Err(e) = &result {
        error!("ghost task failed: {e}");
        board.lock().await.session.quit();
    }
    result
}

async fn ghost_loop<R: Renderer + Send>(
    board: &Mutex<Board<R>>,
    state: &StateCell,
    table: &[Offset],
    interval: Duration,
    rng: &mut StdRng,
) -> Result<(), GameError> {
    while state.is_running() {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = state.ended() => break,
        }
        let mut board = board.lock().await;
        if !board.session.is_running() {
            break;
        }
        step::tick(&mut board.session, table, rng);
        board.repaint()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tests::sample;
    use crate::ui::input::tests::ScriptKeys;
    use crate::ui::renderer::tests::MemScreen;
    use crossterm::style::Color;
    use rand::SeedableRng;
    use std::io;

    const HOUR: Duration = Duration::from_secs(3600);
    const HUD: Hud = Hud { level: 1, life: 3 };

    fn settings(interval: Duration) -> StageSettings {
        StageSettings { interval, search_radius: 2 }
    }

    fn corridor() -> Grid {
        Grid::parse("+++++++\n+P o G+\n+++++++\n")
    }

    /// Blocks like a real keyboard until the stage ends, then sends `x`.
    struct IdleKeys(Arc<StateCell>);

    impl KeySource for IdleKeys {
        fn next_key(&mut self) -> io::Result<char> {
            while !self.0.get().is_terminal() {
                std::thread::sleep(Duration::from_millis(1));
            }
            Ok('x')
        }
    }

    #[tokio::test]
    async fn scripted_win() {
        let stage = Stage::with_ghosts(
            "corridor",
            corridor(),
            vec![Pos::new(5, 1)],
            MemScreen::new(60, 10),
            HUD,
            settings(HOUR),
            StdRng::seed_from_u64(1),
        );
        let out = stage.run(ScriptKeys::new("x\nll")).await.expect("stage runs");
        assert_eq!(out.report, StageReport { state: GameState::Win, score: 1, target_score: 1 });
        // gutter is two columns wide for a three-line map
        assert_eq!(out.screen.cell(5, 1), Some(('o', Color::Green)));
        assert_eq!(out.screen.row(3).trim_end(), "score: 1/1   clear!");
    }

    #[tokio::test]
    async fn quit_during_stand_by() {
        let stage = Stage::with_ghosts(
            "corridor",
            corridor(),
            vec![Pos::new(5, 1)],
            MemScreen::new(60, 10),
            HUD,
            settings(HOUR),
            StdRng::seed_from_u64(1),
        );
        let out = stage.run(ScriptKeys::new("jq")).await.expect("stage runs");
        assert_eq!(out.report.state, GameState::Quit);
        assert_eq!(out.report.score, 0);
    }

    #[tokio::test]
    async fn quit_right_after_start_stops_both_tasks() {
        let stage = Stage::with_ghosts(
            "sample",
            sample(),
            vec![Pos::new(4, 2)],
            MemScreen::new(40, 14),
            HUD,
            settings(Duration::from_millis(1)),
            StdRng::seed_from_u64(1),
        );
        assert!(stage.start().await);
        stage.quit().await;
        // no keys at all: the player task must not even read one
        let out = stage.play(ScriptKeys::new("")).await.expect("both tasks exit");
        assert_eq!(out.report.state, GameState::Quit);
        assert_eq!(out.report.score, 0);
    }

    #[tokio::test]
    async fn quit_while_both_tasks_run_freezes_the_board() {
        let stage = Stage::with_ghosts(
            "sample",
            sample(),
            vec![Pos::new(18, 6)],
            MemScreen::new(40, 14),
            HUD,
            settings(Duration::from_millis(5)),
            StdRng::seed_from_u64(5),
        );
        stage.draw().await.expect("paint");
        assert!(stage.start().await);
        let board = Arc::clone(&stage.board);
        let keys = IdleKeys(Arc::clone(&stage.state));
        let playing = tokio::spawn(stage.play(keys));

        // let a few ghost ticks go by
        tokio::time::sleep(Duration::from_millis(20)).await;
        let (ghosts, player, score) = {
            let mut board = board.lock().await;
            board.session.quit();
            (board.session.ghosts().to_vec(), board.session.player(), board.session.score())
        };
        // play() takes the board back once both tasks have joined
        drop(board);

        let out = tokio::time::timeout(Duration::from_secs(10), playing)
            .await
            .expect("both tasks exit")
            .expect("join")
            .expect("stage runs");
        assert_eq!(out.report.state, GameState::Quit);
        assert_eq!(out.report.score, score);
        let offset = sample().offset();
        assert_eq!(out.screen.cursor, ((player.x + offset) as u16, player.y as u16));
        for g in ghosts {
            assert_eq!(out.screen.cell((g.x + offset) as u16, g.y as u16), Some(('G', Color::Red)));
        }
    }

    #[tokio::test]
    async fn ghost_catches_an_idle_player() {
        let stage = Stage::with_ghosts(
            "sample",
            sample(),
            vec![Pos::new(18, 6)],
            MemScreen::new(40, 14),
            HUD,
            settings(Duration::from_millis(1)),
            StdRng::seed_from_u64(5),
        );
        assert!(stage.start().await);
        let keys = IdleKeys(Arc::clone(&stage.state));
        let out = tokio::time::timeout(Duration::from_secs(10), stage.play(keys))
            .await
            .expect("ghost catches the player in time")
            .expect("stage runs");
        assert_eq!(out.report.state, GameState::Lose);
        assert_eq!(out.screen.cell(6, 2), Some(('G', Color::Red)));
    }

    #[tokio::test]
    async fn key_source_failure_aborts_the_stage() {
        let stage = Stage::with_ghosts(
            "corridor",
            corridor(),
            vec![Pos::new(5, 1)],
            MemScreen::new(60, 10),
            HUD,
            settings(HOUR),
            StdRng::seed_from_u64(1),
        );
        let state = Arc::clone(&stage.state);
        let err = stage.run(ScriptKeys::new("\nh")).await.err().expect("script runs dry");
        assert!(matches!(err, GameError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
        assert_eq!(state.get(), GameState::Quit);
    }

    #[tokio::test]
    async fn small_terminal_is_refused() {
        let stage = Stage::with_ghosts(
            "sample",
            sample(),
            vec![Pos::new(4, 2)],
            MemScreen::new(20, 8),
            HUD,
            settings(HOUR),
            StdRng::seed_from_u64(1),
        );
        let err = stage.run(ScriptKeys::new("\n")).await.err().expect("too small");
        assert!(matches!(
            err,
            GameError::TerminalTooSmall { need_w: 36, need_h: 12, have_w: 20, have_h: 8 }
        ));
    }

    #[test]
    fn random_placement_builds_a_stage() {
        let stage = Stage::new(
            "sample",
            sample(),
            MemScreen::new(40, 14),
            HUD,
            settings(HOUR),
            StdRng::seed_from_u64(9),
        )
        .expect("room for ghosts");
        assert_eq!(stage.state(), GameState::Pose);
    }
}

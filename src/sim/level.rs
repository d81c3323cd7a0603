/// Stage sources and level progression.
///
/// ## Sources (priority order):
///   1. `stages_dir` (`*.txt` files, played in file-name order)
///   2. Built-in stages compiled into the binary
///
/// Every stage is validated before the first one is played, so a broken
/// file stops the game before it starts.
///
/// ## Progression:
///   Win  → next level (shorter ghost tick); after the last level, congrats
///   Lose → one life lost, same level again; below zero lives, game over
///   Quit → game ends

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GameConfig;
use crate::domain::grid::Grid;
use crate::error::{GameError, ValidationError};
use crate::ui::input::KeySource;
use crate::ui::renderer::Renderer;
use crate::ui::scene::{self, Scene};
use crate::ui::view::Hud;

use super::session::GameState;
use super::stage::{Stage, StageSettings};
use super::validate::{validate_map_bytes, validate_stage_map};

#[derive(Clone, Debug)]
pub struct StageSource {
    /// File path, or `builtin:<n>`.
    pub label: String,
    pub text: String,
}

// ══════════════════════════════════════════════════════════════
// Loading
// ══════════════════════════════════════════════════════════════

const BUILTIN: [&str; 3] = [
    include_str!("../../assets/stages/stage1.txt"),
    include_str!("../../assets/stages/stage2.txt"),
    include_str!("../../assets/stages/stage3.txt"),
];

pub fn builtin_stages() -> Result<Vec<StageSource>, ValidationError> {
    BUILTIN
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let label = format!("builtin:{}", i + 1);
            validate_map_bytes(&label, text.as_bytes())?;
            Ok(StageSource { label, text: text.to_string() })
        })
        .collect()
}

/// Stages from `dir`, or the built-in set when it holds no `.txt` files.
pub fn load_stages(dir: &Path) -> Result<Vec<StageSource>, GameError> {
    let files = stage_files(dir);
    if files.is_empty() {
        info!("no stage files in {}, using built-in stages", dir.display());
        return Ok(builtin_stages()?);
    }

    let mut stages = Vec::with_capacity(files.len());
    for path in files {
        validate_stage_map(&path)?;
        let label = path.display().to_string();
        let text = fs::read_to_string(&path)
            .map_err(|source| ValidationError::Io { path: label.clone(), source })?;
        stages.push(StageSource { label, text });
    }
    info!("loaded {} stages from {}", stages.len(), dir.display());
    Ok(stages)
}

fn stage_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return vec![],
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().map_or(false, |e| e == "txt"))
        .collect();
    files.sort();
    files
}

// ══════════════════════════════════════════════════════════════
// Progression
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Next {
    Play,
    Congrats,
    GameOver,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    level: usize,
    life: i32,
    total: usize,
}

impl Progress {
    pub fn new(total: usize, lives: i32) -> Self {
        Progress { level: 0, life: lives, total }
    }

    /// 0-based index of the stage to play next.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn life(&self) -> i32 {
        self.life
    }

    pub fn after(&mut self, state: GameState) -> Next {
        match state {
            GameState::Win => {
                self.level += 1;
                if self.level >= self.total {
                    Next::Congrats
                } else {
                    Next::Play
                }
            }
            GameState::Lose => {
                self.life -= 1;
                if self.life < 0 {
                    Next::GameOver
                } else {
                    Next::Play
                }
            }
            GameState::Quit | GameState::Pose | GameState::Continuing => Next::Quit,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Campaign
// ══════════════════════════════════════════════════════════════

pub struct CampaignEnd<R> {
    pub ending: Next,
    /// Stages won.
    pub cleared: usize,
    pub screen: R,
}

async fn show<R: Renderer>(screen: &mut R, scene: Scene, config: &GameConfig) -> Result<(), GameError> {
    scene::show(screen, scene)?;
    tokio::time::sleep(config.speed.scene()).await;
    Ok(())
}

/// Play `stages` in order until the game is won, lost, or quit.
pub async fn run_campaign<R, K>(
    mut screen: R,
    mut keys: K,
    config: &GameConfig,
    stages: &[StageSource],
    rng: &mut StdRng,
) -> Result<CampaignEnd<R>, GameError>
where
    R: Renderer + Send + 'static,
    K: KeySource + Send + 'static,
{
    if stages.is_empty() {
        return Err(GameError::NoStages);
    }

    show(&mut screen, Scene::Start, config).await?;
    let mut progress = Progress::new(stages.len(), config.lives);

    let ending = loop {
        let idx = progress.level();
        let source = &stages[idx];
        let hud = Hud { level: idx + 1, life: progress.life() };
        let settings = StageSettings {
            interval: config.speed.ghost_interval(idx + 1),
            search_radius: config.ghost.search_radius,
        };
        let stage = Stage::new(
            &source.label,
            Grid::parse(&source.text),
            screen,
            hud,
            settings,
            StdRng::seed_from_u64(rng.gen()),
        )?;
        let out = stage.run(keys).await?;
        screen = out.screen;
        keys = out.keys;

        match out.report.state {
            GameState::Win => show(&mut screen, Scene::YouWin, config).await?,
            GameState::Lose => show(&mut screen, Scene::YouLose, config).await?,
            _ => {}
        }
        match progress.after(out.report.state) {
            Next::Play => continue,
            Next::Congrats => {
                show(&mut screen, Scene::Congrats, config).await?;
                break Next::Congrats;
            }
            other => break other,
        }
    };

    info!("game ended: {ending:?} after {} of {} stages", progress.level(), stages.len());
    show(&mut screen, Scene::Goodbye, config).await?;
    Ok(CampaignEnd { ending, cleared: progress.level(), screen })
}

/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing, incomplete, or broken.

use log::{info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub ghost: GhostConfig,
    pub stages_dir: PathBuf,
    pub lives: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeedConfig {
    pub ghost_interval_ms: u64,
    pub speedup_per_level_ms: u64,
    pub min_interval_ms: u64,
    pub scene_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GhostConfig {
    pub search_radius: i32,
}

impl SpeedConfig {
    /// Ghost tick interval for a 1-based level.
    pub fn ghost_interval(&self, level: usize) -> Duration {
        let speedup = self.speedup_per_level_ms.saturating_mul(level.saturating_sub(1) as u64);
        let ms = self.ghost_interval_ms.saturating_sub(speedup).max(self.min_interval_ms);
        Duration::from_millis(ms)
    }

    pub fn scene(&self) -> Duration {
        Duration::from_millis(self.scene_ms)
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    ghost: TomlGhost,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_ghost_interval")]
    ghost_interval_ms: u64,
    #[serde(default = "default_speedup")]
    speedup_per_level_ms: u64,
    #[serde(default = "default_min_interval")]
    min_interval_ms: u64,
    #[serde(default = "default_scene")]
    scene_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGhost {
    #[serde(default = "default_search_radius")]
    search_radius: i32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_stages_dir")]
    stages_dir: String,
    #[serde(default = "default_lives")]
    lives: i32,
}

// ── Defaults ──

fn default_ghost_interval() -> u64 { 1000 }
fn default_speedup() -> u64 { 50 }
fn default_min_interval() -> u64 { 200 }
fn default_scene() -> u64 { 1000 }
fn default_search_radius() -> i32 { 2 }
fn default_stages_dir() -> String { "stages".into() }
fn default_lives() -> i32 { 3 }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            ghost_interval_ms: default_ghost_interval(),
            speedup_per_level_ms: default_speedup(),
            min_interval_ms: default_min_interval(),
            scene_ms: default_scene(),
        }
    }
}

impl Default for TomlGhost {
    fn default() -> Self {
        TomlGhost { search_radius: default_search_radius() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            stages_dir: default_stages_dir(),
            lives: default_lives(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    /// Build a config from TOML text; broken text yields the defaults.
    pub fn from_toml_str(text: &str) -> Self {
        let toml_cfg = parse_toml(text, Path::new("<inline>"));
        Self::resolve(toml_cfg, &[])
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let stages_dir_str = &toml_cfg.general.stages_dir;
        let stages_dir = if PathBuf::from(stages_dir_str).is_absolute() {
            PathBuf::from(stages_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(stages_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(stages_dir_str))
        };

        GameConfig {
            speed: SpeedConfig {
                ghost_interval_ms: toml_cfg.speed.ghost_interval_ms,
                speedup_per_level_ms: toml_cfg.speed.speedup_per_level_ms,
                min_interval_ms: toml_cfg.speed.min_interval_ms,
                scene_ms: toml_cfg.speed.scene_ms,
            },
            ghost: GhostConfig {
                search_radius: toml_cfg.ghost.search_radius.max(0),
            },
            stages_dir,
            lives: toml_cfg.general.lives.max(0),
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    info!("using config {}", path.display());
                    return parse_toml(&text, &path);
                }
                Err(e) => warn!("could not read {}: {e}", path.display()),
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str, path: &Path) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("{} parse error, using default settings: {e}", path.display());
            TomlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("");
        assert_eq!(cfg.speed.ghost_interval_ms, 1000);
        assert_eq!(cfg.speed.speedup_per_level_ms, 50);
        assert_eq!(cfg.speed.min_interval_ms, 200);
        assert_eq!(cfg.speed.scene_ms, 1000);
        assert_eq!(cfg.ghost.search_radius, 2);
        assert_eq!(cfg.stages_dir, PathBuf::from("stages"));
        assert_eq!(cfg.lives, 3);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str("[speed]\nghost_interval_ms = 600\n[general]\nlives = 1\n");
        assert_eq!(cfg.speed.ghost_interval_ms, 600);
        assert_eq!(cfg.speed.speedup_per_level_ms, 50);
        assert_eq!(cfg.lives, 1);
        assert_eq!(cfg.ghost.search_radius, 2);
    }

    #[test]
    fn broken_file_falls_back() {
        let cfg = GameConfig::from_toml_str("[speed\nghost_interval_ms = ");
        assert_eq!(cfg.speed.ghost_interval_ms, 1000);
    }

    #[test]
    fn ghosts_speed_up_per_level_down_to_the_floor() {
        let speed = GameConfig::from_toml_str("").speed;
        assert_eq!(speed.ghost_interval(1), Duration::from_millis(1000));
        assert_eq!(speed.ghost_interval(2), Duration::from_millis(950));
        assert_eq!(speed.ghost_interval(10), Duration::from_millis(550));
        assert_eq!(speed.ghost_interval(17), Duration::from_millis(200));
        assert_eq!(speed.ghost_interval(40), Duration::from_millis(200));
        // level 0 is treated as level 1
        assert_eq!(speed.ghost_interval(0), Duration::from_millis(1000));
    }
}

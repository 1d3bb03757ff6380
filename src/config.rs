/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD or
/// `~/.local/share/muncher`. Missing file or missing keys fall back to
/// defaults; a broken file falls back to defaults as a whole and the
/// problem is handed back to the caller for logging.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::AppError;

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    /// Fixed RNG seed for reproducible runs; None seeds from entropy.
    pub seed: Option<u64>,
    pub sound_enabled: bool,
    pub log: LogConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogConfig {
    /// None or empty disables logging.
    pub file: Option<PathBuf>,
    pub level: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GamepadConfig {
    pub start: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
    pub difficulty_prev: Vec<String>,
    pub difficulty_next: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    sound: TomlSound,
    #[serde(default)]
    log: TomlLog,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGame {
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlSound {
    #[serde(default = "default_true")]
    enabled: bool,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_start")]
    start: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
    #[serde(default = "default_difficulty_prev")]
    difficulty_prev: Vec<String>,
    #[serde(default = "default_difficulty_next")]
    difficulty_next: Vec<String>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 180 }
fn default_true() -> bool { true }
fn default_log_file() -> String { "muncher.log".into() }
fn default_log_level() -> String { "info".into() }

fn default_start() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_restart() -> Vec<String> { vec!["Select".into()] }
fn default_quit() -> Vec<String> { vec!["Mode".into()] }
fn default_difficulty_prev() -> Vec<String> { vec!["L1".into()] }
fn default_difficulty_next() -> Vec<String> { vec!["R1".into()] }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlSound {
    fn default() -> Self {
        TomlSound { enabled: default_true() }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            start: default_start(),
            restart: default_restart(),
            quit: default_quit(),
            difficulty_prev: default_difficulty_prev(),
            difficulty_next: default_difficulty_next(),
        }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            // Zero would spin the loop.
            speed: SpeedConfig { tick_rate_ms: t.speed.tick_rate_ms.max(1) },
            seed: t.game.seed,
            sound_enabled: t.sound.enabled,
            log: LogConfig {
                file: (!t.log.file.is_empty()).then(|| PathBuf::from(t.log.file)),
                level: t.log.level,
            },
            gamepad: GamepadConfig {
                start: t.gamepad.start,
                restart: t.gamepad.restart,
                quit: t.gamepad.quit,
                difficulty_prev: t.gamepad.difficulty_prev,
                difficulty_next: t.gamepad.difficulty_next,
            },
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

// ── Loading ──

impl GameConfig {
    /// Parse a config document. Absent keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(Into::into)
    }

    /// Load config from the first `config.toml` found in the candidate dirs.
    /// On a read or parse failure the defaults are used and the error is
    /// returned alongside them.
    pub fn load() -> (Self, Option<AppError>) {
        match find_config(&candidate_dirs()) {
            Some(path) => match load_file(&path) {
                Ok(cfg) => (cfg, None),
                Err(e) => (GameConfig::default(), Some(e)),
            },
            None => (GameConfig::default(), None),
        }
    }
}

fn load_file(path: &Path) -> Result<GameConfig, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| AppError::ConfigRead { path: path.to_path_buf(), source })?;
    GameConfig::from_toml_str(&text)
        .map_err(|source| AppError::ConfigParse { path: path.to_path_buf(), source })
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/muncher)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/muncher");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn find_config(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs.iter()
        .map(|d| d.join("config.toml"))
        .find(|p| p.is_file())
}

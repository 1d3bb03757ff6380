/// File logging.
///
/// The terminal belongs to the renderer, so log lines go to a file.
/// An empty path leaves tracing without a subscriber (events dropped).

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;

use crate::config::LogConfig;
use crate::error::{AppError, AppResult};

/// Parse a level name, falling back to INFO on anything unknown.
pub fn parse_level(name: &str) -> LevelFilter {
    LevelFilter::from_str(name.trim()).unwrap_or(LevelFilter::INFO)
}

/// Install the global subscriber. Returns the log path when enabled.
pub fn init(cfg: &LogConfig) -> AppResult<Option<PathBuf>> {
    let path = match cfg.file.as_deref() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => return Ok(None),
    };

    let file = open_append(&path)?;
    let subscriber = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(parse_level(&cfg.level))
        .finish();

    // A second init in the same process keeps the first subscriber.
    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(Some(path))
}

fn open_append(path: &Path) -> AppResult<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| AppError::LogFile { path: path.to_path_buf(), source })
}

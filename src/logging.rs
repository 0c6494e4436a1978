/// Log subscriber setup.
///
/// The terminal is in raw mode on the alternate screen while the game runs,
/// so events go to a plain-text file instead of stderr.

use std::fs::OpenOptions;
use std::str::FromStr;
use std::sync::Mutex;

use tracing::Level;

use crate::config::LogConfig;
use crate::error::GameError;

/// Install the global subscriber. Returns `Ok(false)` when logging is
/// disabled in the config.
pub fn init(cfg: &LogConfig) -> Result<bool, GameError> {
    let path = match &cfg.file {
        Some(p) => p,
        None => return Ok(false),
    };
    let level = parse_level(&cfg.level)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| GameError::LogFile { path: path.clone(), source })?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(level)
        .init();

    Ok(true)
}

fn parse_level(s: &str) -> Result<Level, GameError> {
    Level::from_str(s.trim()).map_err(|_| GameError::LogLevel(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(parse_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_level(" warn ").unwrap(), Level::WARN);
    }

    #[test]
    fn unknown_level_is_rejected() {
        assert!(matches!(parse_level("loud"), Err(GameError::LogLevel(s)) if s == "loud"));
    }

    #[test]
    fn disabled_logging_installs_nothing() {
        let cfg = LogConfig { file: None, level: "info".into() };
        assert!(!init(&cfg).unwrap());
    }
}

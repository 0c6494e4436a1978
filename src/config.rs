/// Startup configuration.
///
/// Two layers:
///   - `GridConfig`: board geometry. Fixed constants handed to the core
///     at startup; never read from disk.
///   - `GameConfig`: ambient settings read from `config.toml` (frame pacing,
///     audio, gamepad mapping, logging). Falls back to defaults if the file
///     is missing, unreadable or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

// ── Board geometry ──

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
    pub num_cols: usize,
    pub num_rows: usize,
    /// Pixel size of one block image.
    pub tile_width: f32,
    pub tile_height: f32,
    /// Pixel distance between neighbouring cells (blocks overlap vertically).
    pub offset_x: f32,
    pub offset_y: f32,
    pub start_col: i32,
    pub start_row: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            num_cols: 8,
            num_rows: 6,
            tile_width: 101.0,
            tile_height: 101.0,
            offset_x: 101.0,
            offset_y: 83.0,
            start_col: 3,
            start_row: 4,
        }
    }
}

impl GridConfig {
    pub fn last_col(&self) -> i32 {
        self.num_cols as i32 - 1
    }

    /// Canvas size in pixels: the board plus one tile row for the footer.
    pub fn canvas_size(&self) -> (f32, f32) {
        (
            self.num_cols as f32 * self.tile_width,
            (self.num_rows + 1) as f32 * self.tile_height,
        )
    }
}

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub frame_ms: u64,
    pub audio_enabled: bool,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    /// Buttons that count as "any key" on the game-over prompt.
    pub any_key: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Log file path. `None` disables logging.
    pub file: Option<PathBuf>,
    pub level: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlAudio {
    #[serde(default = "default_audio_enabled")]
    enabled: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_any_key")]
    any_key: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

// ── Defaults ──

fn default_frame_ms() -> u64 { 16 } // ~60 fps
fn default_audio_enabled() -> bool { true }
fn default_any_key() -> Vec<String> { vec!["A".into(), "B".into(), "Start".into()] }
fn default_log_file() -> String { "gemhop.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay { frame_ms: default_frame_ms() }
    }
}

impl Default for TomlAudio {
    fn default() -> Self {
        TomlAudio { enabled: default_audio_enabled() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad { any_key: default_any_key() }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { file: default_log_file(), level: default_log_level() }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(cfg: TomlConfig) -> Self {
        let file = cfg.log.file.trim();
        GameConfig {
            frame_ms: cfg.display.frame_ms.max(1),
            audio_enabled: cfg.audio.enabled,
            gamepad: GamepadConfig { any_key: cfg.gamepad.any_key },
            log: LogConfig {
                file: if file.is_empty() { None } else { Some(PathBuf::from(file)) },
                level: cfg.log.level,
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
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/gemhop`.
    ///
    /// Returns the config plus any problem met on the way. Logging is not
    /// up yet when this runs (its settings live in here), so the caller
    /// reports the problem once the subscriber is installed.
    pub fn load() -> (Self, Option<ConfigError>) {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if path.exists() {
                return match parse_file(&path) {
                    Ok(cfg) => (cfg.into(), None),
                    Err(e) => (GameConfig::default(), Some(e)),
                };
            }
        }
        (GameConfig::default(), None)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from)
    }
}

fn parse_file(path: &Path) -> Result<TomlConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<TomlConfig>(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its config.
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

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/gemhop");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_defaults_match_board() {
        let g = GridConfig::default();
        assert_eq!((g.num_cols, g.num_rows), (8, 6));
        assert_eq!((g.start_col, g.start_row), (3, 4));
        assert_eq!(g.last_col(), 7);
        assert_eq!(g.canvas_size(), (808.0, 707.0));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.frame_ms, 16);
        assert!(cfg.audio_enabled);
        assert_eq!(cfg.gamepad.any_key, vec!["A", "B", "Start"]);
        assert_eq!(cfg.log.file, Some(PathBuf::from("gemhop.log")));
        assert_eq!(cfg.log.level, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[audio]\nenabled = false\n\n[log]\nlevel = \"debug\"\n",
        ).unwrap();
        assert!(!cfg.audio_enabled);
        assert_eq!(cfg.frame_ms, 16);
        assert_eq!(cfg.log.level, "debug");
        assert_eq!(cfg.log.file, Some(PathBuf::from("gemhop.log")));
    }

    #[test]
    fn empty_log_file_disables_logging() {
        let cfg = GameConfig::from_toml_str("[log]\nfile = \"  \"\n").unwrap();
        assert!(cfg.log.file.is_none());
    }

    #[test]
    fn zero_frame_interval_is_clamped() {
        let cfg = GameConfig::from_toml_str("[display]\nframe_ms = 0\n").unwrap();
        assert_eq!(cfg.frame_ms, 1);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(GameConfig::from_toml_str("[display]\nframe_ms = \"fast\"\n").is_err());
    }
}

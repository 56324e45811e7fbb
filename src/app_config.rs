//! Process configuration read from the environment.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `BLOCK_ALBUM_SEED` | RNG seed | derived from the clock |
//! | `BLOCK_ALBUM_CONFIG` | path to a JSON `SessionConfig` | built-in defaults |
//! | `BLOCK_ALBUM_LOG_PATH` | log file | `block-album.log` |
//! | `BLOCK_ALBUM_LOG_LEVEL` | log level | `info` |

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use log::LevelFilter;

use crate::engine::SessionConfig;

pub const ENV_SEED: &str = "BLOCK_ALBUM_SEED";
pub const ENV_CONFIG: &str = "BLOCK_ALBUM_CONFIG";
pub const ENV_LOG_PATH: &str = "BLOCK_ALBUM_LOG_PATH";
pub const ENV_LOG_LEVEL: &str = "BLOCK_ALBUM_LOG_LEVEL";

pub const DEFAULT_LOG_PATH: &str = "block-album.log";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub seed: u64,
    pub session: SessionConfig,
    pub log_path: PathBuf,
    pub log_level: LevelFilter,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source. Unparseable seeds and levels fall back
    /// to their defaults; an unreadable config file is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let seed = lookup(ENV_SEED)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or_else(clock_seed);

        let session = match lookup(ENV_CONFIG).filter(|p| !p.trim().is_empty()) {
            Some(path) => load_session_config(Path::new(path.trim()))?,
            None => SessionConfig::default(),
        };

        let log_path = lookup(ENV_LOG_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH));

        let log_level = lookup(ENV_LOG_LEVEL)
            .and_then(|v| LevelFilter::from_str(v.trim()).ok())
            .unwrap_or(LevelFilter::Info);

        Ok(Self {
            seed,
            session,
            log_path,
            log_level,
        })
    }
}

/// Read a JSON session config. Missing keys take their defaults.
pub fn load_session_config(path: &Path) -> Result<SessionConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse config file {}", path.display()))
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[(ENV_SEED, "99")])).unwrap();
        assert_eq!(cfg.seed, 99);
        assert_eq!(cfg.session, SessionConfig::default());
        assert_eq!(cfg.log_path, PathBuf::from(DEFAULT_LOG_PATH));
        assert_eq!(cfg.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let cfg = AppConfig::from_lookup(lookup(&[
            (ENV_SEED, "not-a-number"),
            (ENV_LOG_LEVEL, "loud"),
        ]))
        .unwrap();
        assert_eq!(cfg.log_level, LevelFilter::Info);

        let cfg = AppConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "debug")])).unwrap();
        assert_eq!(cfg.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_config_file() {
        let path = std::env::temp_dir().join(format!("block-album-config-{}.json", std::process::id()));
        fs::write(&path, r#"{"tray_slots": 2, "boosters": {"swap_cost": 10}}"#).unwrap();
        let cfg = AppConfig::from_lookup(lookup(&[(ENV_CONFIG, path.to_str().unwrap())])).unwrap();
        assert_eq!(cfg.session.tray_slots, 2);
        assert_eq!(cfg.session.boosters.swap_cost, 10);
        assert_eq!(cfg.session.engine.board_size, 9);
        let _ = fs::remove_file(&path);

        let missing = AppConfig::from_lookup(lookup(&[(ENV_CONFIG, "/nonexistent/block-album.json")]));
        assert!(missing.is_err());
    }
}

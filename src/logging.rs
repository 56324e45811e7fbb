//! File logging through log4rs.
//!
//! The terminal is in raw mode while the game runs, so log output goes to a
//! file only.

use std::path::Path;

use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {t} {m}{n}";

/// Install the global logger. `LevelFilter::Off` skips logging entirely.
pub fn init(path: &Path, level: LevelFilter) -> Result<()> {
    if level == LevelFilter::Off {
        return Ok(());
    }

    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(level)))
                .build("logfile", Box::new(logfile)),
        )
        .build(Root::builder().appender("logfile").build(level))
        .context("build log config")?;

    log4rs::init_config(config).context("install logger")?;
    Ok(())
}

//! Logging setup.
//!
//! Library code only uses the `log` macros; the binary calls [`init`] once to
//! route records through a `fern` dispatcher to the log file.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::LoggingConfig;
use crate::constants::{APP_NAME, LOG_FILE_NAME};

/// Default log file location inside the platform data directory.
pub fn get_log_file_path() -> Result<PathBuf> {
    dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
        .map(|dir| dir.join(APP_NAME).join(LOG_FILE_NAME))
}

/// Build the dispatcher described by `config` without installing it.
///
/// Disabled logging still yields a dispatcher, filtered to `Off`.
pub fn dispatch(config: &LoggingConfig) -> Result<fern::Dispatch> {
    let base = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "[{} {:<5} {}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            message
        ))
    });

    if !config.enabled {
        return Ok(base.level(log::LevelFilter::Off));
    }

    let level = config.level_filter()?;
    let base = base.level(level);

    let path = match &config.file {
        Some(path) => path.clone(),
        None => get_log_file_path()?,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    let file = fern::log_file(&path).with_context(|| format!("Failed to open log file: {}", path.display()))?;
    Ok(base.chain(file))
}

/// Install the global logger. Must be called at most once per process.
pub fn init(config: &LoggingConfig) -> Result<()> {
    dispatch(config)?
        .apply()
        .context("Logger already initialized")?;
    Ok(())
}

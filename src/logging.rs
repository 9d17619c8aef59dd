use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tui_multigrid::config::LogConfig;

/// Send tracing output to the `[log] file`; the terminal belongs to the UI.
/// Nothing is installed when no file is configured.
pub fn init(config: &LogConfig) -> Result<()> {
    let Some(path) = &config.file else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(config.level_filter())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;
    Ok(())
}

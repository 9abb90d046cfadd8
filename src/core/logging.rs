//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A startup summary of the loaded configuration

use anyhow::Result;
use simplelog::*;
use std::fs::OpenOptions;

use crate::core::config::BotConfig;

/// Initialize logger for both console and file output
///
/// The log file is opened in append mode so restarts keep the previous history.
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to open the log file or a logger is already set
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", log_file_path, e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at application startup.
///
/// The bot token is never printed.
pub fn log_configuration(config: &BotConfig) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("⚙️  Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("✅ Admins: {} ({:?})", config.admin_ids.len(), config.admin_ids);
    log::info!("✅ Group chat: {}", config.group_chat_id);
    log::info!(
        "✅ Rate limit: {} request(s) per {}s",
        config.rate_limit_max,
        config.rate_limit_window.as_secs()
    );
    match config.bot_api_url {
        Some(ref url) => log::info!("✅ Bot API URL: {}", url),
        None => log::info!("✅ Bot API URL: default"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::NamedTempFile;

    #[test]
    fn test_init_logger_creates_log_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        // The global logger may already be set by another test; the file is opened first either way
        let _ = init_logger(path);
        assert!(temp_file.path().exists());

        let missing_dir = temp_file.path().with_extension("d").join("telepay.log");
        assert!(init_logger(missing_dir.to_str().unwrap()).is_err());
    }
}

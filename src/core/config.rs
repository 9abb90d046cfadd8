use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

use crate::core::error::{AppError, AppResult};

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: telepay.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "telepay.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: telepay.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "telepay.log".to_string()));

/// Rate limiting configuration for new payment requests
pub mod rate_limit {
    use super::Duration;

    /// Maximum number of new requests an employee may start per window
    pub const MAX_REQUESTS: usize = 3;

    /// Length of the sliding window (in seconds)
    pub const WINDOW_SECS: u64 = 300;

    /// Sliding window duration
    pub fn window() -> Duration {
        Duration::from_secs(WINDOW_SECS)
    }
}

/// Payment amounts accepted on approval
pub mod payment {
    /// Amounts offered as one-tap buttons on the admin card
    pub const QUICK_AMOUNTS: [i64; 2] = [15, 25];

    /// Largest amount an admin may approve in one go
    pub const MAX_AMOUNT: i64 = 10_000;
}

/// Statistics configuration
pub mod stats {
    /// Window used by /stats when no argument is given (in days)
    pub const DEFAULT_WINDOW_DAYS: u32 = 30;

    /// Largest window accepted by /stats (in days)
    pub const MAX_WINDOW_DAYS: u32 = 365;
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Database configuration
pub mod database {
    use super::Duration;

    /// Maximum number of pooled SQLite connections
    pub const POOL_SIZE: u32 = 8;

    /// How long a writer waits on a locked database before failing (in seconds)
    pub const BUSY_TIMEOUT_SECS: u64 = 10;

    /// Busy timeout duration
    pub fn busy_timeout() -> Duration {
        Duration::from_secs(BUSY_TIMEOUT_SECS)
    }
}

/// Splits an id list on commas and whitespace, skipping anything that is not an integer.
pub fn parse_id_list(raw: &str) -> Vec<i64> {
    raw.split([',', ' ', '\n', '\t'])
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

/// Settings the bot cannot start without, plus the tunables read next to them.
///
/// Loaded once at startup by [`BotConfig::from_env`]; every component that needs
/// the admin list or the group chat receives it from here instead of reading
/// the environment itself.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub admin_ids: Vec<i64>,
    pub group_chat_id: i64,
    pub bot_api_url: Option<String>,
    pub rate_limit_max: usize,
    pub rate_limit_window: Duration,
}

impl BotConfig {
    /// Reads and validates the configuration from the process environment.
    ///
    /// # Errors
    /// Returns `AppError::Config` naming the first missing or malformed variable.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`BotConfig::from_env`] but with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("BOT_TOKEN")
            .or_else(|| lookup("TELOXIDE_TOKEN"))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Config("BOT_TOKEN is not set".to_string()))?;

        // ADMIN_ID is the legacy single-variable spelling
        let admin_raw = lookup("ADMIN_IDS").or_else(|| lookup("ADMIN_ID")).unwrap_or_default();
        let admin_ids = parse_id_list(&admin_raw);
        if admin_ids.is_empty() {
            return Err(AppError::Config(
                "ADMIN_IDS is not set or contains no valid ids".to_string(),
            ));
        }

        let group_raw = lookup("GROUP_CHAT_ID")
            .ok_or_else(|| AppError::Config("GROUP_CHAT_ID is not set".to_string()))?;
        let group_chat_id = group_raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id != 0)
            .ok_or_else(|| AppError::Config(format!("GROUP_CHAT_ID is not a valid chat id: {}", group_raw)))?;

        let rate_limit_max = match lookup("RATE_LIMIT_MAX") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|max| *max > 0)
                .ok_or_else(|| AppError::Config(format!("RATE_LIMIT_MAX must be a positive integer: {}", raw)))?,
            None => rate_limit::MAX_REQUESTS,
        };

        let rate_limit_window = match lookup("RATE_LIMIT_WINDOW_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    AppError::Config(format!("RATE_LIMIT_WINDOW_SECS must be a positive integer: {}", raw))
                })?,
            None => rate_limit::window(),
        };

        Ok(Self {
            bot_token,
            admin_ids,
            group_chat_id,
            bot_api_url: lookup("BOT_API_URL").filter(|url| !url.trim().is_empty()),
            rate_limit_max,
            rate_limit_window,
        })
    }
}

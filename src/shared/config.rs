//! Application configuration. Paths, intervals, session user.

use serde::Deserialize;

/// Default cycle reset interval: 24 hours of wall-clock uptime. Not aligned
/// to calendar midnight; each menu's own staleness check does the rest.
pub const DEFAULT_RESET_INTERVAL_SECS: u64 = 86_400;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Base directory for the SQLite database. Read from LUNCHVOTE_DATA_DIR.
    pub data_dir: Option<String>,

    /// Path to a JSON catalog seed applied at startup. Read from
    /// LUNCHVOTE_CATALOG.
    #[serde(default)]
    pub catalog: Option<String>,

    /// Seconds between cycle resets. Read from LUNCHVOTE_RESET_INTERVAL_SECS.
    #[serde(default)]
    pub reset_interval_secs: Option<u64>,

    /// Acting user id (session collaborator stand-in). Read from
    /// LUNCHVOTE_USER_ID.
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("LUNCHVOTE"));
        if let Ok(path) = std::env::var("LUNCHVOTE_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the data directory. Defaults to ./data if unset.
    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    /// Returns the reset interval in seconds. Defaults to 24 h if unset.
    pub fn reset_interval_secs_or_default(&self) -> u64 {
        self.reset_interval_secs
            .unwrap_or(DEFAULT_RESET_INTERVAL_SECS)
    }
}

//! Block and server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long the import file prompt waits before giving up
pub const DEFAULT_IMPORT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_PORT: u16 = 8080;

/// Per-block settings supplied by the host when the block is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleBlockConfig {
    /// Placeholder for a day's description
    pub title_placeholder: String,
    /// Placeholder for the time-of-day input
    pub time_placeholder: String,
    /// Placeholder for an item's title
    pub title_item_placeholder: String,
    /// Placeholder for an item's description
    pub description_placeholder: String,
    /// Rendered for viewing only; every mutation is refused
    pub read_only: bool,
}

impl Default for ScheduleBlockConfig {
    fn default() -> Self {
        ScheduleBlockConfig {
            title_placeholder: "Optional day description (e.g., \"Workshop setup and introduction\")".to_string(),
            time_placeholder: "HH:MM".to_string(),
            title_item_placeholder: "Activity title".to_string(),
            description_placeholder: "Optional description or notes".to_string(),
            read_only: false,
        }
    }
}

/// Settings for the HTTP host shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub import_timeout: Duration,
    pub block: ScheduleBlockConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            import_timeout: DEFAULT_IMPORT_TIMEOUT,
            block: ScheduleBlockConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `SCHEDULE_PORT`, `SCHEDULE_IMPORT_TIMEOUT_SECS` and
    /// `SCHEDULE_READ_ONLY`; a port given on the command line wins.
    pub fn from_env(port_arg: Option<&str>) -> Self {
        Self::from_lookup(port_arg, |key| std::env::var(key).ok())
    }

    fn from_lookup<F>(port_arg: Option<&str>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();

        let port = port_arg
            .map(str::to_string)
            .or_else(|| lookup("SCHEDULE_PORT"))
            .and_then(|p| p.trim().parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let import_timeout = lookup("SCHEDULE_IMPORT_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.import_timeout);

        let read_only = lookup("SCHEDULE_READ_ONLY")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        ServerConfig {
            port,
            import_timeout,
            block: ScheduleBlockConfig {
                read_only,
                ..defaults.block
            },
        }
    }
}

use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

// ── Executor config ─────────────────────────────────────────────────

/// Environment-driven defaults for rule evaluation.
///
/// Per-rule settings always win; these only supply the deployment-wide
/// defaults (which indices to search and which field carries the event
/// timestamp).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Index pattern evaluated rules run against.
    pub index_pattern: String,
    /// Timestamp field used for the evaluation window range filter.
    pub timestamp_field: String,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            index_pattern: env_or("THRESHER_INDEX_PATTERN", "logs-*"),
            timestamp_field: env_or("THRESHER_TIMESTAMP_FIELD", "@timestamp"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

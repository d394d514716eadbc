//! # Register Configuration
//!
//! Loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TILL_*`)
//! 2. Defaults (this file)
//!
//! Receipt texts and currency are not configured here; they live in the
//! store's `settings` table (see [`ProfileState`](crate::state::ProfileState)).
//!
//! | Variable               | Default                          |
//! |------------------------|----------------------------------|
//! | `TILL_DB_PATH`         | `<platform data dir>/till.db`    |
//! | `TILL_MAX_CONNECTIONS` | `5`                              |
//! | `TILL_SEED_DEFAULTS`   | `true`                           |

use std::path::PathBuf;

use directories::ProjectDirs;
use thiserror::Error;
use till_db::DbConfig;

pub const ENV_DB_PATH: &str = "TILL_DB_PATH";
pub const ENV_MAX_CONNECTIONS: &str = "TILL_MAX_CONNECTIONS";
pub const ENV_SEED_DEFAULTS: &str = "TILL_SEED_DEFAULTS";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DATABASE_FILE: &str = "till.db";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Could not determine app data directory; set {ENV_DB_PATH}")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterConfig {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Store pool size.
    pub max_connections: u32,

    /// Create the default admin, categories and settings on a fresh store.
    pub seed_defaults: bool,
}

impl RegisterConfig {
    /// Reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a configuration from any variable source. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let db_path = match get(ENV_DB_PATH) {
            Some(path) => PathBuf::from(path),
            None => default_database_path()?,
        };

        let max_connections = match get(ENV_MAX_CONNECTIONS) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: ENV_MAX_CONNECTIONS,
                        value: raw,
                        reason: "expected a positive integer",
                    })
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let seed_defaults = match get(ENV_SEED_DEFAULTS) {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid {
                var: ENV_SEED_DEFAULTS,
                value: raw,
                reason: "expected true/false",
            })?,
            None => true,
        };

        Ok(RegisterConfig {
            db_path,
            max_connections,
            seed_defaults,
        })
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path).max_connections(self.max_connections)
    }
}

/// Platform-specific data file.
///
/// - **macOS**: `~/Library/Application Support/com.till.pos/till.db`
/// - **Windows**: `%APPDATA%\till\pos\data\till.db`
/// - **Linux**: `~/.local/share/pos/till.db`
fn default_database_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "till", "pos").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join(DATABASE_FILE))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! Runtime configuration. Defaults put the database under the user's home
//! directory, like any single-user desktop tool; environment variables
//! override each setting.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".school-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "school.sqlite";

pub const DB_PATH_VAR: &str = "SCHOOL_MANAGER_DB";
pub const LOG_FILTER_VAR: &str = "SCHOOL_MANAGER_LOG";
pub const SEED_VAR: &str = "SCHOOL_MANAGER_SEED";

/// Settings the binary needs before it can open the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file to open. Parent directories are created on open.
    pub db_path: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or
    /// `school_manager=debug`.
    pub log_filter: String,
    /// Whether empty collections get the sample teachers, courses and
    /// students on startup.
    pub seed_sample_data: bool,
}

impl Config {
    /// Read the process environment. Unset or blank variables fall back to
    /// their defaults; a malformed seed flag is an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Split out from `from_env` so tests
    /// do not have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup(DB_PATH_VAR).filter(|value| !value.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let log_filter = lookup(LOG_FILTER_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());

        let seed_sample_data = match lookup(SEED_VAR) {
            Some(value) => parse_flag(&value)
                .ok_or_else(|| anyhow!("{SEED_VAR} must be a boolean, got {value:?}"))?,
            None => true,
        };

        Ok(Self {
            db_path,
            log_filter,
            seed_sample_data,
        })
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

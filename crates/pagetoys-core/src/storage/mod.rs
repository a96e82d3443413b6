mod config;
pub mod database;
mod kv;

pub use config::{ClickerConfig, Config, CountdownConfig, DoorConfig, IncludeConfig};
pub use database::Database;
pub use kv::{KvStore, MemoryStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/pagetoys[-dev]/` based on PAGETOYS_ENV.
///
/// Set PAGETOYS_ENV=dev to use the development data directory.
/// PAGETOYS_HOME replaces `~/.config` as the base directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = match std::env::var_os("PAGETOYS_HOME") {
        Some(home) => PathBuf::from(home),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config"),
    };

    let env = std::env::var("PAGETOYS_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pagetoys-dev")
    } else {
        base_dir.join("pagetoys")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

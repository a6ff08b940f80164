mod backup;
mod config;
pub mod database;
mod timer_store;

pub use backup::Backup;
pub use config::{Config, FocusConfig, MetricsConfig, NotificationsConfig};
pub use database::Database;
pub use timer_store::KvTimerStore;

use std::path::PathBuf;

use crate::error::DatabaseError;

/// Returns `~/.config/studytrack[-dev]/` based on STUDYTRACK_ENV.
///
/// Set STUDYTRACK_ENV=dev to use the development data directory.
/// STUDYTRACK_HOME replaces `~/.config` as the base directory.
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> Result<PathBuf, DatabaseError> {
    let base_dir = match std::env::var_os("STUDYTRACK_HOME") {
        Some(home) => PathBuf::from(home),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config"),
    };

    let env = std::env::var("STUDYTRACK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("studytrack-dev")
    } else {
        base_dir.join("studytrack")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| DatabaseError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

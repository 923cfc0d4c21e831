mod config;
pub mod snapshot;

pub use config::{Config, PlannerConfig};
pub use snapshot::Snapshot;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `LIFEPLAN_DATA_DIR` wins outright. Otherwise `~/.config/lifeplan[-dev]/`,
/// with the `-dev` suffix when `LIFEPLAN_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("LIFEPLAN_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("LIFEPLAN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("lifeplan-dev")
            } else {
                base_dir.join("lifeplan")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

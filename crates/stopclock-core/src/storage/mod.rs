mod config;
pub mod database;
mod store;

pub use config::Config;
pub use database::Database;
pub use store::StopwatchStore;

use std::path::PathBuf;

/// Returns `~/.config/stopclock[-dev]/` based on STOPCLOCK_ENV.
///
/// Set STOPCLOCK_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STOPCLOCK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("stopclock-dev")
    } else {
        base_dir.join("stopclock")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

mod config;
pub mod database;

pub use config::Config;
pub use database::{Database, ImpactSummary};

use std::path::PathBuf;

/// Returns `~/.config/ecolog[-dev]/` based on ECOLOG_ENV.
///
/// Set ECOLOG_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ECOLOG_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("ecolog-dev")
    } else {
        base_dir.join("ecolog")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

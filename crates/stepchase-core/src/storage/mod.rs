mod config;

pub use config::{
    Config, NessieConfig, PedometerConfig, RaceConfig, SimulatorConfig, DEFAULT_NESSIE_VELOCITY,
};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/stepchase[-dev]/` based on STEPCHASE_ENV.
///
/// Set STEPCHASE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STEPCHASE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("stepchase-dev")
    } else {
        base_dir.join("stepchase")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        source: e,
    })?;
    Ok(dir)
}

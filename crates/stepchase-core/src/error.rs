//! Core error types for stepchase-core.
//!
//! Only synchronous failures live here. Sensor problems never surface as
//! errors: they are reported as alerts through the `AlertCenter`.

use std::path::PathBuf;
use thiserror::Error;

use crate::game::AppState;

/// Core error type for stepchase-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Game state machine errors
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A state transition that was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `start()` without a step goal. Set one and retry.
    #[error("Set a goal to start")]
    GoalNotSet,

    /// The transition's precondition does not hold in the current state.
    #[error("Cannot {action} while {state}")]
    InvalidState {
        state: AppState,
        action: &'static str,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to locate or create the data directory
    #[error("Cannot use data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_names_state_and_action() {
        let err = EngineError::InvalidState {
            state: AppState::NotStarted,
            action: "complete",
        };
        assert_eq!(err.to_string(), "Cannot complete while not started");
    }

    #[test]
    fn engine_error_converts_to_core() {
        let err: CoreError = EngineError::GoalNotSet.into();
        assert!(matches!(err, CoreError::Engine(EngineError::GoalNotSet)));
    }
}

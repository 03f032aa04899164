//! TOML-based application configuration.
//!
//! Stores:
//! - Race defaults (goal, tick interval, time limit)
//! - Nessie's swimming speed
//! - Which pedometer to use
//! - Simulator pedometer cadence and fault injection
//!
//! Configuration is stored at `~/.config/stepchase/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::pedometer::PedometerKind;

pub const DEFAULT_NESSIE_VELOCITY: f64 = 0.7;

/// Race defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceConfig {
    #[serde(default = "default_goal")]
    pub default_goal: u32,
    /// How often Nessie is advanced, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// The CLI gives up on a race after this many seconds.
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,
}

/// Antagonist configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NessieConfig {
    /// Metres per second.
    #[serde(default = "default_nessie_velocity")]
    pub velocity_mps: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedometerConfig {
    #[serde(default = "default_pedometer_kind")]
    pub kind: PedometerKind,
}

/// Synthetic pedometer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_steps_per_interval")]
    pub steps_per_interval: u32,
    /// Maximum deviation from `steps_per_interval`, in steps.
    #[serde(default = "default_step_jitter")]
    pub step_jitter: u32,
    /// Metres per step.
    #[serde(default = "default_stride_m")]
    pub stride_m: f64,
    /// Fixed seed for a reproducible walk.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Report a data fault instead of the Nth sample (zero-based).
    #[serde(default)]
    pub fault_after_samples: Option<u32>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/stepchase/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub race: RaceConfig,
    #[serde(default)]
    pub nessie: NessieConfig,
    #[serde(default)]
    pub pedometer: PedometerConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

// Default functions
fn default_goal() -> u32 {
    1000
}
fn default_tick_interval_ms() -> u64 {
    100
}
fn default_max_duration_secs() -> u64 {
    120
}
fn default_nessie_velocity() -> f64 {
    DEFAULT_NESSIE_VELOCITY
}
fn default_pedometer_kind() -> PedometerKind {
    PedometerKind::Simulator
}
fn default_interval_ms() -> u64 {
    250
}
fn default_steps_per_interval() -> u32 {
    2
}
fn default_step_jitter() -> u32 {
    1
}
fn default_stride_m() -> f64 {
    0.75
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            default_goal: default_goal(),
            tick_interval_ms: default_tick_interval_ms(),
            max_duration_secs: default_max_duration_secs(),
        }
    }
}

impl Default for NessieConfig {
    fn default() -> Self {
        Self {
            velocity_mps: default_nessie_velocity(),
        }
    }
}

impl Default for PedometerConfig {
    fn default() -> Self {
        Self {
            kind: default_pedometer_kind(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            steps_per_interval: default_steps_per_interval(),
            step_jitter: default_step_jitter(),
            stride_m: default_stride_m(),
            seed: None,
            fault_after_samples: None,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                // Optional numbers are null while unset; "null" clears them.
                serde_json::Value::Number(_) | serde_json::Value::Null => {
                    if value == "null" {
                        serde_json::Value::Null
                    } else {
                        parse_number(value)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                serde_json::Value::String(_) => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults there on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse or
    /// validate. `self` is unchanged on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a value by dot-separated key and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: message.to_string(),
            })
        };

        if !(self.nessie.velocity_mps.is_finite() && self.nessie.velocity_mps >= 0.0) {
            return invalid("nessie.velocity_mps", "must be a non-negative number");
        }
        if !(self.simulator.stride_m.is_finite() && self.simulator.stride_m > 0.0) {
            return invalid("simulator.stride_m", "must be positive");
        }
        if self.simulator.interval_ms == 0 {
            return invalid("simulator.interval_ms", "must be at least 1");
        }
        if self.race.tick_interval_ms == 0 {
            return invalid("race.tick_interval_ms", "must be at least 1");
        }
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }
}

fn parse_number(value: &str) -> Option<serde_json::Value> {
    if let Ok(n) = value.parse::<u64>() {
        Some(serde_json::Value::Number(n.into()))
    } else {
        value
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
    }
}

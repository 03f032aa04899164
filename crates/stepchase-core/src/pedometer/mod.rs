//! Pedometer capability consumed by the engine.
//!
//! A pedometer reports whether it can be used at all, and once started
//! delivers samples and faults through callbacks. Callbacks may run on any
//! thread and may still arrive after `pause()`; the engine discards those.
//!
//! Implementations are chosen by the caller at construction time:
//! [`SimulatorPedometer`] for environments without a motion sensor,
//! [`ScriptedPedometer`] for tests, [`UnavailablePedometer`] when motion
//! tracking is switched off.

mod scripted;
mod simulator;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use scripted::ScriptedPedometer;
pub use simulator::SimulatorPedometer;

use crate::storage::Config;

/// One update from the sensor, relative to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PedometerSample {
    pub steps_delta: u32,
    /// Metres.
    pub distance_delta: f64,
}

impl PedometerSample {
    pub fn new(steps_delta: u32, distance_delta: f64) -> Self {
        Self {
            steps_delta,
            distance_delta,
        }
    }
}

/// Asynchronous sensor failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FaultKind {
    /// Motion permission was revoked while running.
    NotAuthorized,
    /// The sensor could not produce a reading.
    DataUnavailable,
    Other(String),
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::NotAuthorized => f.write_str("motion activity not authorized"),
            FaultKind::DataUnavailable => f.write_str("pedometer data unavailable"),
            FaultKind::Other(message) => f.write_str(message),
        }
    }
}

pub type DataHandler = Arc<dyn Fn(PedometerSample) + Send + Sync>;
pub type FaultHandler = Arc<dyn Fn(FaultKind) + Send + Sync>;

pub trait Pedometer: Send {
    fn pedometer_available(&self) -> bool;

    fn permission_declined(&self) -> bool;

    /// Begin delivering updates. Must not block.
    fn start(&mut self, on_data: DataHandler, on_fault: FaultHandler);

    /// Stop delivering updates. Late callbacks are allowed.
    fn pause(&mut self);
}

/// A pedometer that reports no sensor.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailablePedometer;

impl Pedometer for UnavailablePedometer {
    fn pedometer_available(&self) -> bool {
        false
    }

    fn permission_declined(&self) -> bool {
        false
    }

    fn start(&mut self, _on_data: DataHandler, _on_fault: FaultHandler) {}

    fn pause(&mut self) {}
}

/// Which pedometer implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PedometerKind {
    Simulator,
    None,
}

/// Build the pedometer selected by `config.pedometer.kind`.
pub fn pedometer_from_config(config: &Config) -> Box<dyn Pedometer> {
    match config.pedometer.kind {
        PedometerKind::Simulator => Box::new(SimulatorPedometer::new(config.simulator.clone())),
        PedometerKind::None => Box::new(UnavailablePedometer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_pedometer_reports_no_sensor() {
        let pedometer = UnavailablePedometer;
        assert!(!pedometer.pedometer_available());
        assert!(!pedometer.permission_declined());
    }

    #[test]
    fn factory_honours_kind() {
        let mut config = Config::default();
        config.pedometer.kind = PedometerKind::None;
        assert!(!pedometer_from_config(&config).pedometer_available());

        config.pedometer.kind = PedometerKind::Simulator;
        assert!(pedometer_from_config(&config).pedometer_available());
    }

    #[test]
    fn fault_kind_serializes_tagged() {
        let json = serde_json::to_value(FaultKind::Other("boom".into())).unwrap();
        assert_eq!(json["kind"], "other");
        assert_eq!(json["message"], "boom");
    }
}

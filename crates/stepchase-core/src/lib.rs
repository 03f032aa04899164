//! # Stepchase Core Library
//!
//! The progress engine behind a step-counting race: the player walks towards
//! a step goal while Nessie swims after them.
//!
//! ## Architecture
//!
//! - **Game Engine**: a state machine that gates the race phases and starts
//!   or stops the pedometer and Nessie
//! - **Progress**: goal, steps, distance and Nessie's position, with
//!   one-shot milestone alerts
//! - **Pedometer**: the sensor capability, with a simulator and a scripted
//!   double
//! - **Alerts**: a deduplicated FIFO queue with subscriber notification
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Engine`]: Core game state machine
//! - [`ProgressModel`]: Progress and milestone tracking
//! - [`AlertCenter`]: Alert queue and fan-out
//! - [`Pedometer`]: Trait for step sensors
//! - [`AppContext`]: Owns one engine and its alert queue
//! - [`Config`]: Application configuration management

pub mod alerts;
pub mod context;
pub mod error;
pub mod events;
pub mod game;
pub mod pedometer;
pub mod progress;
pub mod storage;

pub use alerts::{Alert, AlertCenter, Severity, SubscriptionId};
pub use context::AppContext;
pub use error::{ConfigError, CoreError, EngineError};
pub use events::Event;
pub use game::{AppState, Engine};
pub use pedometer::{
    FaultKind, Pedometer, PedometerKind, PedometerSample, ScriptedPedometer, SimulatorPedometer,
    UnavailablePedometer,
};
pub use progress::{Nessie, ProgressModel, ProximityMilestone, StepMilestone};
pub use storage::{Config, SimulatorConfig};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

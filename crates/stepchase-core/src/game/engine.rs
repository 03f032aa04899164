//! Game engine implementation.
//!
//! Owns the [`AppState`] machine, the injected [`Pedometer`] and the shared
//! [`ProgressModel`]. Transition calls are synchronous and never block on the
//! sensor. Nessie moves only when the caller invokes `tick()`.
//!
//! ## State Transitions
//!
//! ```text
//! NotStarted -> InProgress <-> Paused
//! InProgress | Paused -> Caught
//! InProgress -> Completed
//! any -> NotStarted (restart)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let engine = Engine::new(Box::new(pedometer), AlertCenter::new());
//! engine.set_goal(1000);
//! engine.start()?;
//! // In a loop:
//! engine.tick(elapsed);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::state::AppState;
use crate::alerts::{Alert, AlertCenter};
use crate::error::EngineError;
use crate::events::Event;
use crate::lock;
use crate::pedometer::{DataHandler, FaultHandler, FaultKind, Pedometer};
use crate::progress::{Nessie, ProgressModel};

pub type StateObserver = Arc<dyn Fn(AppState) + Send + Sync>;

struct Machine {
    state: AppState,
    pedometer: Box<dyn Pedometer>,
    pedometer_running: bool,
}

/// Core game engine.
pub struct Engine {
    machine: Mutex<Machine>,
    progress: Arc<Mutex<ProgressModel>>,
    alerts: AlertCenter,
    /// Identifies the current pedometer run. Only read or bumped while the
    /// progress lock is held, so a callback from an ended run can never
    /// mutate the model after `pause()`/`restart()` returns.
    run: Arc<AtomicU64>,
    observer: Mutex<Option<StateObserver>>,
}

impl Engine {
    pub fn new(pedometer: Box<dyn Pedometer>, alerts: AlertCenter) -> Self {
        Self::with_nessie(pedometer, alerts, Nessie::default())
    }

    pub fn with_nessie(pedometer: Box<dyn Pedometer>, alerts: AlertCenter, nessie: Nessie) -> Self {
        let progress = ProgressModel::with_nessie(alerts.clone(), nessie);
        Self {
            machine: Mutex::new(Machine {
                state: AppState::NotStarted,
                pedometer,
                pedometer_running: false,
            }),
            progress: Arc::new(Mutex::new(progress)),
            alerts,
            run: Arc::new(AtomicU64::new(0)),
            observer: Mutex::new(None),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> AppState {
        lock(&self.machine).state
    }

    pub fn alerts(&self) -> &AlertCenter {
        &self.alerts
    }

    /// Lock the progress model. Do not hold the guard across engine calls.
    pub fn progress(&self) -> MutexGuard<'_, ProgressModel> {
        lock(&self.progress)
    }

    pub fn pedometer_running(&self) -> bool {
        lock(&self.machine).pedometer_running
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let state = self.state();
        Event::snapshot(state, &self.progress())
    }

    // ── Observer ─────────────────────────────────────────────────────

    /// Called with the new state after every successful transition, on the
    /// thread that requested it.
    pub fn set_state_observer<F>(&self, observer: F)
    where
        F: Fn(AppState) + Send + Sync + 'static,
    {
        *lock(&self.observer) = Some(Arc::new(observer));
    }

    pub fn clear_state_observer(&self) {
        *lock(&self.observer) = None;
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn set_goal(&self, goal: u32) {
        self.progress().set_goal(goal);
    }

    /// Begin or resume the race.
    ///
    /// Without a goal this fails with [`EngineError::GoalNotSet`]. If the
    /// sensor is missing or motion permission was declined the state is left
    /// unchanged and an alert is posted instead. Already running is a no-op.
    pub fn start(&self) -> Result<(), EngineError> {
        let mut machine = lock(&self.machine);
        match machine.state {
            AppState::InProgress => return Ok(()),
            AppState::NotStarted | AppState::Paused => {}
            state => {
                return Err(EngineError::InvalidState {
                    state,
                    action: "start",
                })
            }
        }

        if self.progress().goal().is_none() {
            return Err(EngineError::GoalNotSet);
        }
        if !machine.pedometer.pedometer_available() {
            tracing::warn!("pedometer unavailable, staying {}", machine.state);
            self.alerts.post(Alert::no_pedometer());
            return Ok(());
        }
        if machine.pedometer.permission_declined() {
            tracing::warn!("motion permission declined, staying {}", machine.state);
            self.alerts.post(Alert::not_authorized());
            return Ok(());
        }

        self.start_pedometer(&mut machine);
        self.progress().start_antagonist();
        self.transition(machine, AppState::InProgress);
        Ok(())
    }

    /// Pause a running race. Does nothing in any other state.
    pub fn pause(&self) {
        let mut machine = lock(&self.machine);
        if machine.state != AppState::InProgress {
            tracing::debug!(state = %machine.state, "pause ignored");
            return;
        }
        self.end_run(&mut machine, false);
        self.transition(machine, AppState::Paused);
    }

    /// Back to `NotStarted` from anywhere, with a fully reset model.
    pub fn restart(&self) {
        let mut machine = lock(&self.machine);
        self.end_run(&mut machine, true);
        self.transition(machine, AppState::NotStarted);
    }

    /// End the race because Nessie caught the player.
    pub fn set_caught(&self) -> Result<(), EngineError> {
        let mut machine = lock(&self.machine);
        let state = machine.state;
        let allowed = matches!(state, AppState::InProgress | AppState::Paused);
        if !allowed || !self.progress().caught() {
            return Err(EngineError::InvalidState {
                state,
                action: "set caught",
            });
        }

        self.end_run(&mut machine, false);
        self.transition(machine, AppState::Caught);
        Ok(())
    }

    /// End the race because the player reached the goal.
    pub fn set_completed(&self) -> Result<(), EngineError> {
        let mut machine = lock(&self.machine);
        let state = machine.state;
        if state != AppState::InProgress || !self.progress().goal_reached() {
            return Err(EngineError::InvalidState {
                state,
                action: "complete",
            });
        }

        self.end_run(&mut machine, false);
        self.alerts.post(Alert::reached_goal());
        self.transition(machine, AppState::Completed);
        Ok(())
    }

    /// Whatever the primary control does in the current state: start,
    /// pause, resume, or restart after the race ended.
    pub fn advance(&self) -> Result<AppState, EngineError> {
        match self.state() {
            AppState::NotStarted | AppState::Paused => self.start()?,
            AppState::InProgress => self.pause(),
            AppState::Caught | AppState::Completed => self.restart(),
        }
        Ok(self.state())
    }

    /// Let Nessie swim for `elapsed`. Returns the alerts this fired.
    pub fn tick(&self, elapsed: Duration) -> Vec<Alert> {
        self.progress().advance_antagonist(elapsed)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_pedometer(&self, machine: &mut Machine) {
        if machine.pedometer_running {
            return;
        }

        let run = {
            let _progress = self.progress();
            self.run.fetch_add(1, Ordering::SeqCst) + 1
        };

        let on_data: DataHandler = {
            let progress = Arc::clone(&self.progress);
            let current = Arc::clone(&self.run);
            Arc::new(move |sample| {
                let mut progress = lock(&progress);
                if current.load(Ordering::SeqCst) != run {
                    tracing::trace!(run, "dropping sample from ended run");
                    return;
                }
                progress.add_steps(sample.steps_delta, sample.distance_delta);
            })
        };

        let on_fault: FaultHandler = {
            let progress = Arc::clone(&self.progress);
            let current = Arc::clone(&self.run);
            let alerts = self.alerts.clone();
            Arc::new(move |fault| {
                let _progress = lock(&progress);
                if current.load(Ordering::SeqCst) != run {
                    tracing::trace!(run, %fault, "dropping fault from ended run");
                    return;
                }
                tracing::warn!(%fault, "pedometer fault");
                alerts.post(fault_alert(&fault));
            })
        };

        machine.pedometer.start(on_data, on_fault);
        machine.pedometer_running = true;
    }

    /// Stop Nessie and the pedometer and invalidate the current run.
    fn end_run(&self, machine: &mut Machine, reset: bool) {
        {
            let mut progress = self.progress();
            self.run.fetch_add(1, Ordering::SeqCst);
            if reset {
                progress.reset();
            } else {
                progress.stop_antagonist();
            }
        }

        if machine.pedometer_running {
            machine.pedometer.pause();
            machine.pedometer_running = false;
        }
    }

    fn transition(&self, mut machine: MutexGuard<'_, Machine>, to: AppState) {
        let from = machine.state;
        machine.state = to;
        drop(machine);

        tracing::debug!(%from, %to, "state changed");
        let observer = lock(&self.observer).clone();
        if let Some(observer) = observer {
            observer(to);
        }
    }
}

fn fault_alert(fault: &FaultKind) -> Alert {
    match fault {
        FaultKind::NotAuthorized => Alert::not_authorized(),
        FaultKind::DataUnavailable => Alert::data_alert(),
        FaultKind::Other(message) => Alert::new(message.clone()),
    }
}

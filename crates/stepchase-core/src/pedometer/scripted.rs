use std::sync::{Arc, Mutex};
use std::thread;

use super::{DataHandler, FaultHandler, FaultKind, Pedometer, PedometerSample};
use crate::lock;

#[derive(Default)]
struct Script {
    available: bool,
    permission_declined: bool,
    fault_on_start: Option<FaultKind>,
    start_calls: usize,
    pause_calls: usize,
    running: bool,
    on_data: Option<DataHandler>,
    on_fault: Option<FaultHandler>,
}

/// Pedometer driven by hand, for tests and demos.
///
/// Clones share state: hand one clone to the engine and keep another to push
/// samples and inspect calls. Handlers stay registered after `pause()` so a
/// test can deliver a late sample on purpose.
#[derive(Clone)]
pub struct ScriptedPedometer {
    script: Arc<Mutex<Script>>,
}

impl ScriptedPedometer {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                available: true,
                ..Script::default()
            })),
        }
    }

    pub fn set_available(&self, available: bool) {
        lock(&self.script).available = available;
    }

    pub fn set_permission_declined(&self, declined: bool) {
        lock(&self.script).permission_declined = declined;
    }

    /// Raise `fault` from another thread right after the next `start`.
    pub fn fail_on_start(&self, fault: FaultKind) {
        lock(&self.script).fault_on_start = Some(fault);
    }

    pub fn started(&self) -> bool {
        lock(&self.script).start_calls > 0
    }

    pub fn start_calls(&self) -> usize {
        lock(&self.script).start_calls
    }

    pub fn pause_calls(&self) -> usize {
        lock(&self.script).pause_calls
    }

    pub fn is_running(&self) -> bool {
        lock(&self.script).running
    }

    /// Deliver a sample on the calling thread. Returns `false` if `start`
    /// was never called.
    pub fn send_data(&self, sample: PedometerSample) -> bool {
        let handler = lock(&self.script).on_data.clone();
        match handler {
            Some(on_data) => {
                on_data(sample);
                true
            }
            None => false,
        }
    }

    pub fn send_fault(&self, fault: FaultKind) -> bool {
        let handler = lock(&self.script).on_fault.clone();
        match handler {
            Some(on_fault) => {
                on_fault(fault);
                true
            }
            None => false,
        }
    }
}

impl Default for ScriptedPedometer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pedometer for ScriptedPedometer {
    fn pedometer_available(&self) -> bool {
        lock(&self.script).available
    }

    fn permission_declined(&self) -> bool {
        lock(&self.script).permission_declined
    }

    fn start(&mut self, on_data: DataHandler, on_fault: FaultHandler) {
        let fault = {
            let mut script = lock(&self.script);
            script.start_calls += 1;
            script.running = true;
            script.on_data = Some(on_data);
            script.on_fault = Some(Arc::clone(&on_fault));
            script.fault_on_start.take()
        };

        if let Some(fault) = fault {
            thread::spawn(move || on_fault(fault));
        }
    }

    fn pause(&mut self) {
        let mut script = lock(&self.script);
        script.pause_calls += 1;
        script.running = false;
    }
}

//! Synthetic pedometer for machines without a motion sensor.
//!
//! Runs a background thread that emits one sample per configured interval.
//! Step counts are jittered with a seeded PCG generator so a given seed
//! always produces the same walk.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use super::{DataHandler, FaultHandler, FaultKind, Pedometer, PedometerSample};
use crate::storage::SimulatorConfig;

pub struct SimulatorPedometer {
    config: SimulatorConfig,
    /// Stop flag of the current run; `None` while paused.
    running: Option<Arc<AtomicBool>>,
    /// Advanced per run so a resumed walk does not repeat itself.
    runs: u64,
}

impl SimulatorPedometer {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config,
            running: None,
            runs: 0,
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    fn rng_for_run(&self) -> Pcg64 {
        match self.config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed.wrapping_add(self.runs)),
            None => Pcg64::from_entropy(),
        }
    }
}

impl Pedometer for SimulatorPedometer {
    fn pedometer_available(&self) -> bool {
        true
    }

    fn permission_declined(&self) -> bool {
        false
    }

    fn start(&mut self, on_data: DataHandler, on_fault: FaultHandler) {
        if self.running.is_some() {
            return;
        }

        let stop = Arc::new(AtomicBool::new(false));
        let mut walk = Walk {
            config: self.config.clone(),
            rng: self.rng_for_run(),
            stop: Arc::clone(&stop),
        };
        self.runs += 1;

        let spawned = thread::Builder::new()
            .name("pedometer-sim".into())
            .spawn(move || walk.run(on_data, on_fault));

        match spawned {
            Ok(_) => self.running = Some(stop),
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn simulator thread");
            }
        }
    }

    fn pause(&mut self) {
        if let Some(stop) = self.running.take() {
            stop.store(true, Ordering::SeqCst);
        }
    }
}

impl Drop for SimulatorPedometer {
    fn drop(&mut self) {
        self.pause();
    }
}

struct Walk {
    config: SimulatorConfig,
    rng: Pcg64,
    stop: Arc<AtomicBool>,
}

impl Walk {
    fn run(&mut self, on_data: DataHandler, on_fault: FaultHandler) {
        let interval = Duration::from_millis(self.config.interval_ms.max(1));
        let mut emitted: u32 = 0;

        loop {
            thread::sleep(interval);
            if self.stop.load(Ordering::SeqCst) {
                break;
            }

            if self.config.fault_after_samples == Some(emitted) {
                on_fault(FaultKind::DataUnavailable);
            } else {
                on_data(self.next_sample());
            }
            emitted = emitted.saturating_add(1);
        }
        tracing::trace!(samples = emitted, "simulated walk stopped");
    }

    fn next_sample(&mut self) -> PedometerSample {
        let base = self.config.steps_per_interval;
        let jitter = self.config.step_jitter.min(base);
        let steps = if jitter == 0 {
            base
        } else {
            self.rng.gen_range(base - jitter..=base.saturating_add(jitter))
        };
        PedometerSample::new(steps, f64::from(steps) * self.config.stride_m)
    }
}

//! Process-wide wiring.
//!
//! One `AppContext` is built at startup and handed to whatever needs the
//! engine or the alert queue. There are no global instances.

use std::sync::Arc;

use crate::alerts::AlertCenter;
use crate::game::Engine;
use crate::pedometer::{pedometer_from_config, Pedometer};
use crate::progress::Nessie;
use crate::storage::Config;

pub struct AppContext {
    config: Config,
    alerts: AlertCenter,
    engine: Arc<Engine>,
}

impl AppContext {
    /// Wire up the pedometer selected by `config`.
    pub fn new(config: Config) -> Self {
        let pedometer = pedometer_from_config(&config);
        Self::with_pedometer(config, pedometer)
    }

    /// Wire up an explicitly chosen pedometer.
    pub fn with_pedometer(config: Config, pedometer: Box<dyn Pedometer>) -> Self {
        let alerts = AlertCenter::new();
        let nessie = Nessie::new(config.nessie.velocity_mps);
        let engine = Arc::new(Engine::with_nessie(pedometer, alerts.clone(), nessie));
        Self {
            config,
            alerts,
            engine,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn alerts(&self) -> &AlertCenter {
        &self.alerts
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::Alert;
    use crate::pedometer::ScriptedPedometer;

    #[test]
    fn engine_and_context_share_alert_queue() {
        let context = AppContext::with_pedometer(Config::default(), Box::new(ScriptedPedometer::new()));
        context.engine().alerts().post(Alert::new("shared"));
        assert_eq!(context.alerts().len(), 1);
    }

    #[test]
    fn nessie_speed_comes_from_config() {
        let mut config = Config::default();
        config.nessie.velocity_mps = 3.0;
        let context = AppContext::with_pedometer(config, Box::new(ScriptedPedometer::new()));
        assert_eq!(context.engine().progress().nessie().velocity(), 3.0);
    }
}

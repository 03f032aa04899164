use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use stepchase_core::{Alert, AppContext, AppState, Config, Engine, Event};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Args)]
pub struct RaceArgs {
    /// Step goal (defaults to race.default_goal)
    #[arg(long)]
    goal: Option<u32>,
    /// Seed for a reproducible simulated walk
    #[arg(long)]
    seed: Option<u64>,
    /// Give up after this many seconds (defaults to race.max_duration_secs)
    #[arg(long)]
    max_secs: Option<u64>,
    /// Override Nessie's speed in metres per second
    #[arg(long)]
    nessie_speed: Option<f64>,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy)]
struct Printer {
    json: bool,
}

impl Printer {
    fn event(self, event: &Event) {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!(error = %e, "failed to encode event"),
        }
    }

    fn state(self, state: AppState) {
        if self.json {
            self.event(&Event::state_changed(state));
        } else {
            println!("State: {state} (next: {})", state.next_action_label());
        }
    }

    fn alert(self, alert: &Alert) {
        if self.json {
            self.event(&Event::alert_posted(alert));
        } else {
            println!("{alert}");
        }
    }

    fn summary(self, engine: &Engine) {
        if self.json {
            self.event(&engine.snapshot());
            return;
        }
        let progress = engine.progress();
        println!(
            "Steps: {}/{} ({}%)",
            progress.steps(),
            progress.goal().unwrap_or(0),
            progress.percent_complete()
        );
        println!("Distance: {:.1} m", progress.distance());
        println!("Nessie: {:.1} m", progress.antagonist_distance());
    }
}

pub fn run(args: RaceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();
    if let Some(seed) = args.seed {
        config.simulator.seed = Some(seed);
    }
    if let Some(speed) = args.nessie_speed {
        config.apply("nessie.velocity_mps", &speed.to_string())?;
    }

    let goal = args.goal.unwrap_or(config.race.default_goal);
    let tick = Duration::from_millis(config.race.tick_interval_ms);
    let limit = Duration::from_secs(args.max_secs.unwrap_or(config.race.max_duration_secs));
    let printer = Printer { json: args.json };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(race(config, goal, tick, limit, printer))
}

async fn race(
    config: Config,
    goal: u32,
    tick: Duration,
    limit: Duration,
    printer: Printer,
) -> Result<(), Box<dyn std::error::Error>> {
    let context = AppContext::new(config);
    let engine = Arc::clone(context.engine());
    let mut alerts = context.alerts().watch();
    engine.set_state_observer(move |state| printer.state(state));

    engine.set_goal(goal);
    engine.start()?;
    if engine.state() != AppState::InProgress {
        drain(&mut alerts, printer);
        return Err("race could not start".into());
    }
    tracing::info!(goal, ?tick, ?limit, "race started");

    let mut ticker = time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let deadline = time::sleep(limit);
    tokio::pin!(deadline);
    let mut last = Instant::now();

    let outcome = loop {
        tokio::select! {
            _ = &mut deadline => break None,
            _ = ticker.tick() => {
                let now = Instant::now();
                engine.tick(now - last);
                last = now;

                let (caught, reached) = {
                    let progress = engine.progress();
                    (progress.caught(), progress.goal_reached())
                };
                // The sensor thread may move the player between the read and
                // the transition, so a rejected transition just waits a tick.
                if caught && engine.set_caught().is_ok() {
                    break Some(AppState::Caught);
                }
                if reached && engine.set_completed().is_ok() {
                    break Some(AppState::Completed);
                }
            }
            Ok(alert) = alerts.recv() => printer.alert(&alert),
        }
    };

    if outcome.is_none() {
        engine.pause();
    }
    drain(&mut alerts, printer);
    engine.clear_state_observer();
    printer.summary(&engine);

    match outcome {
        Some(state) => {
            tracing::info!(%state, "race finished");
            Ok(())
        }
        None => Err(format!("race timed out after {}s", limit.as_secs()).into()),
    }
}

fn drain(alerts: &mut tokio::sync::broadcast::Receiver<Alert>, printer: Printer) {
    loop {
        match alerts.try_recv() {
            Ok(alert) => printer.alert(&alert),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "alert output fell behind");
            }
            Err(_) => break,
        }
    }
}

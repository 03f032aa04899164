//! Shared progress model: goal, steps, distance and Nessie.
//!
//! Mutations that can cross a milestone return the alerts they fired, after
//! posting them to the [`AlertCenter`]. Nothing is posted from a setter that
//! does not say so in its name.

use std::time::Duration;

use crate::alerts::{Alert, AlertCenter};

use super::nessie::Nessie;
use super::thresholds::{percent_of_goal, Milestone, ProximityMilestone, StepMilestone, Tracker};

#[derive(Debug)]
pub struct ProgressModel {
    goal: Option<u32>,
    steps: u32,
    /// Player position in metres.
    distance: f64,
    nessie: Nessie,
    step_milestones: Tracker<StepMilestone>,
    proximity_milestones: Tracker<ProximityMilestone>,
    alerts: AlertCenter,
}

impl ProgressModel {
    pub fn new(alerts: AlertCenter) -> Self {
        Self::with_nessie(alerts, Nessie::default())
    }

    pub fn with_nessie(alerts: AlertCenter, nessie: Nessie) -> Self {
        Self {
            goal: None,
            steps: 0,
            distance: 0.0,
            nessie,
            step_milestones: Tracker::new(),
            proximity_milestones: Tracker::new(),
            alerts,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn goal(&self) -> Option<u32> {
        self.goal
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn antagonist_distance(&self) -> f64 {
        self.nessie.distance()
    }

    pub fn antagonist_active(&self) -> bool {
        self.nessie.is_swimming()
    }

    pub fn nessie(&self) -> &Nessie {
        &self.nessie
    }

    /// Nessie has reached the player. Never true before she leaves the start.
    pub fn caught(&self) -> bool {
        ProximityMilestone::Caught.reached(self.nessie.distance(), self.distance)
    }

    /// The step goal is met and the player has not been caught.
    pub fn goal_reached(&self) -> bool {
        match self.goal {
            Some(goal) => self.steps >= goal && !self.caught(),
            None => false,
        }
    }

    pub fn percent_complete(&self) -> u32 {
        percent_of_goal(self.steps, self.goal)
    }

    pub fn step_milestone_fired(&self, milestone: StepMilestone) -> bool {
        self.step_milestones.has_fired(milestone)
    }

    pub fn proximity_milestone_fired(&self, milestone: ProximityMilestone) -> bool {
        self.proximity_milestones.has_fired(milestone)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Set the step target. Milestones that already fired stay fired; the
    /// new goal is evaluated the next time steps change.
    pub fn set_goal(&mut self, goal: u32) {
        self.goal = Some(goal);
    }

    /// Apply a pedometer update and fire any step milestones it crosses.
    pub fn add_steps(&mut self, steps_delta: u32, distance_delta: f64) -> Vec<Alert> {
        self.steps = self.steps.saturating_add(steps_delta);
        if distance_delta.is_finite() && distance_delta > 0.0 {
            self.distance += distance_delta;
        } else if distance_delta != 0.0 {
            tracing::warn!(distance_delta, "ignoring invalid distance delta");
        }
        self.evaluate_steps()
    }

    /// Overwrite the step count and fire any step milestones now reached.
    pub fn set_steps(&mut self, steps: u32) -> Vec<Alert> {
        self.steps = steps;
        self.evaluate_steps()
    }

    /// Overwrite the player's position. Does not evaluate proximity.
    pub fn set_distance(&mut self, distance: f64) {
        if distance.is_finite() && distance >= 0.0 {
            self.distance = distance;
        } else {
            tracing::warn!(distance, "ignoring invalid distance");
        }
    }

    /// Move Nessie to `distance` and fire any proximity milestones reached,
    /// halfway before almost before caught.
    pub fn update_antagonist(&mut self, distance: f64) -> Vec<Alert> {
        self.nessie.set_distance(distance);
        let (antagonist, player) = (self.nessie.distance(), self.distance);
        let fired = self
            .proximity_milestones
            .advance(|milestone| milestone.reached(antagonist, player));
        self.post(fired)
    }

    /// Let Nessie swim for `elapsed`. No-op while she sleeps.
    pub fn advance_antagonist(&mut self, elapsed: Duration) -> Vec<Alert> {
        match self.nessie.position_after(elapsed) {
            Some(position) => self.update_antagonist(position),
            None => Vec::new(),
        }
    }

    pub fn start_antagonist(&mut self) {
        self.nessie.start_swimming();
    }

    pub fn stop_antagonist(&mut self) {
        self.nessie.stop_swimming();
    }

    pub fn set_antagonist_velocity(&mut self, velocity: f64) {
        self.nessie.set_velocity(velocity);
    }

    /// Back to the initial state: no goal, nothing walked, Nessie asleep at
    /// the start, every milestone re-armed. Queued alerts are left alone.
    pub fn reset(&mut self) {
        self.goal = None;
        self.steps = 0;
        self.distance = 0.0;
        self.nessie.reset();
        self.step_milestones.clear();
        self.proximity_milestones.clear();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn evaluate_steps(&mut self) -> Vec<Alert> {
        let pct = self.percent_complete();
        let fired = self
            .step_milestones
            .advance(|milestone| milestone.percent() <= pct);
        self.post(fired)
    }

    fn post<M: Milestone>(&self, fired: Vec<M>) -> Vec<Alert> {
        fired
            .into_iter()
            .map(|milestone| {
                tracing::debug!(?milestone, "milestone reached");
                let alert = milestone.alert();
                self.alerts.post(alert.clone());
                alert
            })
            .collect()
    }
}

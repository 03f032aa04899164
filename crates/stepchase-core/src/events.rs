use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alerts::{Alert, Severity};
use crate::game::AppState;
use crate::progress::ProgressModel;

/// What the CLI prints and UIs consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    StateChanged {
        state: AppState,
        next_action: String,
        at: DateTime<Utc>,
    },
    AlertPosted {
        text: String,
        severity: Severity,
        at: DateTime<Utc>,
    },
    Snapshot {
        state: AppState,
        next_action: String,
        goal: Option<u32>,
        steps: u32,
        distance: f64,
        antagonist_distance: f64,
        antagonist_active: bool,
        percent_complete: u32,
        goal_reached: bool,
        caught: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn state_changed(state: AppState) -> Self {
        Event::StateChanged {
            state,
            next_action: state.next_action_label().to_string(),
            at: Utc::now(),
        }
    }

    pub fn alert_posted(alert: &Alert) -> Self {
        Event::AlertPosted {
            text: alert.text().to_string(),
            severity: alert.severity(),
            at: Utc::now(),
        }
    }

    pub fn snapshot(state: AppState, progress: &ProgressModel) -> Self {
        Event::Snapshot {
            state,
            next_action: state.next_action_label().to_string(),
            goal: progress.goal(),
            steps: progress.steps(),
            distance: progress.distance(),
            antagonist_distance: progress.antagonist_distance(),
            antagonist_active: progress.antagonist_active(),
            percent_complete: progress.percent_complete(),
            goal_reached: progress.goal_reached(),
            caught: progress.caught(),
            at: Utc::now(),
        }
    }
}

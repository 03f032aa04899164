use std::fmt;

use serde::{Deserialize, Serialize};

/// Game phase. Exactly one is current; the engine owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    NotStarted,
    InProgress,
    Paused,
    Caught,
    Completed,
}

impl AppState {
    pub const ALL: [AppState; 5] = [
        AppState::NotStarted,
        AppState::InProgress,
        AppState::Paused,
        AppState::Caught,
        AppState::Completed,
    ];

    /// Label for the control that moves the game on from this state.
    pub fn next_action_label(self) -> &'static str {
        match self {
            AppState::NotStarted => "Start",
            AppState::InProgress => "Pause",
            AppState::Paused => "Resume",
            AppState::Caught => "Try Again",
            AppState::Completed => "Start Over",
        }
    }

    /// The race is over and only `restart()` leaves this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, AppState::Caught | AppState::Completed)
    }
}

impl Default for AppState {
    fn default() -> Self {
        AppState::NotStarted
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AppState::NotStarted => "not started",
            AppState::InProgress => "in progress",
            AppState::Paused => "paused",
            AppState::Caught => "caught",
            AppState::Completed => "completed",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        let labels: Vec<_> = AppState::ALL.iter().map(|s| s.next_action_label()).collect();
        assert_eq!(labels, ["Start", "Pause", "Resume", "Try Again", "Start Over"]);
    }

    #[test]
    fn terminal_states() {
        assert!(AppState::Caught.is_terminal());
        assert!(AppState::Completed.is_terminal());
        assert!(!AppState::Paused.is_terminal());
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AppState::NotStarted).unwrap(),
            "\"not_started\""
        );
    }
}

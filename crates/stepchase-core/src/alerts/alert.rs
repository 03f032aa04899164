use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// How an alert should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Good,
    Bad,
}

/// A user-facing notice.
///
/// Two alerts are the same notice when their text matches, regardless of
/// severity. The queue in [`AlertCenter`](super::AlertCenter) relies on this
/// for deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    text: String,
    severity: Severity,
}

impl Alert {
    /// Create an alert with `Bad` severity.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_severity(text, Severity::Bad)
    }

    pub fn with_severity(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_good(&self) -> bool {
        self.severity == Severity::Good
    }

    // ── Canonical alerts ─────────────────────────────────────────────

    pub fn milestone_25_percent() -> Self {
        Self::with_severity("You are 25% to goal. Keep going!", Severity::Good)
    }

    pub fn milestone_50_percent() -> Self {
        Self::with_severity("Woohoo! You're halfway there!", Severity::Good)
    }

    pub fn milestone_75_percent() -> Self {
        Self::with_severity("Almost there, you can do it!", Severity::Good)
    }

    pub fn goal_complete() -> Self {
        Self::with_severity("Amazing, you did it! Have some 🥧.", Severity::Good)
    }

    pub fn reached_goal() -> Self {
        Self::with_severity("You reached your goal!", Severity::Good)
    }

    pub fn nessie_50_percent() -> Self {
        Self::new("Nessie catching up halfway 🦕.")
    }

    pub fn nessie_90_percent() -> Self {
        Self::new("Nessie almost has you 🦕!")
    }

    pub fn caught_by_nessie() -> Self {
        Self::new("Caught By Nessie!")
    }

    pub fn no_pedometer() -> Self {
        Self::new("Pedometer is not available. You won't be able to use this app.")
    }

    pub fn not_authorized() -> Self {
        Self::new("Motion recording has been blocked. Fix in Settings")
    }

    pub fn data_alert() -> Self {
        Self::new("There was a problem reading data from the pedometer.")
    }
}

impl PartialEq for Alert {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Alert {}

impl Hash for Alert {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Alert: '{}'", self.text)
    }
}
